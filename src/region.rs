//! Mesh regions and their target subdivision grids

use serde::{Deserialize, Serialize};

use crate::curve::{CubicBezier, Curve};
use crate::geometry::Point;

/// One cell of the host's boundary grid
///
/// `top` and `bottom` run left to right, `left` and `right` run top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Region<C> {
    pub top: C,
    pub bottom: C,
    pub left: C,
    pub right: C,
}

/// Corner points of a region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub tl: Point,
    pub tr: Point,
    pub bl: Point,
    pub br: Point,
}

impl Corners {
    /// Corners in the order the validity check walks them
    pub fn to_array(&self) -> [Point; 4] {
        [self.tl, self.tr, self.bl, self.br]
    }
}

/// Arc lengths of the four boundary curves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLengths {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl<C: Curve> Region<C> {
    pub fn new(top: C, bottom: C, left: C, right: C) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn corners(&self) -> Corners {
        Corners {
            tl: self.top.start(),
            tr: self.top.end(),
            bl: self.bottom.start(),
            br: self.bottom.end(),
        }
    }

    pub fn edge_lengths(&self) -> EdgeLengths {
        EdgeLengths {
            top: self.top.arc_length(),
            bottom: self.bottom.arc_length(),
            left: self.left.arc_length(),
            right: self.right.arc_length(),
        }
    }
}

impl Region<CubicBezier> {
    /// A region with straight edges between the four corners
    pub fn from_corners(tl: Point, tr: Point, bl: Point, br: Point) -> Self {
        Self::new(
            CubicBezier::line(tl, tr),
            CubicBezier::line(bl, br),
            CubicBezier::line(tl, bl),
            CubicBezier::line(tr, br),
        )
    }
}

/// Target subdivision of one region
///
/// Each axis holds the ordered split ratios of the grid lines crossing it,
/// first and last included. Only the number of entries drives the split
/// strategies: `cols = vertical.len() - 1`, `rows = horizontal.len() - 1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetGrid {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

impl TargetGrid {
    pub fn new(vertical: Vec<f64>, horizontal: Vec<f64>) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Evenly spaced grid with `rows` x `cols` cells
    pub fn uniform(rows: usize, cols: usize) -> Self {
        Self::new(uniform_ratios(cols), uniform_ratios(rows))
    }

    pub fn rows(&self) -> usize {
        self.horizontal.len().saturating_sub(1)
    }

    pub fn cols(&self) -> usize {
        self.vertical.len().saturating_sub(1)
    }

    /// Both axes have at least one cell
    pub fn is_valid(&self) -> bool {
        self.rows() > 0 && self.cols() > 0
    }
}

fn uniform_ratios(divisions: usize) -> Vec<f64> {
    (0..=divisions)
        .map(|i| {
            if divisions == 0 {
                0.0
            } else {
                i as f64 / divisions as f64
            }
        })
        .collect()
}
