//! Mesh documents exchanged with the host
//!
//! A mesh is a `[row][col]` array of regions, each carrying its four cubic
//! boundary curves and the grid it should be subdivided into:
//!
//! ```json
//! { "regions": [[{
//!     "top":    { "points": [{"x": 0, "y": 0}, ...] },
//!     "bottom": { "points": [...] },
//!     "left":   { "points": [...] },
//!     "right":  { "points": [...] },
//!     "grid":   { "vertical": [0, 0.5, 1], "horizontal": [0, 0.5, 1] }
//! }]] }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curve::CubicBezier;
use crate::geometry::Point;
use crate::region::{Region, TargetGrid};

/// One region of a mesh document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSpec {
    pub top: CubicBezier,
    pub bottom: CubicBezier,
    pub left: CubicBezier,
    pub right: CubicBezier,
    pub grid: TargetGrid,
}

impl RegionSpec {
    /// Region with straight edges between four corners
    pub fn from_corners(tl: Point, tr: Point, bl: Point, br: Point, grid: TargetGrid) -> Self {
        let Region {
            top,
            bottom,
            left,
            right,
        } = Region::from_corners(tl, tr, bl, br);
        Self {
            top,
            bottom,
            left,
            right,
            grid,
        }
    }

    pub fn region(&self) -> Region<CubicBezier> {
        Region::new(self.top, self.bottom, self.left, self.right)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeshDocument {
    pub regions: Vec<Vec<RegionSpec>>,
}

impl MeshDocument {
    /// Mesh made of a single region
    pub fn single(region: RegionSpec) -> Self {
        Self {
            regions: vec![vec![region]],
        }
    }

    pub fn region_count(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }

    /// Split into the parallel region and grid arrays the strategies consume
    pub fn into_parts(self) -> (Vec<Vec<Region<CubicBezier>>>, Vec<Vec<TargetGrid>>) {
        self.regions
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|spec| (spec.region(), spec.grid))
                    .unzip::<_, _, Vec<_>, Vec<_>>()
            })
            .unzip()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse mesh document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mesh from {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid mesh in {:?}", path))
    }
}
