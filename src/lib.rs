//! perspective-split - perspective-correct subdivision of warped mesh regions
//!
//! A texture-warping host describes its mesh as regions bounded by four
//! cubic curves. This crate computes where the grid lines inside each region
//! should cross so that the subdivided region reads as a perspective view
//! of a rectangle instead of a bilinear stretch.
//!
//! ```
//! use perspective_split::{compute_split_points, Point, Region, TargetGrid};
//!
//! let region = Region::from_corners(
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(20.0, 100.0),
//!     Point::new(80.0, 100.0),
//! );
//! let points = compute_split_points(&[vec![region]], &[vec![TargetGrid::uniform(2, 2)]]).unwrap();
//! assert_eq!(points[0][0].len(), 3);
//! ```

pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod perspective;
pub mod region;
pub mod strategy;

pub use curve::{CubicBezier, Curve};
pub use error::SplitError;
pub use geometry::{distance, intersect, triangle_contains, Point};
pub use perspective::{
    compute_split_points, is_valid_perspective, remap_t, split_regions, PointGrid, Projection,
    SplitOptions, SplitPoints,
};
pub use region::{Corners, EdgeLengths, Region, TargetGrid};
pub use strategy::{
    FallbackStrategy, LinearStrategy, PerspectiveStrategy, SplitStrategy, StrategyKind,
};
