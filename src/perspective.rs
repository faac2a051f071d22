//! Perspective-correct grid subdivision
//!
//! Bilinear subdivision spaces grid lines evenly along each boundary curve,
//! which looks flat when the region is a foreshortened view of a rectangle.
//! Here the grid lines are instead placed with a harmonic progression derived
//! from the region's vanishing points, so the subdivided mesh reproduces
//! linear perspective.

use rayon::prelude::*;
use tracing::debug;

use crate::curve::Curve;
use crate::error::SplitError;
use crate::geometry::{distance, intersect, triangle_contains, Point};
use crate::region::{Corners, Region, TargetGrid};

/// Grid of one region, indexed `[row][col]`, `(rows + 1) x (cols + 1)` points
pub type PointGrid = Vec<Vec<Point>>;

/// Grids of all regions, indexed `[region row][region col]`
pub type SplitPoints = Vec<Vec<PointGrid>>;

/// How grid lines are distributed along the boundary curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Harmonic spacing towards the vanishing points
    Perspective,
    /// Even spacing in curve parameter
    Linear,
}

/// Execution options for [`split_regions`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitOptions {
    /// Assemble regions on the rayon thread pool
    pub parallel: bool,
}

/// Perspective-correct parameter for grid line `item` of `total`.
///
/// `start` and `end` are the near and far extents of the axis. When they are
/// equal the axis has no foreshortening and the plain ratio is returned.
/// The result is clamped to `[0, 1]`.
pub fn remap_t(start: f64, end: f64, item: usize, total: usize) -> f64 {
    let ratio = item as f64 / total as f64;
    if start == end {
        return ratio;
    }

    let d = start / end - 1.0;
    let dt = ratio * d;
    let lt = start / (1.0 + dt);
    let t = 1.0 - (lt - end) / (start - end);

    t.clamp(0.0, 1.0)
}

/// Whether the quadrilateral can be a perspective view of a rectangle.
///
/// A region is rejected when either vanishing point lies inside (or on) a
/// triangle formed by three of its corners, which happens when the shape is
/// folded over itself.
pub fn is_valid_perspective(corners: &Corners) -> bool {
    let Corners { tl, tr, bl, br } = *corners;
    let vertices = corners.to_array();

    let encloses = |point: Option<Point>| {
        point.is_some_and(|point| {
            (0..4).any(|i| {
                triangle_contains(
                    point,
                    vertices[i],
                    vertices[(i + 1) % 4],
                    vertices[(i + 2) % 4],
                )
            })
        })
    };

    !(encloses(intersect(tl, tr, bl, br)) || encloses(intersect(tl, bl, tr, br)))
}

/// Perspective split of every region, sequentially.
///
/// `regions` and `grids` are parallel `[row][col]` sequences. Fails on the
/// first region (row-major) that is folded or lacks a usable grid.
pub fn compute_split_points<C: Curve + Sync>(
    regions: &[Vec<Region<C>>],
    grids: &[Vec<TargetGrid>],
) -> Result<SplitPoints, SplitError> {
    split_regions(regions, grids, Projection::Perspective, SplitOptions::default())
}

/// Split every region with the given projection.
///
/// All regions are checked before any grid is assembled, so a failure never
/// depends on thread scheduling and no partial output exists.
pub fn split_regions<C: Curve + Sync>(
    regions: &[Vec<Region<C>>],
    grids: &[Vec<TargetGrid>],
    projection: Projection,
    options: SplitOptions,
) -> Result<SplitPoints, SplitError> {
    check_regions(regions, grids, projection)?;

    let split_row = |(row, grid_row): (&Vec<Region<C>>, &Vec<TargetGrid>)| -> Vec<PointGrid> {
        row.iter()
            .zip(grid_row)
            .map(|(region, grid)| assemble_region(region, grid, projection))
            .collect()
    };

    let points: SplitPoints = if options.parallel {
        regions.par_iter().zip(grids.par_iter()).map(split_row).collect()
    } else {
        regions.iter().zip(grids.iter()).map(split_row).collect()
    };

    Ok(points)
}

fn check_regions<C: Curve>(
    regions: &[Vec<Region<C>>],
    grids: &[Vec<TargetGrid>],
    projection: Projection,
) -> Result<(), SplitError> {
    for (row, region_row) in regions.iter().enumerate() {
        for (col, region) in region_row.iter().enumerate() {
            let grid = grids
                .get(row)
                .and_then(|grid_row| grid_row.get(col))
                .ok_or(SplitError::MissingGrid { row, col })?;

            if !grid.is_valid() {
                return Err(SplitError::DegenerateGrid {
                    row,
                    col,
                    vertical: grid.vertical.len(),
                    horizontal: grid.horizontal.len(),
                });
            }

            if projection == Projection::Perspective && !is_valid_perspective(&region.corners()) {
                return Err(SplitError::InvalidPerspectiveShape { row, col });
            }
        }
    }
    Ok(())
}

/// Distance ratios of a vanishing point to the two ends of each of the two
/// curves converging on it
fn vanishing_ratios(vp: Point, first: (Point, Point), second: (Point, Point)) -> (f64, f64) {
    (
        distance(first.0, vp) / distance(first.1, vp),
        distance(second.0, vp) / distance(second.1, vp),
    )
}

/// End points of grid line `item` of `total` on two opposite curves
fn anchors<C: Curve>(
    first: &C,
    second: &C,
    reference: f64,
    ratios: Option<(f64, f64)>,
    item: usize,
    total: usize,
) -> (Point, Point) {
    match ratios {
        Some((first_ratio, second_ratio)) => {
            let t1 = remap_t(reference, reference / first_ratio, item, total);
            let t2 = remap_t(reference, reference / second_ratio, item, total);
            (first.point_at(t1), second.point_at(t2))
        }
        None => {
            let t = item as f64 / total as f64;
            (first.point_at(t), second.point_at(t))
        }
    }
}

fn assemble_region<C: Curve>(
    region: &Region<C>,
    grid: &TargetGrid,
    projection: Projection,
) -> PointGrid {
    let rows = grid.rows();
    let cols = grid.cols();

    // (reference length, ratios) for the vertical and horizontal lines
    let (column_skew, row_skew) = match projection {
        Projection::Perspective => {
            let Corners { tl, tr, bl, br } = region.corners();
            let lengths = region.edge_lengths();
            let horizontal_vp = intersect(tl, tr, bl, br);
            let vertical_vp = intersect(tl, bl, tr, br);

            debug!(
                ?lengths,
                ?horizontal_vp,
                ?vertical_vp,
                rows,
                cols,
                "Assembling perspective region"
            );

            (
                (lengths.left, horizontal_vp.map(|vp| vanishing_ratios(vp, (tl, tr), (bl, br)))),
                (lengths.top, vertical_vp.map(|vp| vanishing_ratios(vp, (tl, bl), (tr, br)))),
            )
        }
        Projection::Linear => ((0.0, None), (0.0, None)),
    };

    // Vertical lines only depend on the column, horizontal lines on the row
    let columns: Vec<(Point, Point)> = (0..=cols)
        .map(|col| anchors(&region.top, &region.bottom, column_skew.0, column_skew.1, col, cols))
        .collect();

    (0..=rows)
        .map(|row| {
            let (h1, h2) = anchors(&region.left, &region.right, row_skew.0, row_skew.1, row, rows);
            // The outer ring stays on the boundary curves
            columns
                .iter()
                .enumerate()
                .map(|(col, &(v1, v2))| match (row, col) {
                    (0, _) => v1,
                    (r, _) if r == rows => v2,
                    (_, 0) => h1,
                    (_, c) if c == cols => h2,
                    _ => intersect(v1, v2, h1, h2).unwrap_or(v1),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CubicBezier;

    fn quad(tl: (f64, f64), tr: (f64, f64), bl: (f64, f64), br: (f64, f64)) -> Region<CubicBezier> {
        Region::from_corners(tl.into(), tr.into(), bl.into(), br.into())
    }

    fn split_one(region: Region<CubicBezier>, rows: usize, cols: usize) -> Result<PointGrid, SplitError> {
        let mut points = compute_split_points(&[vec![region]], &[vec![TargetGrid::uniform(rows, cols)]])?;
        Ok(points.remove(0).remove(0))
    }

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_remap_equal_lengths_is_linear() {
        for item in 0..=4 {
            assert_eq!(remap_t(10.0, 10.0, item, 4), item as f64 / 4.0);
        }
    }

    #[test]
    fn test_remap_endpoints() {
        assert_eq!(remap_t(100.0, 40.0, 0, 5), 0.0);
        assert!((remap_t(100.0, 40.0, 5, 5) - 1.0).abs() < 1e-12);
        assert_eq!(remap_t(40.0, 100.0, 0, 5), 0.0);
        assert!((remap_t(40.0, 100.0, 5, 5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_remap_monotonic() {
        for (start, end) in [(100.0, 40.0), (40.0, 100.0), (80.0, 79.0)] {
            let mut last = 0.0;
            for item in 0..=16 {
                let t = remap_t(start, end, item, 16);
                assert!((0.0..=1.0).contains(&t));
                assert!(t >= last, "{start} {end} {item}: {t} < {last}");
                last = t;
            }
        }
    }

    #[test]
    fn test_remap_is_harmonic() {
        // Near extent twice the far one: the middle line lands at 2/3
        let t = remap_t(2.0, 1.0, 1, 2);
        assert!((t - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_gives_uniform_grid() {
        let grid = split_one(quad((0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)), 2, 2).unwrap();

        assert_eq!(grid.len(), 3);
        for (row, points) in grid.iter().enumerate() {
            assert_eq!(points.len(), 3);
            for (col, &point) in points.iter().enumerate() {
                assert_close(point, Point::new(col as f64 * 50.0, row as f64 * 50.0));
            }
        }
    }

    #[test]
    fn test_rectangle_matches_bilinear() {
        let (tl, tr, bl, br) = ((10.0, 20.0), (250.0, 20.0), (10.0, 140.0), (250.0, 140.0));
        let grid = split_one(quad(tl, tr, bl, br), 3, 5).unwrap();

        for (row, points) in grid.iter().enumerate() {
            for (col, &point) in points.iter().enumerate() {
                let u = col as f64 / 5.0;
                let v = row as f64 / 3.0;
                let expected = Point::new(10.0 + 240.0 * u, 20.0 + 120.0 * v);
                assert_close(point, expected);
            }
        }
    }

    #[test]
    fn test_trapezoid_interior_point() {
        let grid = split_one(quad((0.0, 0.0), (100.0, 0.0), (20.0, 100.0), (80.0, 100.0)), 2, 2).unwrap();

        let center = grid[1][1];
        assert!(center.is_finite());
        // Symmetric about x = 50, strictly between the top and bottom edges
        assert!((center.x - 50.0).abs() < 1e-9);
        assert!(center.y > 0.0 && center.y < 100.0);
        // Pulled towards the narrow (far) edge
        assert!((center.y - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_cell_returns_corners() {
        let grid = split_one(quad((0.0, 0.0), (100.0, 0.0), (20.0, 100.0), (80.0, 100.0)), 1, 1).unwrap();

        assert_eq!(grid.len(), 2);
        assert_close(grid[0][0], Point::new(0.0, 0.0));
        assert_close(grid[0][1], Point::new(100.0, 0.0));
        assert_close(grid[1][0], Point::new(20.0, 100.0));
        assert_close(grid[1][1], Point::new(80.0, 100.0));
    }

    #[test]
    fn test_boundary_preserved() {
        let region = quad((0.0, 0.0), (120.0, 10.0), (10.0, 90.0), (100.0, 110.0));
        let grid = split_one(region.clone(), 4, 4).unwrap();

        // Outer ring lies on the straight boundary lines
        let on_line = |p: Point, a: Point, b: Point| ((b - a).cross(p - a) / (b - a).length()).abs() < 1e-6;
        let c = region.corners();
        for i in 0..=4 {
            assert!(on_line(grid[0][i], c.tl, c.tr));
            assert!(on_line(grid[4][i], c.bl, c.br));
            assert!(on_line(grid[i][0], c.tl, c.bl));
            assert!(on_line(grid[i][4], c.tr, c.br));
        }
        assert_close(grid[0][0], c.tl);
        assert_close(grid[0][4], c.tr);
        assert_close(grid[4][0], c.bl);
        assert_close(grid[4][4], c.br);
    }

    #[test]
    fn test_curved_edges_keep_ring_on_curves() {
        let top = CubicBezier::new(
            Point::new(0.0, 0.0),
            Point::new(30.0, -20.0),
            Point::new(70.0, -20.0),
            Point::new(100.0, 0.0),
        );
        let left = CubicBezier::new(
            Point::new(0.0, 0.0),
            Point::new(-20.0, 30.0),
            Point::new(-20.0, 70.0),
            Point::new(0.0, 100.0),
        );
        let bottom = CubicBezier::line(Point::new(0.0, 100.0), Point::new(100.0, 100.0));
        let right = CubicBezier::line(Point::new(100.0, 0.0), Point::new(100.0, 100.0));
        let region = Region::new(top, bottom, left, right);

        let grid = split_one(region, 2, 2).unwrap();

        assert_close(grid[0][1], top.point_at(0.5));
        assert_close(grid[0][1], Point::new(50.0, -15.0));
        assert_close(grid[1][0], left.point_at(0.5));
        assert_close(grid[1][0], Point::new(-15.0, 50.0));
        assert_close(grid[1][2], right.point_at(0.5));
        assert_close(grid[2][1], bottom.point_at(0.5));
        assert_close(grid[0][0], Point::new(0.0, 0.0));
        assert_close(grid[2][2], Point::new(100.0, 100.0));
        // Interior points still come from the line intersection
        assert_close(grid[1][1], Point::new(50.0, 50.0));
    }

    #[test]
    fn test_curved_top_on_trapezoid() {
        // The vertical vanishing point exists, so rows are remapped
        let top = CubicBezier::new(
            Point::new(0.0, 0.0),
            Point::new(30.0, -20.0),
            Point::new(70.0, -20.0),
            Point::new(100.0, 0.0),
        );
        let bottom = CubicBezier::line(Point::new(20.0, 100.0), Point::new(80.0, 100.0));
        let left = CubicBezier::line(Point::new(0.0, 0.0), Point::new(20.0, 100.0));
        let right = CubicBezier::line(Point::new(100.0, 0.0), Point::new(80.0, 100.0));
        let region = Region::new(top, bottom, left, right);

        let grid = split_one(region, 2, 2).unwrap();
        let straight = split_one(quad((0.0, 0.0), (100.0, 0.0), (20.0, 100.0), (80.0, 100.0)), 2, 2).unwrap();

        assert_close(grid[0][1], top.point_at(0.5));
        // Left, right and bottom are unchanged, so their ring points match
        assert_close(grid[1][0], straight[1][0]);
        assert_close(grid[1][2], straight[1][2]);
        assert_close(grid[2][1], straight[2][1]);
        assert!(grid[1][1].is_finite());
        assert!(grid[1][1].y > 0.0 && grid[1][1].y < 100.0);
    }

    #[test]
    fn test_folded_shape_is_rejected() {
        let err = split_one(quad((0.0, 0.0), (10.0, 0.0), (5.0, 5.0), (100.0, 100.0)), 2, 2).unwrap_err();
        assert_eq!(err, SplitError::InvalidPerspectiveShape { row: 0, col: 0 });
    }

    #[test]
    fn test_corner_inside_triangle_is_invalid() {
        // bl sits strictly inside triangle tl, tr, br
        let corners = Corners {
            tl: Point::new(0.0, 0.0),
            tr: Point::new(100.0, 0.0),
            bl: Point::new(60.0, 20.0),
            br: Point::new(100.0, 100.0),
        };
        assert!(!is_valid_perspective(&corners));
    }

    #[test]
    fn test_convex_shapes_are_valid() {
        let shapes = [
            [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)],
            [(0.0, 0.0), (100.0, 0.0), (20.0, 100.0), (80.0, 100.0)],
            [(0.0, 0.0), (100.0, 30.0), (0.0, 100.0), (100.0, 70.0)],
            [(5.0, 0.0), (120.0, 10.0), (0.0, 90.0), (100.0, 110.0)],
        ];
        for [tl, tr, bl, br] in shapes {
            let corners = Corners {
                tl: tl.into(),
                tr: tr.into(),
                bl: bl.into(),
                br: br.into(),
            };
            assert!(is_valid_perspective(&corners), "{corners:?}");
        }
    }

    #[test]
    fn test_error_reports_region() {
        let good = quad((0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0));
        let bad = quad((100.0, 0.0), (110.0, 0.0), (105.0, 5.0), (200.0, 100.0));
        let regions = vec![vec![good.clone(), good.clone()], vec![good, bad]];
        let grids = vec![vec![TargetGrid::uniform(2, 2); 2]; 2];

        let err = compute_split_points(&regions, &grids).unwrap_err();
        assert_eq!(err, SplitError::InvalidPerspectiveShape { row: 1, col: 1 });
        assert_eq!(err.region(), (1, 1));
    }

    #[test]
    fn test_missing_and_degenerate_grids() {
        let region = quad((0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0));
        let regions = vec![vec![region.clone(), region]];

        let err = compute_split_points(&regions, &[vec![TargetGrid::uniform(1, 1)]]).unwrap_err();
        assert_eq!(err, SplitError::MissingGrid { row: 0, col: 1 });

        let grids = vec![vec![TargetGrid::uniform(1, 1), TargetGrid::uniform(0, 2)]];
        let err = compute_split_points(&regions, &grids).unwrap_err();
        assert_eq!(
            err,
            SplitError::DegenerateGrid {
                row: 0,
                col: 1,
                vertical: 3,
                horizontal: 1
            }
        );
    }

    #[test]
    fn test_linear_projection_ignores_shape() {
        let region = quad((0.0, 0.0), (10.0, 0.0), (5.0, 5.0), (100.0, 100.0));
        let points = split_regions(
            &[vec![region]],
            &[vec![TargetGrid::uniform(2, 2)]],
            Projection::Linear,
            SplitOptions::default(),
        )
        .unwrap();
        assert_eq!(points[0][0].len(), 3);
        assert_close(points[0][0][0][0], Point::new(0.0, 0.0));
        assert_close(points[0][0][2][2], Point::new(100.0, 100.0));
    }

    #[test]
    fn test_deterministic_and_parallel_identical() {
        let regions = vec![
            vec![
                quad((0.0, 0.0), (100.0, 0.0), (20.0, 100.0), (80.0, 100.0)),
                quad((100.0, 0.0), (220.0, 15.0), (80.0, 100.0), (190.0, 120.0)),
            ],
            vec![
                quad((20.0, 100.0), (80.0, 100.0), (0.0, 200.0), (110.0, 210.0)),
                quad((80.0, 100.0), (190.0, 120.0), (110.0, 210.0), (200.0, 200.0)),
            ],
        ];
        let grids = vec![vec![TargetGrid::uniform(3, 4), TargetGrid::uniform(5, 2)]; 2];

        let first = compute_split_points(&regions, &grids).unwrap();
        let second = compute_split_points(&regions, &grids).unwrap();
        let parallel = split_regions(
            &regions,
            &grids,
            Projection::Perspective,
            SplitOptions { parallel: true },
        )
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, parallel);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0][0].len(), 4);
        assert_eq!(first[0][0][0].len(), 5);
        assert_eq!(first[0][1].len(), 6);
        assert_eq!(first[0][1][0].len(), 3);
    }
}
