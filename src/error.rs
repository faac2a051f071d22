//! Errors raised while splitting mesh regions

/// Failure of a split strategy. No partial output is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// Three corners of the region enclose a vanishing point derived from
    /// the fourth, so the shape cannot be a perspective view of a rectangle.
    #[error(
        "invalid perspective shape in region ({row}, {col}): the four corners cannot form a triangle or cross each other"
    )]
    InvalidPerspectiveShape { row: usize, col: usize },

    #[error("no target grid for region ({row}, {col})")]
    MissingGrid { row: usize, col: usize },

    #[error(
        "target grid for region ({row}, {col}) needs at least 2 entries per axis, got {vertical} vertical and {horizontal} horizontal"
    )]
    DegenerateGrid {
        row: usize,
        col: usize,
        vertical: usize,
        horizontal: usize,
    },
}

impl SplitError {
    /// Region (row, column) the error refers to
    pub fn region(&self) -> (usize, usize) {
        match *self {
            SplitError::InvalidPerspectiveShape { row, col }
            | SplitError::MissingGrid { row, col }
            | SplitError::DegenerateGrid { row, col, .. } => (row, col),
        }
    }
}
