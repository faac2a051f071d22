//! Split strategies selectable by the host

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::curve::Curve;
use crate::error::SplitError;
use crate::perspective::{split_regions, Projection, SplitOptions, SplitPoints};
use crate::region::{Region, TargetGrid};

/// Computes the grid points of every region of a mesh
pub trait SplitStrategy<C: Curve>: Send + Sync {
    /// Registration key of the strategy
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        regions: &[Vec<Region<C>>],
        grids: &[Vec<TargetGrid>],
    ) -> Result<SplitPoints, SplitError>;
}

/// Perspective-correct subdivision
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveStrategy {
    pub options: SplitOptions,
}

impl PerspectiveStrategy {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }
}

impl<C: Curve + Sync> SplitStrategy<C> for PerspectiveStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Perspective.as_str()
    }

    fn execute(
        &self,
        regions: &[Vec<Region<C>>],
        grids: &[Vec<TargetGrid>],
    ) -> Result<SplitPoints, SplitError> {
        split_regions(regions, grids, Projection::Perspective, self.options)
    }
}

/// Plain subdivision, evenly spaced in curve parameter. Accepts any shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearStrategy {
    pub options: SplitOptions,
}

impl LinearStrategy {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }
}

impl<C: Curve + Sync> SplitStrategy<C> for LinearStrategy {
    fn name(&self) -> &'static str {
        StrategyKind::Linear.as_str()
    }

    fn execute(
        &self,
        regions: &[Vec<Region<C>>],
        grids: &[Vec<TargetGrid>],
    ) -> Result<SplitPoints, SplitError> {
        split_regions(regions, grids, Projection::Linear, self.options)
    }
}

/// Runs `secondary` when `primary` rejects a region's shape
pub struct FallbackStrategy<C: Curve> {
    primary: Box<dyn SplitStrategy<C>>,
    secondary: Box<dyn SplitStrategy<C>>,
}

impl<C: Curve> FallbackStrategy<C> {
    pub fn new(primary: Box<dyn SplitStrategy<C>>, secondary: Box<dyn SplitStrategy<C>>) -> Self {
        Self { primary, secondary }
    }
}

impl<C: Curve> SplitStrategy<C> for FallbackStrategy<C> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn execute(
        &self,
        regions: &[Vec<Region<C>>],
        grids: &[Vec<TargetGrid>],
    ) -> Result<SplitPoints, SplitError> {
        match self.primary.execute(regions, grids) {
            Err(err @ SplitError::InvalidPerspectiveShape { .. }) => {
                warn!(
                    "{}; falling back to the {} strategy",
                    err,
                    self.secondary.name()
                );
                self.secondary.execute(regions, grids)
            }
            result => result,
        }
    }
}

/// Registered strategies, selected by key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Perspective,
    Linear,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Perspective => "perspective",
            StrategyKind::Linear => "linear",
        }
    }

    pub fn all() -> &'static [StrategyKind] {
        &[StrategyKind::Perspective, StrategyKind::Linear]
    }

    pub fn build<C: Curve + Sync + 'static>(&self, options: SplitOptions) -> Box<dyn SplitStrategy<C>> {
        match self {
            StrategyKind::Perspective => Box::new(PerspectiveStrategy::new(options)),
            StrategyKind::Linear => Box::new(LinearStrategy::new(options)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown split strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}
