//! Sampling configuration shared by curve and surface samplers.

use serde::{Deserialize, Serialize};

use crate::error::{NurbsError, Result};
use crate::traits::Validate;

/// Controls how curves and surfaces are sampled into discrete points.
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Parametric step as a fraction of the domain, in `(0, 1)`.
    pub delta: f64,
    /// Maximum chord deviation accepted by adaptive subdivision (model units).
    pub chord_tolerance: f64,
    /// Maximum recursion depth of adaptive subdivision.
    pub max_depth: u32,
}

impl SampleConfig {
    pub const DEFAULT_DELTA: f64 = 0.01;
    pub const DEFAULT_CHORD_TOLERANCE: f64 = 1e-3;
    pub const DEFAULT_MAX_DEPTH: u32 = 12;
    /// Smallest accepted `delta`; caps a sampling grid at a million steps
    /// per direction.
    pub const MIN_DELTA: f64 = 1e-6;
    /// Deepest accepted adaptive subdivision.
    pub const MAX_DEPTH_LIMIT: u32 = 32;

    pub fn with_delta(delta: f64) -> Result<Self> {
        let config = Self {
            delta,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Number of equal steps covering the domain, so the actual step never
    /// exceeds `delta`.
    pub fn steps(&self) -> usize {
        ((1.0 / self.delta) - 1e-9).ceil().max(1.0) as usize
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            delta: Self::DEFAULT_DELTA,
            chord_tolerance: Self::DEFAULT_CHORD_TOLERANCE,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Validate for SampleConfig {
    fn validate(&self) -> Result<()> {
        if !(self.delta >= Self::MIN_DELTA && self.delta < 1.0) {
            return Err(NurbsError::InvalidConfig(format!(
                "sampling delta must lie in [{}, 1), got {}",
                Self::MIN_DELTA,
                self.delta
            )));
        }
        if !(self.chord_tolerance.is_finite() && self.chord_tolerance > 0.0) {
            return Err(NurbsError::InvalidConfig(format!(
                "chord tolerance must be positive, got {}",
                self.chord_tolerance
            )));
        }
        if self.max_depth == 0 || self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(NurbsError::InvalidConfig(format!(
                "max_depth must lie in [1, {}], got {}",
                Self::MAX_DEPTH_LIMIT,
                self.max_depth
            )));
        }
        Ok(())
    }
}
