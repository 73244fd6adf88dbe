//! Voronoi Map Configuration and Builder
//!
//! This module provides configuration types for deterministic Voronoi map generation
//! and the parameter struct consumed by the sweep.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::Bounds;

/// What to do when two input sites share exactly the same position
///
/// A repeated site would otherwise produce a zero-width arc and a
/// zero-radius circle event, so the sweep never sees one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence and drop the later ones
    ///
    /// Dropped inputs are reported by `Diagram::merged_sites`.
    #[default]
    Merge,
    /// Fail with `VoronoiError::DuplicateSite`
    Reject,
}

/// Parameters of a single sweep run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepOptions {
    /// Frame used to cut edges that are still open when the sweep ends
    pub bounds: Bounds,
    /// Handling of repeated sites
    pub duplicate_policy: DuplicatePolicy,
}

impl SweepOptions {
    /// Options with the given frame and the default duplicate policy
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Replace the duplicate policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Configuration for deterministic Voronoi map generation
///
/// The same configuration always produces the same sites and therefore the
/// same diagram.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .cell_count(200)
///     .size(800.0, 600.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.bounds().width(), 800.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Random seed for site placement
    pub seed: u64,

    /// Number of random sites to generate
    pub cell_count: usize,

    /// Width of the map frame
    pub width: f64,

    /// Height of the map frame
    pub height: f64,

    /// Handling of repeated sites
    pub duplicate_policy: DuplicatePolicy,
}

impl MapConfig {
    /// Frame `[0, width] × [0, height]`
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }

    /// Parameters for the sweep
    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            bounds: self.bounds(),
            duplicate_policy: self.duplicate_policy,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            cell_count: 100,
            width: 1000.0,
            height: 1000.0,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(12345)
///     .cell_count(50)
///     .duplicate_policy(DuplicatePolicy::Reject)
///     .build()
///     .unwrap();
/// assert_eq!(config.cell_count, 50);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    cell_count: usize,
    width: f64,
    height: f64,
    duplicate_policy: DuplicatePolicy,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - cell_count: 100
    /// - size: 1000 × 1000
    /// - duplicate_policy: Merge
    pub fn new() -> Self {
        Self {
            seed: None,
            cell_count: 100,
            width: 1000.0,
            height: 1000.0,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Set the random seed for site placement
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sites to generate
    pub fn cell_count(mut self, count: usize) -> Self {
        self.cell_count = count;
        self
    }

    /// Set the frame size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is not a positive finite number
    pub fn size(mut self, width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "map size must be positive (got {} x {})",
                width, height
            )));
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the duplicate site policy
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(MapConfig {
            seed,
            cell_count: self.cell_count,
            width: self.width,
            height: self.height,
            duplicate_policy: self.duplicate_policy,
        })
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
