//! Hyperparameters and data-policy configuration for the neighborhood model.
//!
//! Configuration is plain data: build it with the `with_*` methods, or load
//! it from a TOML file where every field is optional.
//!
//! ```toml
//! k = 25
//! min_common_items = 5
//! rating_bounds = [0.5, 5.0]
//! empty_user_policy = "skip"
//! degenerate_policy = "zero_weight"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::Rating;
use crate::error::{CfError, Result};

/// Default neighborhood size.
pub const DEFAULT_K: usize = 25;

/// Default co-rated item threshold (strictly more are required).
pub const DEFAULT_MIN_COMMON_ITEMS: usize = 5;

/// Lowest rating the predictor will emit.
pub const MIN_RATING: Rating = 0.5;

/// Highest rating the predictor will emit.
pub const MAX_RATING: Rating = 5.0;

/// What to do with a user ID in the scanned range that has no ratings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyUserPolicy {
    /// The user gets no profile and no neighbor list.
    #[default]
    Skip,
    /// Abort the pass with [`CfError::EmptyUser`].
    Fail,
    /// Give the user a profile with this average and no deviations.
    Neutral(Rating),
}

/// What to do when a correlation denominator is zero.
///
/// A pair is degenerate when either user's deviation norm is zero, or the
/// computed weight is not finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Never offer the pair to the top-K list.
    #[default]
    Exclude,
    /// Offer the pair with weight `0.0`.
    ZeroWeight,
    /// Abort the pass with [`CfError::DegenerateSimilarity`].
    Fail,
}

/// Configuration for [`Neighborhoods::fit`](crate::recommend::Neighborhoods::fit).
///
/// # Examples
///
/// ```
/// use usercf::config::{CfConfig, DegeneratePolicy};
///
/// let config = CfConfig::new()
///     .with_k(10)
///     .with_min_common_items(2)
///     .with_degenerate_policy(DegeneratePolicy::ZeroWeight);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.k, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CfConfig {
    /// Maximum neighbors kept per user.
    pub k: usize,
    /// A candidate must share strictly more co-rated items than this.
    pub min_common_items: usize,
    /// Closed interval predictions are clamped to.
    pub rating_bounds: (Rating, Rating),
    /// Policy for users without ratings.
    pub empty_user_policy: EmptyUserPolicy,
    /// Policy for zero-variance pairs.
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for CfConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            min_common_items: DEFAULT_MIN_COMMON_ITEMS,
            rating_bounds: (MIN_RATING, MAX_RATING),
            empty_user_policy: EmptyUserPolicy::default(),
            degenerate_policy: DegeneratePolicy::default(),
        }
    }
}

impl CfConfig {
    /// Create a configuration with the default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of neighbors per user.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the co-rated item threshold.
    #[must_use]
    pub fn with_min_common_items(mut self, min_common_items: usize) -> Self {
        self.min_common_items = min_common_items;
        self
    }

    /// Set the prediction clamp interval.
    #[must_use]
    pub fn with_rating_bounds(mut self, min: Rating, max: Rating) -> Self {
        self.rating_bounds = (min, max);
        self
    }

    /// Set the empty-user policy.
    #[must_use]
    pub fn with_empty_user_policy(mut self, policy: EmptyUserPolicy) -> Self {
        self.empty_user_policy = policy;
        self
    }

    /// Set the degenerate-similarity policy.
    #[must_use]
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Check every field against its constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::InvalidHyperparameter`] for `k == 0`, non-finite or
    /// inverted rating bounds, or a non-finite neutral average.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(CfError::invalid_hyperparameter("k", self.k, ">= 1"));
        }

        let (lo, hi) = self.rating_bounds;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(CfError::invalid_hyperparameter(
                "rating_bounds",
                format!("[{lo}, {hi}]"),
                "finite with min <= max",
            ));
        }

        if let EmptyUserPolicy::Neutral(average) = self.empty_user_policy {
            if !average.is_finite() {
                return Err(CfError::invalid_hyperparameter(
                    "empty_user_policy.neutral",
                    average,
                    "finite rating",
                ));
            }
        }

        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::Config`] on malformed TOML or unknown keys, and
    /// any error from [`CfConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::Io`] if the file cannot be read, otherwise as
    /// [`CfConfig::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
