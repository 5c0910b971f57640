//! Pearson-style user-user similarity and top-K neighborhood construction.
//!
//! # Algorithm
//!
//! For every user `i` in `0..=max_user_id`:
//!
//! 1. Build the profile: mean rating, per-item deviation, deviation norm `σ_i`.
//! 2. For every other user `j` sharing strictly more than `min_common_items`
//!    co-rated items, compute
//!    `w_ij = Σ_{m ∈ common} dev_i[m]·dev_j[m] / (σ_i·σ_j)`.
//! 3. Keep the `k` largest weights, most correlated first.
//!
//! Candidates are found through the item → users lookup rather than a scan
//! of every user ID, but they are visited in ascending user ID order so tie
//! handling is the same as a full scan.
//!
//! Users are independent of each other: both passes fan out across threads
//! when the `parallel` feature is enabled.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{CfConfig, DegeneratePolicy, EmptyUserPolicy};
use crate::data::{RatingIndex, UserId};
use crate::error::{CfError, Result};
use crate::recommend::neighbors::NeighborList;
use crate::recommend::profile::UserProfile;

/// Per-user profiles, keyed by user.
pub type Profiles = BTreeMap<UserId, UserProfile>;

/// Per-user neighbor lists, keyed by user.
pub type NeighborLists = BTreeMap<UserId, NeighborList>;

/// Cooperative cancellation flag for the neighborhood pass.
///
/// Clones share the flag. Workers check it before each user.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`CancelToken::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CfError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Correlation weight between two profiles over their co-rated items.
///
/// Returns `None` when the pair is degenerate: either deviation norm is
/// zero, or the ratio is not finite.
///
/// # Examples
///
/// ```
/// use usercf::recommend::{pearson_weight, UserProfile};
///
/// let a = UserProfile::from_ratings([(1, 5.0), (2, 3.0)]).unwrap();
/// let b = UserProfile::from_ratings([(1, 4.0), (2, 2.0)]).unwrap();
///
/// let w = pearson_weight(&a, &b).unwrap();
/// assert!((w - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn pearson_weight(a: &UserProfile, b: &UserProfile) -> Option<f64> {
    let denominator = a.norm_sigma() * b.norm_sigma();
    if denominator == 0.0 {
        return None;
    }

    let numerator: f64 = a
        .deviations()
        .iter()
        .filter_map(|(&item, &da)| b.deviation(item).map(|db| da * db))
        .sum();

    let weight = numerator / denominator;
    weight.is_finite().then_some(weight)
}

/// Computes per-user profiles and top-K neighbor lists.
///
/// # Examples
///
/// ```
/// use usercf::config::CfConfig;
/// use usercf::data::{RatingIndex, RatingSample};
/// use usercf::recommend::SimilarityEngine;
///
/// let index = RatingIndex::from_samples(&[
///     RatingSample::new(0, 1, 5.0),
///     RatingSample::new(0, 2, 3.0),
///     RatingSample::new(1, 1, 4.0),
///     RatingSample::new(1, 2, 2.0),
/// ])
/// .unwrap();
///
/// let engine = SimilarityEngine::new(CfConfig::new().with_k(1).with_min_common_items(1)).unwrap();
/// let (profiles, neighbors) = engine.compute_neighborhoods(&index).unwrap();
///
/// assert_eq!(profiles[&0].average(), 4.0);
/// assert_eq!(neighbors[&0].as_slice()[0].user, 1);
/// assert!((neighbors[&0].as_slice()[0].weight - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: CfConfig,
}

impl SimilarityEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::InvalidHyperparameter`] if the configuration is
    /// invalid.
    pub fn new(config: CfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &CfConfig {
        &self.config
    }

    /// Run both passes to completion.
    ///
    /// # Errors
    ///
    /// - [`CfError::EmptyUser`] under [`EmptyUserPolicy::Fail`].
    /// - [`CfError::DegenerateSimilarity`] under [`DegeneratePolicy::Fail`].
    /// - [`CfError::UserIdOutOfRange`] if the largest user ID is `usize::MAX`.
    pub fn compute_neighborhoods(&self, index: &RatingIndex) -> Result<(Profiles, NeighborLists)> {
        self.compute_neighborhoods_with_cancel(index, &CancelToken::new())
    }

    /// Run both passes, stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`SimilarityEngine::compute_neighborhoods`], plus
    /// [`CfError::Cancelled`].
    pub fn compute_neighborhoods_with_cancel(
        &self,
        index: &RatingIndex,
        cancel: &CancelToken,
    ) -> Result<(Profiles, NeighborLists)> {
        let start = Instant::now();
        let max_user = index.max_user_id();
        let n_slots = max_user
            .checked_add(1)
            .ok_or(CfError::UserIdOutOfRange { user: max_user })?;
        info!(
            users = index.num_users(),
            items = index.num_items(),
            ratings = index.len(),
            k = self.config.k,
            min_common_items = self.config.min_common_items,
            "computing neighborhoods"
        );

        #[cfg(feature = "parallel")]
        let slots: Vec<Option<UserProfile>> = (0..n_slots)
            .into_par_iter()
            .map(|user| self.profile_for(index, user, cancel))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let slots: Vec<Option<UserProfile>> = (0..n_slots)
            .map(|user| self.profile_for(index, user, cancel))
            .collect::<Result<_>>()?;

        #[cfg(feature = "parallel")]
        let lists: Vec<Option<NeighborList>> = (0..n_slots)
            .into_par_iter()
            .map(|user| self.neighbors_for(index, &slots, user, cancel))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let lists: Vec<Option<NeighborList>> = (0..n_slots)
            .map(|user| self.neighbors_for(index, &slots, user, cancel))
            .collect::<Result<_>>()?;

        let mut profiles = Profiles::new();
        let mut neighbors = NeighborLists::new();
        for (user, (profile, list)) in slots.into_iter().zip(lists).enumerate() {
            if let (Some(profile), Some(list)) = (profile, list) {
                profiles.insert(user, profile);
                neighbors.insert(user, list);
            }
        }

        let skipped = n_slots - profiles.len();
        if skipped > 0 {
            warn!(skipped, "user ids without ratings were skipped");
        }
        info!(
            users = profiles.len(),
            skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "neighborhoods computed"
        );

        Ok((profiles, neighbors))
    }

    fn profile_for(
        &self,
        index: &RatingIndex,
        user: UserId,
        cancel: &CancelToken,
    ) -> Result<Option<UserProfile>> {
        cancel.check()?;

        match UserProfile::from_index(index, user) {
            Ok(profile) => Ok(Some(profile)),
            Err(CfError::EmptyUser { user }) => match self.config.empty_user_policy {
                EmptyUserPolicy::Skip => {
                    debug!(user, "skipping user without ratings");
                    Ok(None)
                }
                EmptyUserPolicy::Fail => Err(CfError::EmptyUser { user }),
                EmptyUserPolicy::Neutral(average) => {
                    debug!(user, average, "neutral profile for user without ratings");
                    Ok(Some(UserProfile::neutral(average)))
                }
            },
            Err(e) => Err(e),
        }
    }

    fn neighbors_for(
        &self,
        index: &RatingIndex,
        slots: &[Option<UserProfile>],
        user: UserId,
        cancel: &CancelToken,
    ) -> Result<Option<NeighborList>> {
        cancel.check()?;

        let Some(profile) = slots[user].as_ref() else {
            return Ok(None);
        };

        let mut list = NeighborList::new(self.config.k);
        let mut qualified = 0usize;
        let mut degenerate = 0usize;

        for (candidate, common) in co_rated_counts(index, user) {
            if common <= self.config.min_common_items {
                continue;
            }
            // Users who rated anything always have a profile.
            let Some(other) = slots.get(candidate).and_then(Option::as_ref) else {
                continue;
            };
            qualified += 1;

            let weight = match pearson_weight(profile, other) {
                Some(w) => w,
                None => {
                    degenerate += 1;
                    match self.config.degenerate_policy {
                        DegeneratePolicy::Exclude => continue,
                        DegeneratePolicy::ZeroWeight => 0.0,
                        DegeneratePolicy::Fail => {
                            return Err(CfError::DegenerateSimilarity {
                                user,
                                neighbor: candidate,
                            })
                        }
                    }
                }
            };

            list.offer(weight, candidate);
        }

        if degenerate > 0 {
            warn!(
                user,
                degenerate,
                policy = ?self.config.degenerate_policy,
                "zero-variance pairs during correlation"
            );
        }
        debug!(user, qualified, kept = list.len(), "user processed");

        Ok(Some(list))
    }
}

/// Number of items `user` has in common with each other user, ascending by
/// user ID. Users sharing nothing are absent.
fn co_rated_counts(index: &RatingIndex, user: UserId) -> BTreeMap<UserId, usize> {
    let mut counts = BTreeMap::new();
    let Some(items) = index.items_of(user) else {
        return counts;
    };

    for &item in items {
        let Some(raters) = index.users_of(item) else {
            continue;
        };
        for &other in raters {
            if other != user {
                *counts.entry(other).or_insert(0usize) += 1;
            }
        }
    }

    counts
}

/// Profiles and neighbor lists with the default data policies.
///
/// # Errors
///
/// Returns [`CfError::InvalidHyperparameter`] if `k == 0`.
pub fn compute_neighborhoods(
    index: &RatingIndex,
    k: usize,
    min_common_items: usize,
) -> Result<(Profiles, NeighborLists)> {
    let config = CfConfig::new()
        .with_k(k)
        .with_min_common_items(min_common_items);
    SimilarityEngine::new(config)?.compute_neighborhoods(index)
}

#[cfg(test)]
#[path = "similarity_tests.rs"]
mod tests;
