//! Rating data: identifiers, samples and the read-only [`RatingIndex`].
//!
//! The index is the only input the neighborhood pass consumes. It is built
//! once, validated once, and never mutated afterwards, so it can be shared
//! across worker threads without synchronization.

pub mod loader;
pub mod split;

pub use loader::RatingsParser;
pub use split::train_test_split;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::error::{CfError, Result};

/// User identifier (non-negative, dense-ish, not necessarily contiguous).
pub type UserId = usize;

/// Item identifier.
pub type ItemId = usize;

/// Rating value on a bounded scale.
pub type Rating = f64;

/// One observed `(user, item, rating)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSample {
    /// Rating user
    pub user: UserId,
    /// Rated item
    pub item: ItemId,
    /// Observed rating
    pub rating: Rating,
}

impl RatingSample {
    /// Create a new sample.
    #[must_use]
    pub fn new(user: UserId, item: ItemId, rating: Rating) -> Self {
        Self { user, item, rating }
    }
}

/// Read-only rating lookups: user → items, item → users, (user, item) → rating.
///
/// Item and user sets are ordered, so every pass over them (and every
/// floating-point sum built from them) is deterministic.
///
/// # Examples
///
/// ```
/// use usercf::data::{RatingIndex, RatingSample};
///
/// let index = RatingIndex::from_samples(&[
///     RatingSample::new(0, 1, 5.0),
///     RatingSample::new(0, 2, 3.0),
///     RatingSample::new(1, 1, 4.0),
/// ])
/// .expect("non-empty ratings");
///
/// assert_eq!(index.rating(0, 2), Some(3.0));
/// assert_eq!(index.items_of(1).map(|s| s.len()), Some(1));
/// assert_eq!(index.max_user_id(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RatingIndex {
    user_to_items: HashMap<UserId, BTreeSet<ItemId>>,
    item_to_users: HashMap<ItemId, BTreeSet<UserId>>,
    ratings: HashMap<(UserId, ItemId), Rating>,
    max_user_id: UserId,
}

impl RatingIndex {
    /// Assemble an index from three externally built lookups.
    ///
    /// # Errors
    ///
    /// - [`CfError::MissingData`] if there are no ratings.
    /// - [`CfError::InconsistentIndex`] if a rating is not finite, or a rated
    ///   pair is missing from either set lookup, or a user's item set names an
    ///   item without a rating.
    pub fn new(
        user_to_items: HashMap<UserId, BTreeSet<ItemId>>,
        item_to_users: HashMap<ItemId, BTreeSet<UserId>>,
        ratings: HashMap<(UserId, ItemId), Rating>,
    ) -> Result<Self> {
        if ratings.is_empty() {
            return Err(CfError::MissingData("rating index is empty".to_string()));
        }

        for (&(user, item), &rating) in &ratings {
            let inconsistent = |reason: &str| CfError::InconsistentIndex {
                user,
                item,
                reason: reason.to_string(),
            };
            if !rating.is_finite() {
                return Err(inconsistent("rating is not finite"));
            }
            if !user_to_items.get(&user).is_some_and(|s| s.contains(&item)) {
                return Err(inconsistent("item missing from user's item set"));
            }
            if !item_to_users.get(&item).is_some_and(|s| s.contains(&user)) {
                return Err(inconsistent("user missing from item's user set"));
            }
        }

        for (&user, items) in &user_to_items {
            if let Some(&item) = items.iter().find(|&&m| !ratings.contains_key(&(user, m))) {
                return Err(CfError::InconsistentIndex {
                    user,
                    item,
                    reason: "no rating recorded for listed item".to_string(),
                });
            }
        }

        let max_user_id = ratings.keys().map(|&(u, _)| u).max().unwrap_or_default();

        Ok(Self {
            user_to_items,
            item_to_users,
            ratings,
            max_user_id,
        })
    }

    /// Build all three lookups from raw samples.
    ///
    /// A repeated `(user, item)` pair keeps the last rating seen.
    ///
    /// # Errors
    ///
    /// As [`RatingIndex::new`].
    pub fn from_samples(samples: &[RatingSample]) -> Result<Self> {
        let mut user_to_items: HashMap<UserId, BTreeSet<ItemId>> = HashMap::new();
        let mut item_to_users: HashMap<ItemId, BTreeSet<UserId>> = HashMap::new();
        let mut ratings = HashMap::with_capacity(samples.len());
        let mut duplicates = 0usize;

        for s in samples {
            if ratings.insert((s.user, s.item), s.rating).is_some() {
                duplicates += 1;
            }
            user_to_items.entry(s.user).or_default().insert(s.item);
            item_to_users.entry(s.item).or_default().insert(s.user);
        }

        if duplicates > 0 {
            warn!(duplicates, "duplicate (user, item) ratings; keeping the last value");
        }

        Self::new(user_to_items, item_to_users, ratings)
    }

    /// Items rated by `user`, or `None` if the user has no ratings.
    #[must_use]
    pub fn items_of(&self, user: UserId) -> Option<&BTreeSet<ItemId>> {
        self.user_to_items.get(&user).filter(|s| !s.is_empty())
    }

    /// Users who rated `item`.
    #[must_use]
    pub fn users_of(&self, item: ItemId) -> Option<&BTreeSet<UserId>> {
        self.item_to_users.get(&item)
    }

    /// Rating `user` gave `item`, if any.
    #[must_use]
    pub fn rating(&self, user: UserId, item: ItemId) -> Option<Rating> {
        self.ratings.get(&(user, item)).copied()
    }

    /// Highest user ID with at least one rating. The neighborhood pass scans
    /// `0..=max_user_id`.
    #[must_use]
    pub fn max_user_id(&self) -> UserId {
        self.max_user_id
    }

    /// Number of users with at least one rating.
    #[must_use]
    pub fn num_users(&self) -> usize {
        self.user_to_items.values().filter(|s| !s.is_empty()).count()
    }

    /// Number of distinct rated items.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.item_to_users.len()
    }

    /// Total number of ratings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Always `false`: construction rejects empty inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// All ratings as samples, ordered by `(user, item)`.
    #[must_use]
    pub fn samples(&self) -> Vec<RatingSample> {
        let mut out: Vec<RatingSample> = self
            .ratings
            .iter()
            .map(|(&(user, item), &rating)| RatingSample { user, item, rating })
            .collect();
        out.sort_unstable_by_key(|s| (s.user, s.item));
        out
    }
}
