//! Per-user rating profile: mean, deviations from the mean, deviation norm.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{ItemId, Rating, RatingIndex, UserId};
use crate::error::{CfError, Result};

/// A user's mean rating and per-item deviation from it.
///
/// Immutable once built.
///
/// # Examples
///
/// ```
/// use usercf::recommend::UserProfile;
///
/// let profile = UserProfile::from_ratings([(1, 5.0), (2, 3.0)]).unwrap();
///
/// assert_eq!(profile.average(), 4.0);
/// assert_eq!(profile.deviation(1), Some(1.0));
/// assert_eq!(profile.deviation(2), Some(-1.0));
/// assert!((profile.norm_sigma() - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    average: Rating,
    deviations: BTreeMap<ItemId, Rating>,
    norm_sigma: Rating,
}

impl UserProfile {
    /// Build a profile from `(item, rating)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::EmptyInput`] if there are no ratings.
    pub fn from_ratings(ratings: impl IntoIterator<Item = (ItemId, Rating)>) -> Result<Self> {
        let ratings: BTreeMap<ItemId, Rating> = ratings.into_iter().collect();
        if ratings.is_empty() {
            return Err(CfError::empty_input("user profile ratings"));
        }

        let average = ratings.values().sum::<Rating>() / ratings.len() as Rating;
        let deviations: BTreeMap<ItemId, Rating> = ratings
            .into_iter()
            .map(|(item, rating)| (item, rating - average))
            .collect();
        let norm_sigma = deviations.values().map(|d| d * d).sum::<Rating>().sqrt();

        Ok(Self {
            average,
            deviations,
            norm_sigma,
        })
    }

    /// Build the profile of `user` from the rating index.
    ///
    /// # Errors
    ///
    /// - [`CfError::EmptyUser`] if the user has no ratings.
    /// - [`CfError::InconsistentIndex`] if a listed item has no rating.
    pub fn from_index(index: &RatingIndex, user: UserId) -> Result<Self> {
        let items = index.items_of(user).ok_or(CfError::EmptyUser { user })?;

        let ratings = items
            .iter()
            .map(|&item| {
                index
                    .rating(user, item)
                    .map(|r| (item, r))
                    .ok_or_else(|| CfError::InconsistentIndex {
                        user,
                        item,
                        reason: "no rating recorded for listed item".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_ratings(ratings)
    }

    /// Profile for a user without ratings: a fixed average, no deviations.
    #[must_use]
    pub fn neutral(average: Rating) -> Self {
        Self {
            average,
            deviations: BTreeMap::new(),
            norm_sigma: 0.0,
        }
    }

    /// Mean rating.
    #[must_use]
    pub fn average(&self) -> Rating {
        self.average
    }

    /// Deviation from the mean for `item`, if the user rated it.
    #[must_use]
    pub fn deviation(&self, item: ItemId) -> Option<Rating> {
        self.deviations.get(&item).copied()
    }

    /// All deviations, ordered by item.
    #[must_use]
    pub fn deviations(&self) -> &BTreeMap<ItemId, Rating> {
        &self.deviations
    }

    /// L2 norm of the deviation vector.
    #[must_use]
    pub fn norm_sigma(&self) -> Rating {
        self.norm_sigma
    }

    /// Number of rated items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deviations.len()
    }

    /// True for a neutral profile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deviations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RatingSample;

    #[test]
    fn test_from_ratings_mean_and_deviation() {
        let p = UserProfile::from_ratings([(3, 2.0), (1, 4.0), (2, 3.0)]).expect("ratings");
        assert_eq!(p.average(), 3.0);
        assert_eq!(p.deviation(1), Some(1.0));
        assert_eq!(p.deviation(2), Some(0.0));
        assert_eq!(p.deviation(3), Some(-1.0));
        assert_eq!(p.deviation(4), None);
        assert!((p.norm_sigma() - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn test_constant_ratings_have_zero_sigma() {
        let p = UserProfile::from_ratings([(1, 3.5), (2, 3.5), (3, 3.5)]).expect("ratings");
        assert_eq!(p.average(), 3.5);
        assert_eq!(p.norm_sigma(), 0.0);
    }

    #[test]
    fn test_from_ratings_empty() {
        let err = UserProfile::from_ratings(std::iter::empty()).unwrap_err();
        assert!(matches!(err, CfError::EmptyInput(_)));
    }

    #[test]
    fn test_from_index() {
        let index = RatingIndex::from_samples(&[
            RatingSample::new(0, 1, 5.0),
            RatingSample::new(0, 2, 3.0),
            RatingSample::new(2, 1, 1.0),
        ])
        .expect("index");

        let p = UserProfile::from_index(&index, 0).expect("user 0 rated");
        assert_eq!(p.average(), 4.0);

        let err = UserProfile::from_index(&index, 1).unwrap_err();
        assert!(matches!(err, CfError::EmptyUser { user: 1 }));
    }

    #[test]
    fn test_neutral() {
        let p = UserProfile::neutral(3.0);
        assert_eq!(p.average(), 3.0);
        assert!(p.is_empty());
        assert_eq!(p.norm_sigma(), 0.0);
    }
}
