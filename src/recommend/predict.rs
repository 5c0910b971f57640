//! Deviation-weighted rating prediction from precomputed neighborhoods.

use crate::config::CfConfig;
use crate::data::{ItemId, Rating, RatingIndex, UserId};
use crate::error::{CfError, Result};
use crate::recommend::neighbors::{Neighbor, NeighborList};
use crate::recommend::profile::UserProfile;
use crate::recommend::similarity::{CancelToken, NeighborLists, Profiles, SimilarityEngine};

/// Predict `user`'s rating of `item`.
///
/// ```text
/// r̂(u, m) = avg_u + Σ_j w_uj · dev_j[m] / Σ_j |w_uj|
/// ```
///
/// over the neighbors `j` of `u` that rated `m`. With no such neighbor the
/// prediction is `avg_u`. The result is clamped to `bounds`.
///
/// # Errors
///
/// Returns [`CfError::UnknownUser`] if `user` has no profile, and
/// [`CfError::InvalidHyperparameter`] if `bounds` is inverted or NaN.
///
/// # Examples
///
/// ```
/// use usercf::data::{RatingIndex, RatingSample};
/// use usercf::recommend::{compute_neighborhoods, predict};
///
/// let index = RatingIndex::from_samples(&[
///     RatingSample::new(0, 1, 5.0),
///     RatingSample::new(0, 2, 3.0),
///     RatingSample::new(1, 1, 4.0),
///     RatingSample::new(1, 2, 2.0),
/// ])
/// .unwrap();
/// let (profiles, neighbors) = compute_neighborhoods(&index, 1, 1).unwrap();
///
/// // No neighbor rated item 3: fall back to user 0's mean.
/// assert_eq!(predict(0, 3, &profiles, &neighbors, (0.5, 5.0)).unwrap(), 4.0);
/// ```
pub fn predict(
    user: UserId,
    item: ItemId,
    profiles: &Profiles,
    neighbors: &NeighborLists,
    bounds: (Rating, Rating),
) -> Result<Rating> {
    let (lo, hi) = bounds;
    if !(lo <= hi) {
        return Err(CfError::invalid_hyperparameter(
            "rating_bounds",
            format!("({lo}, {hi})"),
            "min <= max, neither NaN",
        ));
    }
    let profile = profiles.get(&user).ok_or(CfError::UnknownUser { user })?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (neighbor, deviation) in contributions(item, profiles, neighbors.get(&user)) {
        numerator += neighbor.weight * deviation;
        denominator += neighbor.weight.abs();
    }

    let average = profile.average();
    let mut prediction = if denominator == 0.0 {
        average
    } else {
        numerator / denominator + average
    };
    if prediction.is_nan() {
        prediction = average;
    }

    Ok(prediction.clamp(lo, hi))
}

/// Neighbors of a user that rated `item`, paired with their deviation on it.
fn contributions<'a>(
    item: ItemId,
    profiles: &'a Profiles,
    list: Option<&'a NeighborList>,
) -> impl Iterator<Item = (Neighbor, Rating)> + 'a {
    list.into_iter().flatten().filter_map(move |n| {
        profiles
            .get(&n.user)
            .and_then(|p| p.deviation(item))
            .map(|d| (*n, d))
    })
}

/// Fitted user-based collaborative filtering model.
///
/// # Examples
///
/// ```
/// use usercf::config::CfConfig;
/// use usercf::data::{RatingIndex, RatingSample};
/// use usercf::recommend::Neighborhoods;
///
/// let index = RatingIndex::from_samples(&[
///     RatingSample::new(0, 1, 5.0),
///     RatingSample::new(0, 2, 3.0),
///     RatingSample::new(1, 1, 4.0),
///     RatingSample::new(1, 2, 2.0),
///     RatingSample::new(1, 3, 5.0),
/// ])
/// .unwrap();
///
/// let config = CfConfig::new().with_k(1).with_min_common_items(1);
/// let model = Neighborhoods::fit(&index, config).unwrap();
///
/// let rating = model.predict(0, 3).unwrap();
/// assert!(rating > model.profile(0).unwrap().average());
/// ```
#[derive(Debug, Clone)]
pub struct Neighborhoods {
    config: CfConfig,
    profiles: Profiles,
    neighbors: NeighborLists,
}

impl Neighborhoods {
    /// Run the neighborhood pass over `index`.
    ///
    /// # Errors
    ///
    /// Invalid configuration, or a data policy set to fail.
    pub fn fit(index: &RatingIndex, config: CfConfig) -> Result<Self> {
        Self::fit_with_cancel(index, config, &CancelToken::new())
    }

    /// Run the neighborhood pass, stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`Neighborhoods::fit`], plus [`CfError::Cancelled`].
    pub fn fit_with_cancel(
        index: &RatingIndex,
        config: CfConfig,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let engine = SimilarityEngine::new(config)?;
        let (profiles, neighbors) = engine.compute_neighborhoods_with_cancel(index, cancel)?;
        Ok(Self {
            config: engine.config().clone(),
            profiles,
            neighbors,
        })
    }

    /// Assemble a model from precomputed tables.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::InvalidHyperparameter`] if `config` is invalid.
    pub fn from_parts(config: CfConfig, profiles: Profiles, neighbors: NeighborLists) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            profiles,
            neighbors,
        })
    }

    /// Predicted rating of `item` by `user`, clamped to the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::UnknownUser`] if `user` has no profile.
    pub fn predict(&self, user: UserId, item: ItemId) -> Result<Rating> {
        predict(
            user,
            item,
            &self.profiles,
            &self.neighbors,
            self.config.rating_bounds,
        )
    }

    /// Neighbors of `user` that rated `item`, with their deviation on it,
    /// most correlated first.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::UnknownUser`] if `user` has no profile.
    pub fn contributions(&self, user: UserId, item: ItemId) -> Result<Vec<(Neighbor, Rating)>> {
        if !self.profiles.contains_key(&user) {
            return Err(CfError::UnknownUser { user });
        }
        Ok(contributions(item, &self.profiles, self.neighbors.get(&user)).collect())
    }

    /// Profile of `user`.
    #[must_use]
    pub fn profile(&self, user: UserId) -> Option<&UserProfile> {
        self.profiles.get(&user)
    }

    /// Neighbor list of `user`.
    #[must_use]
    pub fn neighbors(&self, user: UserId) -> Option<&NeighborList> {
        self.neighbors.get(&user)
    }

    /// All profiles.
    #[must_use]
    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    /// All neighbor lists.
    #[must_use]
    pub fn neighbor_lists(&self) -> &NeighborLists {
        &self.neighbors
    }

    /// Configuration the model was fitted with.
    #[must_use]
    pub fn config(&self) -> &CfConfig {
        &self.config
    }

    /// Number of users with a profile.
    #[must_use]
    pub fn num_users(&self) -> usize {
        self.profiles.len()
    }
}
