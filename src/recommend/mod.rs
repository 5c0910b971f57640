//! User-based collaborative filtering.
//!
//! Each user gets a [`UserProfile`] (mean rating and per-item deviations) and
//! a [`NeighborList`] of the `k` most correlated other users. A rating is
//! predicted as the user's mean plus the correlation-weighted average of the
//! neighbors' deviations on the target item.
//!
//! # Quick Start
//!
//! ```
//! use usercf::config::CfConfig;
//! use usercf::data::{RatingIndex, RatingSample};
//! use usercf::recommend::Neighborhoods;
//!
//! let index = RatingIndex::from_samples(&[
//!     RatingSample::new(0, 1, 5.0),
//!     RatingSample::new(0, 2, 3.0),
//!     RatingSample::new(1, 1, 4.0),
//!     RatingSample::new(1, 2, 2.0),
//! ])
//! .expect("non-empty ratings");
//!
//! let model = Neighborhoods::fit(&index, CfConfig::new().with_k(1).with_min_common_items(1))
//!     .expect("valid configuration");
//!
//! let top = model.neighbors(0).expect("user 0 has a list");
//! assert_eq!(top.as_slice()[0].user, 1);
//!
//! // Nobody else rated item 3, so user 0's mean is returned.
//! assert_eq!(model.predict(0, 3).unwrap(), 4.0);
//! ```

pub mod neighbors;
pub mod predict;
pub mod profile;
pub mod similarity;

pub use neighbors::{Neighbor, NeighborList};
pub use predict::{predict, Neighborhoods};
pub use profile::UserProfile;
pub use similarity::{
    compute_neighborhoods, pearson_weight, CancelToken, NeighborLists, Profiles, SimilarityEngine,
};
