//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use usercf::prelude::*;
//! ```

pub use crate::config::{CfConfig, DegeneratePolicy, EmptyUserPolicy};
pub use crate::data::{train_test_split, RatingIndex, RatingSample, RatingsParser};
pub use crate::error::{CfError, Result};
pub use crate::metrics::{evaluate, mae, rmse, Evaluation};
pub use crate::recommend::{
    predict, CancelToken, Neighbor, NeighborList, Neighborhoods, SimilarityEngine, UserProfile,
};
