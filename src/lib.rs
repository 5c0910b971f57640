//! usercf: user-based collaborative filtering in pure Rust.
//!
//! Predicts how a user would rate an item from the ratings of the users whose
//! taste correlates most with theirs. Training builds a per-user profile and
//! a bounded list of the most similar other users; prediction combines the
//! neighbors' deviations from their own means.
//!
//! # Quick Start
//!
//! ```
//! use usercf::prelude::*;
//!
//! let samples = vec![
//!     RatingSample::new(0, 1, 5.0),
//!     RatingSample::new(0, 2, 3.0),
//!     RatingSample::new(1, 1, 4.0),
//!     RatingSample::new(1, 2, 2.0),
//!     RatingSample::new(1, 3, 4.0),
//! ];
//! let index = RatingIndex::from_samples(&samples).unwrap();
//!
//! let config = CfConfig::new().with_k(1).with_min_common_items(1);
//! let model = Neighborhoods::fit(&index, config).unwrap();
//!
//! let rating = model.predict(0, 3).unwrap();
//! assert!(rating > 4.0 && rating <= 5.0);
//!
//! let report = evaluate(&samples, &model).unwrap();
//! assert!(report.rmse().unwrap() < 1.0);
//! ```
//!
//! # Modules
//!
//! - [`data`]: Rating samples, the bidirectional [`data::RatingIndex`], CSV loading and splitting
//! - [`recommend`]: Profiles, neighbor lists, similarity engine and prediction
//! - [`metrics`]: RMSE/MAE and held-out evaluation
//! - [`config`]: Hyperparameters and policies, loadable from TOML
//! - [`error`]: The crate error type

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod prelude;
pub mod recommend;

pub use error::{CfError, Result};
