//! Serve and return rating systems for tennis.
//!
//! Each competitor carries one or two ratings which are updated match by match
//! from the observed share of service points won. Expected serve percentages are
//! combined into a match win probability by the closed-form recursions in
//! [`tennis`], and models are fitted by minimizing log-loss with [`optimizer`].

pub mod data_processing;
pub mod error;
pub mod experiment_config;
pub mod metrics;
pub mod models;
pub mod numerical;
pub mod optimizer;
pub mod summary;
pub mod systems;
pub mod tennis;

pub use error::{Error, Result};
