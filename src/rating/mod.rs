//! Rating aggregation module
//!
//! The single authoritative writer of the per-profile rating aggregate.

mod service;

pub use service::{RatingService, RatingServiceError};
