//! Domain module
//!
//! Core domain types and business logic.

pub mod error;
pub mod rating;

pub use error::DomainError;
pub use rating::{Rating, RatingAggregate, RatingError, MAX_RATING, MIN_RATING};
