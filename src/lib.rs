//! portfolio_api Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod domain;
pub mod portfolio;
pub mod rating;
pub mod testimonial;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainError, Rating, RatingAggregate, RatingError};
