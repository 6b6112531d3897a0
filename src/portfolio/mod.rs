//! Portfolio module
//!
//! Profile, project and feedback persistence plus the public portfolio
//! read composition.

mod service;

pub use service::{Feedback, PortfolioError, PortfolioService, PortfolioView, Profile, Project};
