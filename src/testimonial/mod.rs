//! Testimonial module
//!
//! Append-only testimonial persistence and the submission workflow that
//! folds each new rating into the subject profile's aggregate.

mod commands;
mod handler;
mod repository;

pub use commands::{SubmissionStatus, SubmitTestimonialCommand, SubmitTestimonialResult};
pub use handler::SubmitTestimonialHandler;
pub use repository::{Testimonial, TestimonialRepository};
