//! Rating types
//!
//! Domain primitives for star ratings and the per-profile rating aggregate.
//! A `Rating` is validated at construction time, ensuring out-of-range values
//! cannot exist in the system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum allowed star rating
pub const MIN_RATING: i32 = 1;

/// Maximum allowed star rating
pub const MAX_RATING: i32 = 5;

/// Rating represents a validated star rating.
///
/// # Invariants
/// - Value is an integer in [1, 5]
///
/// # Example
/// ```
/// use portfolio_api::domain::Rating;
///
/// let rating = Rating::new(4).unwrap();
/// assert_eq!(rating.value(), 4);
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

/// Errors that can occur when creating a Rating
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("Rating must be between {MIN_RATING} and {MAX_RATING} (got {0})")]
    OutOfRange(i32),
}

impl Rating {
    /// Create a new Rating with validation.
    ///
    /// # Errors
    /// - `RatingError::OutOfRange` if value is not in [1, 5]
    pub fn new(value: i32) -> Result<Self, RatingError> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(RatingError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying integer value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Per-profile rating summary.
///
/// A materialized view over the profile's testimonial history: `rating_sum`
/// is the sum of all ratings ever folded in, `rating_count` the number of
/// testimonials counted exactly once each. The displayed average is always
/// derived from sum and count, never taken from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    /// Email of the profile being rated (unique key)
    pub profile_email: String,

    /// Sum of all ratings applied
    pub rating_sum: i64,

    /// Number of testimonials folded into the aggregate
    pub rating_count: i64,
}

impl RatingAggregate {
    /// Create an aggregate holding a single rating.
    pub fn first(profile_email: impl Into<String>, rating: Rating) -> Self {
        Self {
            profile_email: profile_email.into(),
            rating_sum: rating.value() as i64,
            rating_count: 1,
        }
    }

    /// The average rating, or None when no testimonials have been counted.
    pub fn average(&self) -> Option<f64> {
        if self.rating_count == 0 {
            None
        } else {
            Some(self.rating_sum as f64 / self.rating_count as f64)
        }
    }

    /// Fold one more rating into the summary.
    pub fn fold(&self, rating: Rating) -> Self {
        Self {
            profile_email: self.profile_email.clone(),
            rating_sum: self.rating_sum + rating.value() as i64,
            rating_count: self.rating_count + 1,
        }
    }
}
