//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::RatingAggregate;

/// Command to submit a testimonial for a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestimonialCommand {
    /// Email of the profile being reviewed
    pub profile_email: String,
    /// Email of the reviewer
    pub reviewer_email: String,
    /// Display name of the reviewer
    pub author_name: String,
    /// Testimonial text
    pub content: String,
    /// Star rating, validated to [1, 5] by the workflow
    pub rating: i32,
}

impl SubmitTestimonialCommand {
    pub fn new(
        profile_email: String,
        reviewer_email: String,
        author_name: String,
        content: String,
        rating: i32,
    ) -> Self {
        Self {
            profile_email,
            reviewer_email,
            author_name,
            content,
            rating,
        }
    }
}

/// Outcome of the submission workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Testimonial stored and rating folded into the aggregate
    Complete,
    /// Testimonial stored but aggregation failed; the review is kept and the
    /// aggregate is recoverable via reconciliation
    CompleteWithWarning,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Complete => write!(f, "complete"),
            SubmissionStatus::CompleteWithWarning => write!(f, "complete_with_warning"),
        }
    }
}

/// Result of a successful testimonial submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestimonialResult {
    pub testimonial_id: Uuid,
    pub status: SubmissionStatus,
    /// Updated aggregate, absent when aggregation was deferred to recovery
    pub aggregate: Option<RatingAggregate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_command() {
        let cmd = SubmitTestimonialCommand::new(
            "a@x.com".to_string(),
            "reviewer@x.com".to_string(),
            "Reviewer".to_string(),
            "Great work".to_string(),
            4,
        );

        assert_eq!(cmd.profile_email, "a@x.com");
        assert_eq!(cmd.rating, 4);
    }

    #[test]
    fn test_submission_status_serialization() {
        let json = serde_json::to_string(&SubmissionStatus::CompleteWithWarning).unwrap();
        assert_eq!(json, r#""complete_with_warning""#);

        let status: SubmissionStatus = serde_json::from_str(r#""complete""#).unwrap();
        assert_eq!(status, SubmissionStatus::Complete);
    }
}
