//! Testimonial Submission Handler
//!
//! Orchestrates the submission workflow:
//! Received -> Persisted -> Aggregated -> Complete.
//!
//! Once a testimonial is persisted it is never rolled back. If the aggregate
//! fold fails afterwards, the workflow still reports the testimonial as
//! stored, with a warning status; reconciliation is the recovery path.

use sqlx::PgPool;

use crate::domain::{DomainError, Rating};
use crate::error::AppError;
use crate::rating::RatingService;

use super::{SubmissionStatus, SubmitTestimonialCommand, SubmitTestimonialResult, TestimonialRepository};

/// Workflow states for a testimonial submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkflowState {
    Received,
    Persisted,
    Aggregated,
}

/// Handler for testimonial submission
pub struct SubmitTestimonialHandler {
    repository: TestimonialRepository,
    rating_service: RatingService,
    pool: PgPool,
}

impl SubmitTestimonialHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TestimonialRepository::new(pool.clone()),
            rating_service: RatingService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the submit testimonial command
    pub async fn execute(
        &self,
        command: SubmitTestimonialCommand,
    ) -> Result<SubmitTestimonialResult, AppError> {
        let mut state = WorkflowState::Received;
        tracing::trace!(profile_email = %command.profile_email, workflow_state = ?state, "Submission received");

        // Validate before any write: no partial state on rejection
        let rating = Self::validate(&command)?;

        // Profile existence is this workflow's responsibility, not the
        // rating service's
        let profile_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM profiles WHERE email = $1)",
        )
        .bind(&command.profile_email)
        .fetch_one(&self.pool)
        .await?;

        if !profile_exists {
            return Err(AppError::ProfileNotFound(command.profile_email));
        }

        // Received -> Persisted: durable from here on
        let testimonial_id = self
            .repository
            .insert(
                &command.profile_email,
                &command.reviewer_email,
                &command.author_name,
                &command.content,
                rating.value(),
            )
            .await?;
        state = WorkflowState::Persisted;
        tracing::trace!(testimonial_id = %testimonial_id, workflow_state = ?state, "Testimonial persisted");

        // Persisted -> Aggregated. The fold runs on a detached task so a
        // client disconnect cannot cancel it between persist and aggregate.
        let service = self.rating_service.clone();
        let profile_email = command.profile_email.clone();
        let fold = tokio::spawn(async move {
            service.record_rating(&profile_email, rating).await
        });

        let (status, aggregate) = match fold.await {
            Ok(Ok(aggregate)) => {
                state = WorkflowState::Aggregated;
                (SubmissionStatus::Complete, Some(aggregate))
            }
            Ok(Err(e)) => {
                tracing::error!(
                    testimonial_id = %testimonial_id,
                    profile_email = %command.profile_email,
                    error = %e,
                    "Aggregation failed after testimonial was persisted; reconcile to recover"
                );
                (SubmissionStatus::CompleteWithWarning, None)
            }
            Err(join_err) => {
                tracing::error!(
                    testimonial_id = %testimonial_id,
                    profile_email = %command.profile_email,
                    error = %join_err,
                    "Aggregation task failed after testimonial was persisted; reconcile to recover"
                );
                (SubmissionStatus::CompleteWithWarning, None)
            }
        };

        tracing::debug!(
            testimonial_id = %testimonial_id,
            profile_email = %command.profile_email,
            workflow_state = ?state,
            status = %status,
            "Testimonial submission finished"
        );

        Ok(SubmitTestimonialResult {
            testimonial_id,
            status,
            aggregate,
        })
    }

    /// Check required fields and rating range.
    fn validate(command: &SubmitTestimonialCommand) -> Result<Rating, DomainError> {
        if command.profile_email.trim().is_empty() {
            return Err(DomainError::MissingField("profile_email"));
        }
        if command.reviewer_email.trim().is_empty() {
            return Err(DomainError::MissingField("reviewer_email"));
        }
        if command.author_name.trim().is_empty() {
            return Err(DomainError::MissingField("author_name"));
        }
        if command.content.trim().is_empty() {
            return Err(DomainError::MissingField("content"));
        }

        Ok(Rating::new(command.rating)?)
    }
}
