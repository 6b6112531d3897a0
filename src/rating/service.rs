//! Rating Aggregation Service
//!
//! Folds testimonial ratings into each profile's aggregate (sum, count,
//! average) and keeps the aggregate consistent with the testimonial history.
//! This service is the only component allowed to write `rating_aggregates`;
//! the aggregate is never set from a caller-supplied value.

use sqlx::PgPool;
use std::time::Duration;

use crate::domain::{Rating, RatingAggregate};

const MAX_RETRIES: u32 = 3;

/// Errors that can occur in the rating service
#[derive(Debug, thiserror::Error)]
pub enum RatingServiceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Maximum retries exceeded
    #[error("Maximum retries exceeded for rating reconciliation")]
    MaxRetriesExceeded,
}

impl RatingServiceError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RatingServiceError::Database(e) => is_transient_conflict(e),
            RatingServiceError::MaxRetriesExceeded => false,
        }
    }
}

/// Serialization failures (40001) and deadlocks (40P01) resolve on retry
fn is_transient_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

/// Rating Aggregation Service
///
/// Holds an injected pool handle; per-profile updates are serialized by the
/// database, submissions for different profiles never block each other.
#[derive(Debug, Clone)]
pub struct RatingService {
    pool: PgPool,
}

impl RatingService {
    /// Create a new RatingService with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fold a new testimonial rating into the profile's aggregate.
    ///
    /// Creates the aggregate lazily on first rating; otherwise applies
    /// `sum += rating; count += 1` as a single increment-in-place upsert, so
    /// concurrent submissions for the same profile cannot lose updates. The
    /// stored average is recomputed in the same statement and can never drift
    /// from sum/count.
    ///
    /// Exactly one row mutation; no testimonial record is touched.
    pub async fn record_rating(
        &self,
        profile_email: &str,
        rating: Rating,
    ) -> Result<RatingAggregate, RatingServiceError> {
        let rating_value = rating.value() as i64;

        let (rating_sum, rating_count): (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO rating_aggregates (profile_email, rating_sum, rating_count, average_rating, updated_at)
            VALUES ($1, $2, 1, $2::float8, NOW())
            ON CONFLICT (profile_email) DO UPDATE
            SET
                rating_sum = rating_aggregates.rating_sum + EXCLUDED.rating_sum,
                rating_count = rating_aggregates.rating_count + 1,
                average_rating = (rating_aggregates.rating_sum + EXCLUDED.rating_sum)::float8
                               / (rating_aggregates.rating_count + 1)::float8,
                updated_at = NOW()
            RETURNING rating_sum, rating_count
            "#,
        )
        .bind(profile_email)
        .bind(rating_value)
        .fetch_one(&self.pool)
        .await?;

        let aggregate = RatingAggregate {
            profile_email: profile_email.to_string(),
            rating_sum,
            rating_count,
        };

        tracing::debug!(
            profile_email = %profile_email,
            rating = %rating,
            rating_sum = rating_sum,
            rating_count = rating_count,
            "Rating folded into aggregate"
        );

        Ok(aggregate)
    }

    /// Get the current aggregate for a profile, or None if no testimonial has
    /// ever been recorded for it.
    pub async fn get_aggregate(
        &self,
        profile_email: &str,
    ) -> Result<Option<RatingAggregate>, RatingServiceError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT rating_sum, rating_count
            FROM rating_aggregates
            WHERE profile_email = $1
            "#,
        )
        .bind(profile_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(rating_sum, rating_count)| RatingAggregate {
            profile_email: profile_email.to_string(),
            rating_sum,
            rating_count,
        }))
    }

    /// Recompute the aggregate from the full testimonial history and
    /// overwrite the stored row, retrying on transient conflicts.
    ///
    /// Idempotent. Used to recover from the persisted-not-aggregated state
    /// and to verify the aggregate invariant. The row lock serializes the
    /// overwrite against concurrent folds, not against submissions in flight:
    /// a testimonial persisted but not yet folded can be counted by the
    /// rescan and folded again afterward, transiently overcounting it.
    /// A repeat reconcile on a quiet profile converges to the true value.
    pub async fn reconcile(
        &self,
        profile_email: &str,
    ) -> Result<RatingAggregate, RatingServiceError> {
        for attempt in 0..MAX_RETRIES {
            match self.try_reconcile(profile_email).await {
                Ok(aggregate) => return Ok(aggregate),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES - 1 => {
                    let delay = Duration::from_millis(50 * (attempt as u64 + 1));
                    tokio::time::sleep(delay).await;
                    tracing::warn!(
                        profile_email = %profile_email,
                        "Reconcile conflict, retrying (attempt {}/{})",
                        attempt + 1,
                        MAX_RETRIES
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(RatingServiceError::MaxRetriesExceeded)
    }

    /// Single reconciliation attempt inside one transaction.
    async fn try_reconcile(
        &self,
        profile_email: &str,
    ) -> Result<RatingAggregate, RatingServiceError> {
        let mut tx = self.pool.begin().await?;

        // Lock the aggregate row so concurrent folds serialize against the
        // rescan. A profile that has never been rated has no row to lock;
        // the closing upsert keeps that case safe.
        sqlx::query("SELECT 1 FROM rating_aggregates WHERE profile_email = $1 FOR UPDATE")
            .bind(profile_email)
            .fetch_optional(&mut *tx)
            .await?;

        let (rating_sum, rating_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(rating), 0)::bigint, COUNT(*)
            FROM testimonials
            WHERE profile_email = $1
            "#,
        )
        .bind(profile_email)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO rating_aggregates (profile_email, rating_sum, rating_count, average_rating, updated_at)
            VALUES ($1, $2, $3,
                    CASE WHEN $3 = 0 THEN NULL ELSE $2::float8 / $3::float8 END,
                    NOW())
            ON CONFLICT (profile_email) DO UPDATE
            SET
                rating_sum = EXCLUDED.rating_sum,
                rating_count = EXCLUDED.rating_count,
                average_rating = EXCLUDED.average_rating,
                updated_at = NOW()
            "#,
        )
        .bind(profile_email)
        .bind(rating_sum)
        .bind(rating_count)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            profile_email = %profile_email,
            rating_sum = rating_sum,
            rating_count = rating_count,
            "Aggregate reconciled from testimonial history"
        );

        Ok(RatingAggregate {
            profile_email: profile_email.to_string(),
            rating_sum,
            rating_count,
        })
    }
}
