//! Testimonial Repository
//!
//! Append-only persistence for testimonial records. Testimonials are never
//! updated or deleted; the rating aggregate is a materialized view over the
//! rows stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored testimonial record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: Uuid,
    /// Email of the profile being reviewed
    pub profile_email: String,
    /// Email of the reviewer
    pub reviewer_email: String,
    /// Display name of the reviewer
    pub author_name: String,
    pub content: String,
    pub rating: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Repository for testimonial records
#[derive(Debug, Clone)]
pub struct TestimonialRepository {
    pool: PgPool,
}

impl TestimonialRepository {
    /// Create a new TestimonialRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new testimonial and return its generated id.
    pub async fn insert(
        &self,
        profile_email: &str,
        reviewer_email: &str,
        author_name: &str,
        content: &str,
        rating: i32,
    ) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO testimonials (id, profile_email, reviewer_email, author_name, content, rating, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(id)
        .bind(profile_email)
        .bind(reviewer_email)
        .bind(author_name)
        .bind(content)
        .bind(rating)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// List all testimonials for a profile, newest first.
    pub async fn list_for_profile(
        &self,
        profile_email: &str,
    ) -> Result<Vec<Testimonial>, sqlx::Error> {
        let rows: Vec<(Uuid, String, String, String, String, i32, DateTime<Utc>)> =
            sqlx::query_as(
                r#"
                SELECT id, profile_email, reviewer_email, author_name, content, rating, submitted_at
                FROM testimonials
                WHERE profile_email = $1
                ORDER BY submitted_at DESC
                "#,
            )
            .bind(profile_email)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, profile_email, reviewer_email, author_name, content, rating, submitted_at)| {
                    Testimonial {
                        id,
                        profile_email,
                        reviewer_email,
                        author_name,
                        content,
                        rating,
                        submitted_at,
                    }
                },
            )
            .collect())
    }
}
