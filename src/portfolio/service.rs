//! Portfolio Read Service
//!
//! Composes profile, projects, testimonials and the current rating aggregate
//! into one response, plus the simple create/read persistence around them.
//! Reads never mutate state; the rating shown is whatever the aggregation
//! service most recently committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::rating::{RatingService, RatingServiceError};
use crate::testimonial::{Testimonial, TestimonialRepository};

/// Portfolio owner profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub expertise: Vec<String>,
    pub resume: Option<String>,
}

/// A project shown on a portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub link: Option<String>,
    /// Email of the owning profile
    pub email: String,
    pub advantages: Option<String>,
}

/// Contact-form feedback record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

/// The composed public portfolio view
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub profile: Option<Profile>,
    pub projects: Vec<Project>,
    pub testimonials: Vec<Testimonial>,
    /// Current average rating, or null when no testimonial exists
    pub rating: Option<f64>,
}

/// Errors from portfolio reads and writes
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Rating(#[from] RatingServiceError),
}

/// Service for portfolio data
#[derive(Debug, Clone)]
pub struct PortfolioService {
    pool: PgPool,
    testimonials: TestimonialRepository,
    ratings: RatingService,
}

impl PortfolioService {
    /// Create a new PortfolioService
    pub fn new(pool: PgPool) -> Self {
        Self {
            testimonials: TestimonialRepository::new(pool.clone()),
            ratings: RatingService::new(pool.clone()),
            pool,
        }
    }

    /// Compose the full portfolio for a profile email.
    pub async fn get_portfolio(&self, email: &str) -> Result<PortfolioView, PortfolioError> {
        let profile = self.get_profile(email).await?;
        let projects = self.list_projects(Some(email)).await?;
        let testimonials = self.testimonials.list_for_profile(email).await?;
        let rating = self
            .ratings
            .get_aggregate(email)
            .await?
            .and_then(|aggregate| aggregate.average());

        Ok(PortfolioView {
            profile,
            projects,
            testimonials,
            rating,
        })
    }

    /// Create a profile and return its generated id.
    pub async fn create_profile(
        &self,
        name: &str,
        email: &str,
        bio: Option<&str>,
        expertise: &[String],
        resume: Option<&str>,
    ) -> Result<Uuid, PortfolioError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, email, bio, expertise, resume)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(bio)
        .bind(expertise)
        .bind(resume)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Fetch a single profile by email.
    pub async fn get_profile(&self, email: &str) -> Result<Option<Profile>, PortfolioError> {
        let row: Option<(Uuid, String, String, Option<String>, Vec<String>, Option<String>)> =
            sqlx::query_as(
                r#"
                SELECT id, name, email, bio, expertise, resume
                FROM profiles
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, name, email, bio, expertise, resume)| Profile {
            id,
            name,
            email,
            bio,
            expertise,
            resume,
        }))
    }

    /// List profiles, optionally filtered by email.
    pub async fn list_profiles(
        &self,
        email: Option<&str>,
    ) -> Result<Vec<Profile>, PortfolioError> {
        let rows: Vec<(Uuid, String, String, Option<String>, Vec<String>, Option<String>)> =
            match email {
                Some(email) => {
                    sqlx::query_as(
                        r#"
                        SELECT id, name, email, bio, expertise, resume
                        FROM profiles
                        WHERE email = $1
                        "#,
                    )
                    .bind(email)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as(
                        r#"
                        SELECT id, name, email, bio, expertise, resume
                        FROM profiles
                        ORDER BY name
                        "#,
                    )
                    .fetch_all(&self.pool)
                    .await?
                }
            };

        Ok(rows
            .into_iter()
            .map(|(id, name, email, bio, expertise, resume)| Profile {
                id,
                name,
                email,
                bio,
                expertise,
                resume,
            })
            .collect())
    }

    /// Create a project and return its generated id.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_project(
        &self,
        title: &str,
        description: Option<&str>,
        technologies: &[String],
        link: Option<&str>,
        email: &str,
        advantages: Option<&str>,
    ) -> Result<Uuid, PortfolioError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO projects (id, title, description, technologies, link, email, advantages)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(technologies)
        .bind(link)
        .bind(email)
        .bind(advantages)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// List projects, optionally filtered by owning profile email.
    pub async fn list_projects(
        &self,
        email: Option<&str>,
    ) -> Result<Vec<Project>, PortfolioError> {
        let rows: Vec<(
            Uuid,
            String,
            Option<String>,
            Vec<String>,
            Option<String>,
            String,
            Option<String>,
        )> = match email {
            Some(email) => {
                sqlx::query_as(
                    r#"
                    SELECT id, title, description, technologies, link, email, advantages
                    FROM projects
                    WHERE email = $1
                    "#,
                )
                .bind(email)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, title, description, technologies, link, email, advantages
                    FROM projects
                    ORDER BY title
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(
                |(id, title, description, technologies, link, email, advantages)| Project {
                    id,
                    title,
                    description,
                    technologies,
                    link,
                    email,
                    advantages,
                },
            )
            .collect())
    }

    /// Store contact-form feedback.
    pub async fn create_feedback(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<Uuid, PortfolioError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO feedback (id, name, email, message, submitted_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}
