//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::error::AppError;
use crate::portfolio::{PortfolioService, PortfolioView, Profile, Project};
use crate::rating::RatingService;
use crate::testimonial::{SubmissionStatus, SubmitTestimonialCommand, SubmitTestimonialHandler};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTestimonialRequest {
    pub profile_email: String,
    pub reviewer_email: String,
    pub author_name: String,
    pub content: String,
    /// Raw rating; range-validated server-side before any write. Any extra
    /// payload fields (such as a client-computed average) are ignored.
    pub rating: i32,
}

#[derive(Debug, Serialize)]
pub struct SubmitTestimonialResponse {
    pub testimonial_id: Uuid,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RatingAggregateResponse {
    pub profile_email: String,
    /// Null when the aggregate counts zero testimonials
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub profile_email: String,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub resume: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateProfileResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub email: String,
    #[serde(default)]
    pub advantages: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub visitor: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub visitor: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub id: Uuid,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Accounts
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users", get(get_user))
        // Profiles
        .route("/profiles", post(create_profile).get(list_profiles))
        // Rating aggregate (read + recovery; the only write path for the
        // aggregate is testimonial submission)
        .route("/profiles/:email/rating", get(get_rating_aggregate))
        .route("/profiles/:email/rating/reconcile", post(reconcile_rating))
        // Projects
        .route("/projects", post(create_project).get(list_projects))
        // Testimonials
        .route("/testimonials", post(submit_testimonial))
        // Portfolio read composition
        .route("/portfolio", get(get_portfolio))
        // Contact form
        .route("/feedback", post(submit_feedback))
}

// =========================================================================
// POST /testimonials
// =========================================================================

/// Submit a testimonial and fold its rating into the profile's aggregate
async fn submit_testimonial(
    State(pool): State<PgPool>,
    Json(request): Json<SubmitTestimonialRequest>,
) -> Result<(StatusCode, Json<SubmitTestimonialResponse>), AppError> {
    let handler = SubmitTestimonialHandler::new(pool);

    let command = SubmitTestimonialCommand::new(
        request.profile_email,
        request.reviewer_email,
        request.author_name,
        request.content,
        request.rating,
    );

    let result = handler.execute(command).await?;

    let (average_rating, rating_count) = match &result.aggregate {
        Some(aggregate) => (aggregate.average(), Some(aggregate.rating_count)),
        None => (None, None),
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitTestimonialResponse {
            testimonial_id: result.testimonial_id,
            status: result.status,
            average_rating,
            rating_count,
        }),
    ))
}

// =========================================================================
// GET /profiles/:email/rating
// =========================================================================

/// Get the current rating aggregate for a profile, or null if no testimonial
/// has ever been recorded
async fn get_rating_aggregate(
    State(pool): State<PgPool>,
    Path(email): Path<String>,
) -> Result<Json<Option<RatingAggregateResponse>>, AppError> {
    let service = RatingService::new(pool);

    let response = service.get_aggregate(&email).await?.map(|aggregate| {
        RatingAggregateResponse {
            average_rating: aggregate.average(),
            rating_count: aggregate.rating_count,
            profile_email: aggregate.profile_email,
        }
    });

    Ok(Json(response))
}

// =========================================================================
// POST /profiles/:email/rating/reconcile
// =========================================================================

/// Recompute the aggregate from the full testimonial history
async fn reconcile_rating(
    State(pool): State<PgPool>,
    Path(email): Path<String>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let service = RatingService::new(pool);

    let aggregate = service.reconcile(&email).await?;

    Ok(Json(ReconcileResponse {
        average_rating: aggregate.average(),
        rating_count: aggregate.rating_count,
        profile_email: aggregate.profile_email,
    }))
}

// =========================================================================
// GET /portfolio?email=
// =========================================================================

/// Compose profile, projects, testimonials and rating into one response
async fn get_portfolio(
    State(pool): State<PgPool>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<PortfolioView>, AppError> {
    let email = query
        .email
        .ok_or_else(|| AppError::InvalidRequest("Email is required".to_string()))?;

    let service = PortfolioService::new(pool);
    let portfolio = service.get_portfolio(&email).await?;

    Ok(Json(portfolio))
}

// =========================================================================
// POST /profiles, GET /profiles
// =========================================================================

/// Create a new profile
async fn create_profile(
    State(pool): State<PgPool>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<CreateProfileResponse>), AppError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Name and email are required".to_string(),
        ));
    }

    let service = PortfolioService::new(pool);
    let id = service
        .create_profile(
            &request.name,
            &request.email,
            request.bio.as_deref(),
            &request.expertise,
            request.resume.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProfileResponse {
            id,
            email: request.email,
        }),
    ))
}

/// List profiles, optionally filtered by email
async fn list_profiles(
    State(pool): State<PgPool>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let service = PortfolioService::new(pool);
    let profiles = service.list_profiles(query.email.as_deref()).await?;

    Ok(Json(profiles))
}

// =========================================================================
// POST /projects, GET /projects
// =========================================================================

/// Create a new project
async fn create_project(
    State(pool): State<PgPool>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), AppError> {
    if request.title.trim().is_empty() || request.email.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Title and email are required".to_string(),
        ));
    }

    let service = PortfolioService::new(pool);
    let id = service
        .create_project(
            &request.title,
            request.description.as_deref(),
            &request.technologies,
            request.link.as_deref(),
            &request.email,
            request.advantages.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreateProjectResponse { id })))
}

/// List projects, optionally filtered by owning profile email
async fn list_projects(
    State(pool): State<PgPool>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let service = PortfolioService::new(pool);
    let projects = service.list_projects(query.email.as_deref()).await?;

    Ok(Json(projects))
}

// =========================================================================
// POST /register, POST /login, GET /users
// =========================================================================

/// Register a new user
async fn register(
    State(pool): State<PgPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::InvalidRequest(
            "Name, email and password are required".to_string(),
        ));
    }

    let service = AuthService::new(pool);
    let user_id = service
        .register(&request.name, &request.email, &request.password, request.visitor)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Verify login credentials
async fn login(
    State(pool): State<PgPool>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AuthService::new(pool);
    service.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse { authenticated: true }))
}

/// Get user details (including the visitor flag) by email
async fn get_user(
    State(pool): State<PgPool>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let email = query
        .email
        .ok_or_else(|| AppError::InvalidRequest("Email is required".to_string()))?;

    let service = AuthService::new(pool);
    let user = service
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::UserNotFound(email))?;

    Ok(Json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        visitor: user.visitor,
        created_at: user.created_at,
    }))
}

// =========================================================================
// POST /feedback
// =========================================================================

/// Store contact-form feedback
async fn submit_feedback(
    State(pool): State<PgPool>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.message.trim().is_empty()
    {
        return Err(AppError::InvalidRequest(
            "All fields are required".to_string(),
        ));
    }

    let service = PortfolioService::new(pool);
    let id = service
        .create_feedback(&request.name, &request.email, &request.message)
        .await?;

    Ok((StatusCode::CREATED, Json(FeedbackResponse { id })))
}
