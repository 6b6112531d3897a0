//! Common test utilities

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(
        "TRUNCATE TABLE testimonials, rating_aggregates, projects, profiles, feedback, users CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to clean up DB");

    pool
}

/// Insert a profile directly, returning its email
pub async fn seed_profile(pool: &PgPool, email: &str, name: &str) {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, name, email, bio, expertise, resume)
        VALUES ($1, $2, $3, NULL, '{}', NULL)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(uuid::Uuid::new_v4())
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .expect("Failed to seed profile");
}
