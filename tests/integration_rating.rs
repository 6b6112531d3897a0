//! Rating Aggregation Integration Tests
//!
//! Exercises the rating service directly against the database:
//! concurrent folds must not lose updates, and reconciliation must
//! converge the aggregate onto the testimonial table.

use portfolio_api::domain::Rating;
use portfolio_api::rating::RatingService;
use portfolio_api::testimonial::TestimonialRepository;
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_record_rating_folds_incrementally() {
    let pool = common::setup_test_db().await;
    let service = RatingService::new(pool.clone());
    let email = "fold@example.com";
    common::seed_profile(&pool, email, "Fold Owner").await;

    let agg = service
        .record_rating(email, Rating::new(4).unwrap())
        .await
        .unwrap();
    assert_eq!(agg.rating_sum, 4);
    assert_eq!(agg.rating_count, 1);
    assert_eq!(agg.average(), Some(4.0));

    let agg = service
        .record_rating(email, Rating::new(2).unwrap())
        .await
        .unwrap();
    assert_eq!(agg.rating_sum, 6);
    assert_eq!(agg.rating_count, 2);
    assert_eq!(agg.average(), Some(3.0));
}

#[tokio::test]
async fn test_get_aggregate_absent_for_unrated_profile() {
    let pool = common::setup_test_db().await;
    let service = RatingService::new(pool.clone());

    let agg = service.get_aggregate("nobody@example.com").await.unwrap();
    assert!(agg.is_none());
}

#[tokio::test]
async fn test_concurrent_folds_lose_no_updates() {
    let pool = common::setup_test_db().await;
    let email = "concurrent@example.com";
    common::seed_profile(&pool, email, "Concurrent Owner").await;

    // 20 interleaved folds with ratings 1..=5 cycling
    let mut handles = Vec::new();
    for i in 0..20u32 {
        let service = RatingService::new(pool.clone());
        let email = email.to_string();
        let rating = Rating::new((i % 5 + 1) as i32).unwrap();
        handles.push(tokio::spawn(async move {
            service.record_rating(&email, rating).await
        }));
    }

    let mut expected_sum = 0i64;
    for (i, handle) in handles.into_iter().enumerate() {
        handle.await.unwrap().unwrap();
        expected_sum += (i as i64 % 5) + 1;
    }

    let service = RatingService::new(pool.clone());
    let agg = service.get_aggregate(email).await.unwrap().unwrap();
    assert_eq!(agg.rating_count, 20);
    assert_eq!(agg.rating_sum, expected_sum);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let pool = common::setup_test_db().await;
    let service = RatingService::new(pool.clone());
    let repository = TestimonialRepository::new(pool.clone());
    let email = "idempotent@example.com";
    common::seed_profile(&pool, email, "Idempotent Owner").await;

    for rating in [5, 3] {
        repository
            .insert(email, "reviewer@example.com", "Reviewer", "Solid", rating)
            .await
            .unwrap();
        service
            .record_rating(email, Rating::new(rating).unwrap())
            .await
            .unwrap();
    }

    let first = service.reconcile(email).await.unwrap();
    let second = service.reconcile(email).await.unwrap();
    assert_eq!(first.rating_sum, 8);
    assert_eq!(first.rating_count, 2);
    assert_eq!(first.rating_sum, second.rating_sum);
    assert_eq!(first.rating_count, second.rating_count);
}

#[tokio::test]
async fn test_reconcile_repairs_drift() {
    let pool = common::setup_test_db().await;
    let service = RatingService::new(pool.clone());
    let repository = TestimonialRepository::new(pool.clone());
    let email = "drift@example.com";
    common::seed_profile(&pool, email, "Drift Owner").await;

    // Testimonial persisted but fold never ran (the
    // complete-with-warning path): aggregate lags behind
    repository
        .insert(email, "reviewer@example.com", "Reviewer", "Great", 4)
        .await
        .unwrap();
    repository
        .insert(email, "other@example.com", "Other", "Fine", 2)
        .await
        .unwrap();
    service
        .record_rating(email, Rating::new(4).unwrap())
        .await
        .unwrap();

    let stale = service.get_aggregate(email).await.unwrap().unwrap();
    assert_eq!(stale.rating_count, 1);

    let repaired = service.reconcile(email).await.unwrap();
    assert_eq!(repaired.rating_sum, 6);
    assert_eq!(repaired.rating_count, 2);
    assert_eq!(repaired.average(), Some(3.0));
}

#[tokio::test]
async fn test_reconcile_empty_profile_zeroes_aggregate() {
    let pool = common::setup_test_db().await;
    let service = RatingService::new(pool.clone());
    let email = "empty@example.com";
    common::seed_profile(&pool, email, "Empty Owner").await;

    // Aggregate exists but the testimonials behind it were removed
    service
        .record_rating(email, Rating::new(5).unwrap())
        .await
        .unwrap();
    sqlx::query("DELETE FROM testimonials WHERE profile_email = $1")
        .bind(email)
        .execute(&pool)
        .await
        .unwrap();

    let agg = service.reconcile(email).await.unwrap();
    assert_eq!(agg.rating_sum, 0);
    assert_eq!(agg.rating_count, 0);
    assert_eq!(agg.average(), None);
}

#[tokio::test]
async fn test_testimonials_listed_newest_first() {
    let pool = common::setup_test_db().await;
    let repository = TestimonialRepository::new(pool.clone());
    let email = "order@example.com";
    common::seed_profile(&pool, email, "Order Owner").await;

    let first = repository
        .insert(email, "a@example.com", "A", "First", 3)
        .await
        .unwrap();
    // Distinct timestamps so the ordering is deterministic
    sqlx::query("UPDATE testimonials SET submitted_at = submitted_at - INTERVAL '1 minute' WHERE id = $1")
        .bind(first)
        .execute(&pool)
        .await
        .unwrap();
    let second = repository
        .insert(email, "b@example.com", "B", "Second", 5)
        .await
        .unwrap();

    let listed = repository.list_for_profile(email).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second);
    assert_eq!(listed[1].id, first);
}

#[tokio::test]
async fn test_insert_assigns_unique_ids() {
    let pool = common::setup_test_db().await;
    let repository = TestimonialRepository::new(pool.clone());
    let email = "ids@example.com";
    common::seed_profile(&pool, email, "Ids Owner").await;

    let a = repository
        .insert(email, "a@example.com", "A", "One", 1)
        .await
        .unwrap();
    let b = repository
        .insert(email, "a@example.com", "A", "Two", 2)
        .await
        .unwrap();
    assert_ne!(a, b);
    assert_ne!(a, Uuid::nil());
}
