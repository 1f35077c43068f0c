//! Integration tests for `PgContext`.
//!
//! These need a running PostgreSQL reachable through `DATABASE_URL`; run
//! them with `cargo test -- --ignored`.

use eventhub_core::entity::{Entity, Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::store::Store;
use eventhub_events::application::event_service::default_packages;
use eventhub_events::data::entities::{EventEntity, EventPackageEntity, PackageEntity};
use eventhub_store::pg_context::PgContext;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Helper to build an event graph with the default packages and assigned ids.
fn make_event(title: &str) -> EventEntity {
    let mut event = EventEntity {
        title: Some(title.to_owned()),
        location: Some("Hall A".to_owned()),
        packages: default_packages(),
        ..EventEntity::default()
    };
    event.assign_identity();
    event
}

// --- insert + fetch round-trip ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_fetch_event_with_package_details(pool: PgPool) {
    let ctx = PgContext::new(pool);
    let event = make_event("Launch");

    Store::<EventEntity>::insert(&ctx, &event).await.unwrap();

    let loaded = Store::<EventEntity>::fetch_first(
        &ctx,
        &Predicate::id(event.id.clone()),
        Include::JoinsAndTargets,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(loaded.title.as_deref(), Some("Launch"));
    assert_eq!(loaded.packages.len(), 2);
    let mut prices: Vec<Decimal> = loaded
        .packages
        .iter()
        .map(|j| j.package.as_ref().unwrap().price)
        .collect();
    prices.sort();
    assert_eq!(prices, vec![Decimal::new(199, 0), Decimal::new(499, 0)]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_all_with_joins_leaves_packages_unloaded(pool: PgPool) {
    let ctx = PgContext::new(pool);
    Store::<EventEntity>::insert(&ctx, &make_event("Launch"))
        .await
        .unwrap();

    let events = Store::<EventEntity>::fetch_all(&ctx, Include::Joins)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].packages.len(), 2);
    assert!(events[0].packages.iter().all(|j| j.package.is_none()));
}

// --- constraints ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_event_id_is_conflict(pool: PgPool) {
    let ctx = PgContext::new(pool);
    let event = make_event("Launch");
    Store::<EventEntity>::insert(&ctx, &event).await.unwrap();

    let result = Store::<EventEntity>::insert(&ctx, &EventEntity::with_id(event.id.clone())).await;

    match result {
        Err(DomainError::Conflict(_)) => {}
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_graph_insert_rolls_back(pool: PgPool) {
    let ctx = PgContext::new(pool);
    let mut event = make_event("Launch");
    // Second join points at a package that does not exist.
    event.packages.push(EventPackageEntity {
        id: "dangling".to_owned(),
        event_id: event.id.clone(),
        package_id: "missing".to_owned(),
        package: None,
    });

    let result = Store::<EventEntity>::insert(&ctx, &event).await;

    assert!(matches!(result, Err(DomainError::Persistence(_))));
    assert!(Store::<EventEntity>::fetch_all(&ctx, Include::Nothing)
        .await
        .unwrap()
        .is_empty());
    assert!(Store::<PackageEntity>::fetch_all(&ctx, Include::Nothing)
        .await
        .unwrap()
        .is_empty());
}

// --- delete ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_remove_event_cascades_to_join_rows(pool: PgPool) {
    let ctx = PgContext::new(pool);
    let event = make_event("Launch");
    Store::<EventEntity>::insert(&ctx, &event).await.unwrap();

    let removed = Store::<EventEntity>::remove(&ctx, &event.id).await.unwrap();

    assert_eq!(removed, 1);
    assert!(Store::<EventPackageEntity>::fetch_all(&ctx, Include::Nothing)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        Store::<EventEntity>::remove(&ctx, &event.id).await.unwrap(),
        0
    );
}

// --- predicates ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_any_matches_on_declared_fields(pool: PgPool) {
    let ctx = PgContext::new(pool);
    Store::<EventEntity>::insert(&ctx, &make_event("Launch"))
        .await
        .unwrap();

    let hit = Store::<EventEntity>::any(&ctx, &Predicate::eq("title", "Launch"))
        .await
        .unwrap();
    let miss = Store::<EventEntity>::any(&ctx, &Predicate::eq("title", "Gala"))
        .await
        .unwrap();
    let unknown = Store::<EventEntity>::any(&ctx, &Predicate::eq("title; DROP", "x")).await;

    assert!(hit);
    assert!(!miss);
    assert!(matches!(unknown, Err(DomainError::Validation(_))));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_join_may_reference_package_added_earlier_in_same_graph(pool: PgPool) {
    let ctx = PgContext::new(pool);
    let mut event = make_event("Launch");
    let shared_id = event.packages[0].package_id.clone();
    event.packages.push(EventPackageEntity {
        id: "join-shared".to_owned(),
        event_id: event.id.clone(),
        package_id: shared_id,
        package: None,
    });

    Store::<EventEntity>::insert(&ctx, &event).await.unwrap();

    let joins = Store::<EventPackageEntity>::fetch_all(&ctx, Include::Nothing)
        .await
        .unwrap();
    assert_eq!(joins.len(), 3);
}
