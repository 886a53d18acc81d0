//! Store membership updates against `PostgreSQL`.
//!
//! These tests require a migrated database (`shopspot-cli migrate`) at
//! `DASHBOARD_DATABASE_URL`.
//!
//! Run with: cargo test -p shopspot-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sqlx::PgPool;

use shopspot_core::{Email, MerchantId, Phone, StoreCategory, StoreId, StoreRole};
use shopspot_dashboard::db::{
    MerchantRepository, RepositoryError, StoreRepository, StoreUserRepository,
};
use shopspot_dashboard::models::StoreDraft;

async fn pool() -> PgPool {
    let url = std::env::var("DASHBOARD_DATABASE_URL").expect("DASHBOARD_DATABASE_URL not set");
    PgPool::connect(&url).await.expect("Failed to connect")
}

async fn merchant(pool: &PgPool) -> MerchantId {
    let tag = uuid::Uuid::new_v4();
    let id = MerchantId::parse(&tag.to_string()).unwrap();
    let email = Email::parse(&format!("member-{tag}@example.com")).unwrap();
    MerchantRepository::new(pool)
        .create(&id, &email, None, "not-a-real-hash")
        .await
        .unwrap();
    id
}

async fn store(pool: &PgPool, owner: &MerchantId) -> StoreId {
    let draft = StoreDraft {
        name: "Membership Test Store".to_owned(),
        address: "1 Test Street".to_owned(),
        phone: Phone::parse("5551234567").unwrap(),
        category: StoreCategory::Cafe,
        description: None,
        logo_url: None,
        additional_details: None,
    };
    StoreRepository::new(pool).create(owner, &draft).await.unwrap().id
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_role_and_active_change_together() {
    let pool = pool().await;
    let owner = merchant(&pool).await;
    let member = merchant(&pool).await;
    let store_id = store(&pool, &owner).await;
    let links = StoreUserRepository::new(&pool);
    links.create(&member, store_id, StoreRole::Staff).await.unwrap();

    let link = links
        .update_membership(store_id, &member, Some(StoreRole::Viewer), Some(false))
        .await
        .unwrap();
    assert_eq!(link.role, StoreRole::Viewer);
    assert!(!link.is_active);

    // Omitted fields keep their value.
    let link = links
        .update_membership(store_id, &member, None, Some(true))
        .await
        .unwrap();
    assert_eq!(link.role, StoreRole::Viewer);
    assert!(link.is_active);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_rejected_activation_keeps_role() {
    let pool = pool().await;
    let member = merchant(&pool).await;
    let first = store(&pool, &member).await;
    let second = store(&pool, &member).await;
    let links = StoreUserRepository::new(&pool);

    links.create(&member, first, StoreRole::Staff).await.unwrap();
    links
        .update_membership(first, &member, None, Some(false))
        .await
        .unwrap();
    links.create(&member, second, StoreRole::Admin).await.unwrap();

    // Activating the first link would give the member two active stores.
    let err = links
        .update_membership(first, &member, Some(StoreRole::Viewer), Some(true))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let link = links.get(&member, first).await.unwrap().unwrap();
    assert_eq!(link.role, StoreRole::Staff);
    assert!(!link.is_active);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_unknown_member_is_not_found() {
    let pool = pool().await;
    let owner = merchant(&pool).await;
    let stranger = merchant(&pool).await;
    let store_id = store(&pool, &owner).await;

    let err = StoreUserRepository::new(&pool)
        .update_membership(store_id, &stranger, Some(StoreRole::Admin), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
