//! Merchant journey across sign-in, store setup and the route guard.
//!
//! Runs the dashboard services against in-memory backends; no database or
//! server needed.

#![allow(clippy::unwrap_used)]

use shopspot_core::{Capability, StoreRole};
use shopspot_dashboard::error::AppError;
use shopspot_dashboard::middleware::{GuardDecision, RouteGuard, View};
use shopspot_dashboard::routes::auth::sign_in;
use shopspot_dashboard::services::{
    MerchantResolver, Navigation, SessionState, SessionStore, SetupError, StoreSetupForm,
    StoreSetupService,
};
use shopspot_integration_tests::{FakeVerifier, MemoryStores};

const EMAIL: &str = "luigi@example.com";
const PASSWORD: &str = "correct horse battery";

fn setup_form(logo: Option<&str>) -> StoreSetupForm {
    StoreSetupForm {
        name: "Luigi's Trattoria".to_owned(),
        address: "12 Harbour Road".to_owned(),
        phone: "(555) 123-4567".to_owned(),
        category: "Restaurant".to_owned(),
        description: Some("Wood-fired pizza and fresh pasta".to_owned()),
        logo_url: logo.map(str::to_owned),
        additional_details: None,
    }
}

async fn signed_in(stores: &MemoryStores, verifier: &FakeVerifier) -> (SessionStore, Navigation) {
    let mut session = SessionStore::new();
    let resolver = MerchantResolver::new(stores);
    let navigation = sign_in(&mut session, verifier, &resolver, EMAIL, PASSWORD)
        .await
        .unwrap()
        .unwrap();
    (session, navigation)
}

#[tokio::test]
async fn test_new_merchant_is_sent_to_store_setup() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);

    let (session, navigation) = signed_in(&stores, &verifier).await;

    assert_eq!(navigation, Navigation::StoreSetup);
    assert_eq!(session.state(), SessionState::Incomplete);
    for view in [View::Dashboard, View::Menu, View::Orders, View::Users] {
        assert_eq!(
            RouteGuard::check(&session, view),
            GuardDecision::Redirect(Navigation::StoreSetup),
            "{view:?}"
        );
    }
    assert_eq!(RouteGuard::check(&session, View::StoreSetup), GuardDecision::Allow);
}

#[tokio::test]
async fn test_setup_then_dashboard_then_return_visit() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let (mut session, _) = signed_in(&stores, &verifier).await;
    let merchant = session.merchant().unwrap().id.clone();

    let store = StoreSetupService::new(&stores)
        .save(&merchant, None, &setup_form(Some("https://cdn.test/logo.png")))
        .await
        .unwrap();

    let navigation = session.complete_store_setup(store.id).unwrap();
    session.refresh_store(&store.name, true);
    session.assign_role(StoreRole::Admin);

    assert_eq!(navigation, Navigation::Dashboard);
    assert_eq!(RouteGuard::check(&session, View::Menu), GuardDecision::Allow);
    assert!(session.permissions().allows(Capability::ManageUsers));

    // A later sign-in resolves the linked, complete store directly.
    session.logout();
    let (session, navigation) = signed_in(&stores, &verifier).await;
    assert_eq!(navigation, Navigation::Dashboard);
    assert_eq!(session.state(), SessionState::Complete);
    let current = session.merchant().unwrap();
    assert_eq!(current.store_id, Some(store.id));
    assert_eq!(current.store_name.as_deref(), Some("Luigi's Trattoria"));
    assert_eq!(current.role, Some(StoreRole::Admin));
}

#[tokio::test]
async fn test_store_without_logo_stays_incomplete_until_uploaded() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let (session, _) = signed_in(&stores, &verifier).await;
    let merchant = session.merchant().unwrap().id.clone();

    let store = StoreSetupService::new(&stores)
        .save(&merchant, None, &setup_form(None))
        .await
        .unwrap();

    let (_, navigation) = signed_in(&stores, &verifier).await;
    assert_eq!(navigation, Navigation::StoreSetup);

    stores.set_logo(store.id, "https://cdn.test/logo.png");
    let (_, navigation) = signed_in(&stores, &verifier).await;
    assert_eq!(navigation, Navigation::Dashboard);
}

#[tokio::test]
async fn test_second_setup_updates_the_same_store() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let (session, _) = signed_in(&stores, &verifier).await;
    let merchant = session.merchant().unwrap().id.clone();
    let service = StoreSetupService::new(&stores);

    let first = service.save(&merchant, None, &setup_form(None)).await.unwrap();
    let mut renamed = setup_form(None);
    renamed.name = "Luigi's Pizzeria".to_owned();
    let second = service
        .save(&merchant, Some(first.id), &renamed)
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(stores.store_count(), 1);
    assert_eq!(stores.store_of(&merchant).unwrap().name, "Luigi's Pizzeria");
}

#[tokio::test]
async fn test_failed_link_leaves_no_store_behind() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let (session, _) = signed_in(&stores, &verifier).await;
    let merchant = session.merchant().unwrap().id.clone();

    stores
        .fail_next_link
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let err = StoreSetupService::new(&stores)
        .save(&merchant, None, &setup_form(Some("https://cdn.test/logo.png")))
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::LinkFailed { .. }));
    assert_eq!(stores.store_count(), 0);
    // The session is untouched, so the merchant is still on store setup.
    assert_eq!(session.state(), SessionState::Incomplete);
    assert_eq!(
        RouteGuard::check(&session, View::Dashboard),
        GuardDecision::Redirect(Navigation::StoreSetup)
    );
}

#[tokio::test]
async fn test_invalid_setup_form_writes_nothing() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let (session, _) = signed_in(&stores, &verifier).await;
    let merchant = session.merchant().unwrap().id.clone();

    let mut form = setup_form(None);
    form.phone = "12-34".to_owned();
    form.name = "   ".to_owned();
    let err = StoreSetupService::new(&stores)
        .save(&merchant, None, &form)
        .await
        .unwrap_err();

    let SetupError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.get("phone"), Some("Please enter a valid phone number"));
    assert_eq!(errors.get("name"), Some("This field is required"));
    assert_eq!(stores.store_count(), 0);
}

#[tokio::test]
async fn test_bad_credentials_leave_session_anonymous() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("merchant-1", EMAIL, PASSWORD);
    let resolver = MerchantResolver::new(&stores);
    let mut session = SessionStore::new();

    let err = sign_in(&mut session, &verifier, &resolver, EMAIL, "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
    assert_eq!(session.state(), SessionState::Anonymous);

    let err = sign_in(&mut session, &verifier, &resolver, "", "")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
    assert_eq!(verifier.calls(), 1);
    assert_eq!(
        RouteGuard::check(&session, View::Dashboard),
        GuardDecision::Redirect(Navigation::SignIn)
    );
}

#[tokio::test]
async fn test_identity_without_id_does_not_sign_in() {
    let stores = MemoryStores::default();
    let verifier = FakeVerifier::new("   ", EMAIL, PASSWORD);
    let resolver = MerchantResolver::new(&stores);
    let mut session = SessionStore::new();

    let navigation = sign_in(&mut session, &verifier, &resolver, EMAIL, PASSWORD)
        .await
        .unwrap();

    assert_eq!(navigation, None);
    assert!(!session.is_authenticated());
}
