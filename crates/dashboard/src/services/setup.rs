//! Store setup and profile save flow.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopspot_core::{Email, MerchantId, OpeningHours, Phone, StoreCategory, StoreId, StoreRole};

use crate::db::{PgStores, RepositoryError};
use crate::error::FieldErrors;
use crate::models::{Store, StoreDraft, StoreLink, StoreProfileUpdate};

const REQUIRED: &str = "This field is required";
const INVALID_PHONE: &str = "Please enter a valid phone number";
const INVALID_CATEGORY: &str = "Please choose a store category";
const INVALID_EMAIL: &str = "Please enter a valid email address";

/// Store fields submitted from the setup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSetupForm {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub additional_details: Option<String>,
}

fn optional(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl StoreSetupForm {
    /// Check the form and build the draft to save.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<StoreDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("phone", &self.phone),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                errors.add(field, REQUIRED);
            }
        }

        let phone = Phone::parse(&self.phone)
            .inspect_err(|_| errors.add("phone", INVALID_PHONE))
            .ok();
        let category = self
            .category
            .parse::<StoreCategory>()
            .inspect_err(|_| errors.add("category", INVALID_CATEGORY))
            .ok();

        match (phone, category) {
            (Some(phone), Some(category)) if errors.is_empty() => Ok(StoreDraft {
                name: self.name.trim().to_owned(),
                address: self.address.trim().to_owned(),
                phone,
                category,
                description: optional(self.description.as_ref()),
                logo_url: optional(self.logo_url.as_ref()),
                additional_details: optional(self.additional_details.as_ref()),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Store> for StoreSetupForm {
    fn from(store: &Store) -> Self {
        Self {
            name: store.name.clone(),
            address: store.address.clone(),
            phone: store.phone.clone(),
            category: store.category.as_str().to_owned(),
            description: store.description.clone(),
            logo_url: store.logo_url.clone(),
            additional_details: store.additional_details.clone(),
        }
    }
}

/// Profile edit: the setup fields plus contact email and opening hours.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreProfileForm {
    #[serde(flatten)]
    pub store: StoreSetupForm,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

impl StoreProfileForm {
    /// Check the form. Missing opening hours fall back to `current`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, current: &OpeningHours) -> Result<StoreProfileUpdate, FieldErrors> {
        let draft = self.store.validate();
        let mut errors = draft.as_ref().err().cloned().unwrap_or_default();

        let email = optional(self.email.as_ref())
            .map(|raw| Email::parse(&raw))
            .transpose()
            .inspect_err(|_| errors.add("email", INVALID_EMAIL))
            .ok()
            .flatten();

        let opening_hours = self.opening_hours.clone().unwrap_or_else(|| current.clone());
        if let Err(message) = opening_hours.validate() {
            errors.add("opening_hours", &message);
        }

        match draft {
            Ok(draft) if errors.is_empty() => Ok(StoreProfileUpdate {
                draft,
                email,
                opening_hours,
            }),
            _ => Err(errors),
        }
    }
}

/// Store and link writes needed by the setup flow.
pub trait StoreWriter: Send + Sync {
    fn create_store(
        &self,
        owner: &MerchantId,
        draft: &StoreDraft,
    ) -> impl Future<Output = Result<Store, RepositoryError>> + Send;

    fn update_store(
        &self,
        id: StoreId,
        draft: &StoreDraft,
    ) -> impl Future<Output = Result<Store, RepositoryError>> + Send;

    fn create_link(
        &self,
        merchant: &MerchantId,
        store: StoreId,
        role: StoreRole,
    ) -> impl Future<Output = Result<StoreLink, RepositoryError>> + Send;

    fn delete_store(&self, id: StoreId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl StoreWriter for PgStores<'_> {
    async fn create_store(
        &self,
        owner: &MerchantId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        self.stores().create(owner, draft).await
    }

    async fn update_store(&self, id: StoreId, draft: &StoreDraft) -> Result<Store, RepositoryError> {
        self.stores().update(id, draft).await
    }

    async fn create_link(
        &self,
        merchant: &MerchantId,
        store: StoreId,
        role: StoreRole,
    ) -> Result<StoreLink, RepositoryError> {
        self.links().create(merchant, store, role).await
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), RepositoryError> {
        self.stores().delete(id).await
    }
}

/// Store setup failures.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("store setup form is invalid: {0}")]
    Validation(FieldErrors),

    #[error("failed to save store: {0}")]
    Save(#[source] RepositoryError),

    /// The store was created, linking failed, and the store was removed again.
    #[error("failed to link store {store_id} to merchant: {source}")]
    LinkFailed {
        store_id: StoreId,
        #[source]
        source: RepositoryError,
    },

    /// The store was created, linking failed, and removing it failed too.
    #[error("store {store_id} is orphaned: link failed ({link}), cleanup failed ({cleanup})")]
    Orphaned {
        store_id: StoreId,
        link: RepositoryError,
        cleanup: RepositoryError,
    },
}

/// Runs the setup save against a [`StoreWriter`].
pub struct StoreSetupService<'a, W: ?Sized> {
    writer: &'a W,
}

impl<'a, W> StoreSetupService<'a, W>
where
    W: StoreWriter + ?Sized,
{
    #[must_use]
    pub const fn new(writer: &'a W) -> Self {
        Self { writer }
    }

    /// Validate and save the setup form for `merchant`.
    ///
    /// With an `existing` store the record is updated in place. Otherwise a
    /// store is created and linked to the merchant as admin; if linking fails
    /// the new store is deleted again.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::Validation` before any write when the form is
    /// invalid, otherwise the first failing write.
    #[tracing::instrument(skip(self, form), fields(merchant_id = %merchant))]
    pub async fn save(
        &self,
        merchant: &MerchantId,
        existing: Option<StoreId>,
        form: &StoreSetupForm,
    ) -> Result<Store, SetupError> {
        let draft = form.validate().map_err(SetupError::Validation)?;

        if let Some(store_id) = existing {
            let store = self
                .writer
                .update_store(store_id, &draft)
                .await
                .map_err(SetupError::Save)?;
            tracing::info!(store_id = %store.id, "Store updated");
            return Ok(store);
        }

        let store = self
            .writer
            .create_store(merchant, &draft)
            .await
            .map_err(SetupError::Save)?;

        if let Err(link) = self
            .writer
            .create_link(merchant, store.id, StoreRole::Admin)
            .await
        {
            return Err(match self.writer.delete_store(store.id).await {
                Ok(()) => {
                    tracing::warn!(store_id = %store.id, error = %link, "Store link failed, store removed");
                    SetupError::LinkFailed {
                        store_id: store.id,
                        source: link,
                    }
                }
                Err(cleanup) => {
                    tracing::error!(
                        store_id = %store.id,
                        link_error = %link,
                        cleanup_error = %cleanup,
                        "Store link failed and the store could not be removed"
                    );
                    SetupError::Orphaned {
                        store_id: store.id,
                        link,
                        cleanup,
                    }
                }
            });
        }

        tracing::info!(store_id = %store.id, "Store created and linked");
        Ok(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use shopspot_core::{DayHours, Weekday};

    #[derive(Default)]
    struct FakeWriter {
        calls: Mutex<Vec<&'static str>>,
        fail_create: bool,
        fail_link: bool,
        fail_delete: bool,
    }

    impl FakeWriter {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn denied() -> RepositoryError {
        RepositoryError::PermissionDenied("new row violates row-level security policy".to_owned())
    }

    fn built(id: StoreId, owner: &MerchantId, draft: &StoreDraft) -> Store {
        let now = Utc::now();
        Store {
            id,
            owner_id: owner.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            address: draft.address.clone(),
            phone: draft.phone.to_string(),
            logo_url: draft.logo_url.clone(),
            email: None,
            category: draft.category,
            additional_details: draft.additional_details.clone(),
            opening_hours: OpeningHours::default(),
            created_at: now,
            updated_at: now,
        }
    }

    impl StoreWriter for FakeWriter {
        async fn create_store(
            &self,
            owner: &MerchantId,
            draft: &StoreDraft,
        ) -> Result<Store, RepositoryError> {
            self.record("create_store");
            if self.fail_create {
                return Err(denied());
            }
            Ok(built(StoreId::generate(), owner, draft))
        }

        async fn update_store(
            &self,
            id: StoreId,
            draft: &StoreDraft,
        ) -> Result<Store, RepositoryError> {
            self.record("update_store");
            Ok(built(id, &MerchantId::parse("merchant-1").unwrap(), draft))
        }

        async fn create_link(
            &self,
            merchant: &MerchantId,
            store: StoreId,
            role: StoreRole,
        ) -> Result<StoreLink, RepositoryError> {
            self.record("create_link");
            if self.fail_link {
                return Err(RepositoryError::Conflict(
                    "merchant is already linked to a store".to_owned(),
                ));
            }
            Ok(StoreLink {
                merchant_id: merchant.clone(),
                store_id: store,
                role,
                is_active: true,
                created_at: Utc::now(),
            })
        }

        async fn delete_store(&self, _id: StoreId) -> Result<(), RepositoryError> {
            self.record("delete_store");
            if self.fail_delete {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    fn form() -> StoreSetupForm {
        StoreSetupForm {
            name: "Luigi's Trattoria".to_owned(),
            address: "1 Main St".to_owned(),
            phone: "+1 (555) 123-4567".to_owned(),
            category: "Restaurant".to_owned(),
            description: Some("Wood-fired pizza".to_owned()),
            logo_url: Some("https://cdn.test/logo.png".to_owned()),
            additional_details: None,
        }
    }

    fn merchant() -> MerchantId {
        MerchantId::parse("merchant-1").unwrap()
    }

    #[test]
    fn test_validate_required_fields() {
        let errors = StoreSetupForm::default().validate().unwrap_err();
        for field in ["name", "address", "phone", "category"] {
            assert_eq!(errors.get(field), Some(REQUIRED), "{field}");
        }
    }

    #[test]
    fn test_validate_phone_and_category() {
        let mut bad = form();
        bad.phone = "555-12".to_owned();
        bad.category = "Spaceport".to_owned();
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.get("phone"), Some(INVALID_PHONE));
        assert_eq!(errors.get("category"), Some(INVALID_CATEGORY));
        assert_eq!(errors.get("name"), None);
    }

    #[test]
    fn test_validate_trims_and_drops_blank_optionals() {
        let mut input = form();
        input.name = "  Luigi's  ".to_owned();
        input.additional_details = Some("   ".to_owned());
        input.category = "cafe".to_owned();
        let draft = input.validate().unwrap();
        assert_eq!(draft.name, "Luigi's");
        assert_eq!(draft.additional_details, None);
        assert_eq!(draft.category, StoreCategory::Cafe);
    }

    #[test]
    fn test_profile_form_checks_email_and_hours() {
        let mut hours = OpeningHours::default();
        hours.set_day(
            Weekday::Monday,
            DayHours {
                open: "22:00".to_owned(),
                close: "09:00".to_owned(),
                is_closed: false,
            },
        );
        let profile = StoreProfileForm {
            store: form(),
            email: Some("not-an-email".to_owned()),
            opening_hours: Some(hours),
        };

        let errors = profile.validate(&OpeningHours::default()).unwrap_err();
        assert_eq!(errors.get("email"), Some(INVALID_EMAIL));
        assert!(errors.get("opening_hours").is_some());

        let ok = StoreProfileForm {
            store: form(),
            email: Some("hello@bistro.test".to_owned()),
            opening_hours: None,
        };
        let update = ok.validate(&OpeningHours::default()).unwrap();
        assert_eq!(update.email.unwrap().as_str(), "hello@bistro.test");
        assert_eq!(update.opening_hours, OpeningHours::default());
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_writes() {
        let writer = FakeWriter::default();
        let err = StoreSetupService::new(&writer)
            .save(&merchant(), None, &StoreSetupForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
        assert!(writer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_new_store_is_created_then_linked() {
        let writer = FakeWriter::default();
        let store = StoreSetupService::new(&writer)
            .save(&merchant(), None, &form())
            .await
            .unwrap();
        assert_eq!(store.name, "Luigi's Trattoria");
        assert_eq!(writer.calls(), ["create_store", "create_link"]);
    }

    #[tokio::test]
    async fn test_existing_store_is_updated_in_place() {
        let writer = FakeWriter::default();
        let store_id = StoreId::generate();
        let store = StoreSetupService::new(&writer)
            .save(&merchant(), Some(store_id), &form())
            .await
            .unwrap();
        assert_eq!(store.id, store_id);
        assert_eq!(writer.calls(), ["update_store"]);
    }

    #[tokio::test]
    async fn test_link_failure_removes_store() {
        let writer = FakeWriter {
            fail_link: true,
            ..FakeWriter::default()
        };
        let err = StoreSetupService::new(&writer)
            .save(&merchant(), None, &form())
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::LinkFailed { .. }));
        assert!(err.to_string().contains("already linked"));
        assert_eq!(writer.calls(), ["create_store", "create_link", "delete_store"]);
    }

    #[tokio::test]
    async fn test_failed_cleanup_reports_orphan() {
        let writer = FakeWriter {
            fail_link: true,
            fail_delete: true,
            ..FakeWriter::default()
        };
        let err = StoreSetupService::new(&writer)
            .save(&merchant(), None, &form())
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::Orphaned { .. }));
    }

    #[tokio::test]
    async fn test_create_denied_is_surfaced() {
        let writer = FakeWriter {
            fail_create: true,
            ..FakeWriter::default()
        };
        let err = StoreSetupService::new(&writer)
            .save(&merchant(), None, &form())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SetupError::Save(RepositoryError::PermissionDenied(_))
        ));
        assert_eq!(writer.calls(), ["create_store"]);
    }
}
