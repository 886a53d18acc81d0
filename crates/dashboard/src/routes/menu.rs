//! Menu item and category handlers.
//!
//! Reads are open to any dashboard session; writes need the manage-menu
//! capability. Every query is scoped to the session's store.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopspot_core::{Capability, MenuItemId, StoreId};

use crate::db::MenuRepository;
use crate::error::{AppError, FieldErrors};
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::models::{Category, MenuItem, MenuItemDraft};
use crate::services::FileStorage;
use crate::services::menu::{MenuItemForm, MenuQuery, Selection, duplicate};
use crate::services::storage::menu_image_path;
use crate::state::AppState;

use super::read_upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menu-items", get(list).post(create))
        .route("/api/menu-items/{id}", put(update).delete(remove))
        .route("/api/menu-items/{id}/availability", post(set_availability))
        .route("/api/menu-items/bulk-delete", post(bulk_delete))
        .route("/api/menu-items/bulk-duplicate", post(bulk_duplicate))
        .route("/api/menu-items/images", post(upload_image))
        .route("/api/categories", get(list_categories).post(create_category))
}

#[derive(Debug, Serialize)]
pub struct MenuList {
    pub items: Vec<MenuItem>,
    pub total: usize,
}

#[instrument(skip_all)]
async fn list(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Query(query): Query<MenuQuery>,
) -> Result<Json<MenuList>, AppError> {
    let store_id = guard.store_id()?;
    let items = MenuRepository::new(state.pool()).list_items(store_id).await?;
    let visible: Vec<MenuItem> = query.apply(&items).into_iter().cloned().collect();

    Ok(Json(MenuList {
        total: items.len(),
        items: visible,
    }))
}

/// Validate the form, including that its category belongs to the store.
async fn checked_draft(
    repo: &MenuRepository<'_>,
    store_id: StoreId,
    form: &MenuItemForm,
) -> Result<MenuItemDraft, AppError> {
    let draft = form.validate()?;
    if let Some(category_id) = draft.category_id
        && !repo.category_exists(store_id, category_id).await?
    {
        let mut errors = FieldErrors::new();
        errors.add("category_id", "Unknown category");
        return Err(errors.into());
    }
    Ok(draft)
}

#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(form): Json<MenuItemForm>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;
    let repo = MenuRepository::new(state.pool());

    let draft = checked_draft(&repo, store_id, &form).await?;
    let item = repo.create_item(store_id, &draft).await?;
    tracing::info!(item_id = %item.id, "Menu item created");

    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip_all, fields(item_id = %id))]
async fn update(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Path(id): Path<MenuItemId>,
    Json(form): Json<MenuItemForm>,
) -> Result<Json<MenuItem>, AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;
    let repo = MenuRepository::new(state.pool());

    let draft = checked_draft(&repo, store_id, &form).await?;
    Ok(Json(repo.update_item(store_id, id, &draft).await?))
}

#[instrument(skip_all, fields(item_id = %id))]
async fn remove(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Path(id): Path<MenuItemId>,
) -> Result<StatusCode, AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;

    let deleted = MenuRepository::new(state.pool())
        .delete_items(store_id, &[id])
        .await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Menu item {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

async fn set_availability(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Path(id): Path<MenuItemId>,
    Json(body): Json<AvailabilityRequest>,
) -> Result<Json<MenuItem>, AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;

    let item = MenuRepository::new(state.pool())
        .set_availability(store_id, id, body.is_available)
        .await?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<MenuItemId>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleted {
    pub deleted: u64,
}

#[instrument(skip_all)]
async fn bulk_delete(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(body): Json<BulkRequest>,
) -> Result<Json<BulkDeleted>, AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;
    let selection: Selection = body.ids.into_iter().collect();
    if selection.ids().is_empty() {
        return Err(AppError::BadRequest("No menu items selected".to_string()));
    }

    let deleted = MenuRepository::new(state.pool())
        .delete_items(store_id, &selection.ids())
        .await?;
    tracing::info!(deleted, "Menu items deleted");
    Ok(Json(BulkDeleted { deleted }))
}

#[instrument(skip_all)]
async fn bulk_duplicate(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(body): Json<BulkRequest>,
) -> Result<(StatusCode, Json<Vec<MenuItem>>), AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;
    let selection: Selection = body.ids.into_iter().collect();
    let repo = MenuRepository::new(state.pool());

    let mut copies = Vec::new();
    for id in selection.ids() {
        let original = repo
            .get_item(store_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu item {id} not found")))?;
        copies.push(repo.create_item(store_id, &duplicate(&original)).await?);
    }
    tracing::info!(count = copies.len(), "Menu items duplicated");

    Ok((StatusCode::CREATED, Json(copies)))
}

#[derive(Debug, Serialize)]
pub struct ImageUploaded {
    pub image_url: String,
}

async fn upload_image(
    State(state): State<AppState>,
    guard: RequireDashboard,
    multipart: Multipart,
) -> Result<Json<ImageUploaded>, AppError> {
    guard.require(Capability::ManageMenu)?;

    let upload = read_upload(multipart, "image").await?;
    let path = menu_image_path(Utc::now().timestamp_millis(), &upload.file_name);
    let image_url = state
        .storage()
        .put(&path, upload.bytes, &upload.content_type)
        .await?;

    Ok(Json(ImageUploaded { image_url }))
}

async fn list_categories(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<Vec<Category>>, AppError> {
    let store_id = guard.store_id()?;
    Ok(Json(
        MenuRepository::new(state.pool())
            .list_categories(store_id)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

async fn create_category(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    guard.require(Capability::ManageMenu)?;
    let store_id = guard.store_id()?;

    let name = body.name.trim();
    if name.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("name", "This field is required");
        return Err(errors.into());
    }

    let category = MenuRepository::new(state.pool())
        .create_category(store_id, name)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}
