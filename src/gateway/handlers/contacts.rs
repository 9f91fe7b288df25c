//! Contact CRUD

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::auth::AuthUser;
use crate::contacts::{Contact, ContactPatch};
use crate::core_types::ContactId;

#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = ContactPatch,
    responses(
        (status = 200, description = "Contact created", body = Contact),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Contacts"
)]
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ContactPatch>,
) -> ApiResult<Contact> {
    ok(state.contacts.create(user.user_id, patch).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    responses(
        (status = 200, description = "Owned contacts", body = Vec<Contact>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Contacts"
)]
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Contact>> {
    ok(state.contacts.list(user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    params(("id" = i64, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact", body = Contact),
        (status = 404, description = "Not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Contacts"
)]
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
) -> ApiResult<Contact> {
    ok(state.contacts.get(user.user_id, id).await?)
}

#[utoipa::path(
    patch,
    path = "/api/v1/contacts/{id}",
    params(("id" = i64, Path, description = "Contact ID")),
    request_body = ContactPatch,
    responses(
        (status = 200, description = "Contact updated", body = Contact),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Contacts"
)]
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
    Json(patch): Json<ContactPatch>,
) -> ApiResult<Contact> {
    ok(state.contacts.update(user.user_id, id, patch).await?)
}
