//! CRM import/export

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::auth::AuthUser;
use crate::core_types::ContactId;
use crate::crm_sync::{ExportReport, ImportReport};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportRequest {
    #[schema(example = "inbound-leads")]
    pub source: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    #[schema(example = "hubspot")]
    pub destination: String,
    /// All owned contacts when omitted
    #[serde(default)]
    pub contact_ids: Option<Vec<ContactId>>,
}

#[utoipa::path(
    post,
    path = "/api/v1/crm/import",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Per-record import report", body = ImportReport),
        (status = 402, description = "Insufficient credits"),
        (status = 502, description = "CRM unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn import_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<ImportReport> {
    ok(state.crm.import(user.user_id, &req.source).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/crm/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Per-contact export report", body = ExportReport),
        (status = 402, description = "Insufficient credits"),
        (status = 404, description = "A listed contact is not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn export_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ExportRequest>,
) -> ApiResult<ExportReport> {
    ok(state
        .crm
        .export(user.user_id, &req.destination, req.contact_ids)
        .await?)
}
