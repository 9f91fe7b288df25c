//! Credit-consuming contact actions

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::auth::AuthUser;
use crate::core_types::ContactId;
use crate::enrichment::{EnrichmentField, EnrichmentReceipt};
use crate::outreach::{OutreachBrief, OutreachMessage};
use crate::verification::VerificationReceipt;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrichRequest {
    #[schema(example = json!(["email", "phone"]))]
    pub fields: Vec<EnrichmentField>,
}

#[utoipa::path(
    post,
    path = "/api/v1/contacts/{id}/enrich",
    params(("id" = i64, Path, description = "Contact ID")),
    request_body = EnrichRequest,
    responses(
        (status = 200, description = "Contact enriched", body = EnrichmentReceipt),
        (status = 402, description = "Insufficient credits"),
        (status = 404, description = "Not found or not owned"),
        (status = 422, description = "Nothing found, credits refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrichment"
)]
pub async fn enrich_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
    Json(req): Json<EnrichRequest>,
) -> ApiResult<EnrichmentReceipt> {
    let fields: BTreeSet<EnrichmentField> = req.fields.into_iter().collect();
    ok(state.enrichment.enrich(user.user_id, id, fields).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/contacts/{id}/verify-email",
    params(("id" = i64, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Verification finished", body = VerificationReceipt),
        (status = 402, description = "Insufficient credits"),
        (status = 502, description = "Vendor refused the job, credits refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Verification"
)]
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
) -> ApiResult<VerificationReceipt> {
    // Refund rules are operator configuration, never caller input.
    ok(state
        .verification
        .verify_email(user.user_id, id, &state.verify_refund)
        .await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/contacts/{id}/find-email",
    params(("id" = i64, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Search finished", body = VerificationReceipt),
        (status = 402, description = "Insufficient credits"),
        (status = 502, description = "Vendor refused the job, credits refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Verification"
)]
pub async fn find_email(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
) -> ApiResult<VerificationReceipt> {
    ok(state
        .verification
        .find_email(user.user_id, id, &state.find_refund)
        .await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/contacts/{id}/outreach",
    params(("id" = i64, Path, description = "Contact ID")),
    request_body = OutreachBrief,
    responses(
        (status = 200, description = "Message drafted", body = OutreachMessage),
        (status = 402, description = "Insufficient credits"),
        (status = 502, description = "Writer failed, credits refunded")
    ),
    security(("bearer_auth" = [])),
    tag = "Outreach"
)]
pub async fn generate_outreach(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ContactId>,
    Json(brief): Json<OutreachBrief>,
) -> ApiResult<OutreachMessage> {
    ok(state.outreach.generate(user.user_id, id, brief).await?)
}
