//! Credit balance and history

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::auth::AuthUser;
use crate::core_types::{Credits, UserId};
use crate::ledger::CreditTransaction;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreditsResponse {
    pub user_id: UserId,
    #[schema(example = 42)]
    pub credits: Credits,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Max rows, most recent first (default 100)
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/v1/credits",
    responses(
        (status = 200, description = "Current balance", body = CreditsResponse),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Credits"
)]
pub async fn get_credits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<CreditsResponse> {
    let credits = state.ledger.balance(user.user_id).await?;
    ok(CreditsResponse {
        user_id: user.user_id,
        credits,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/credits/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Ledger rows, most recent first", body = Vec<CreditTransaction>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Credits"
)]
pub async fn get_credit_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<CreditTransaction>> {
    let mut history = state.ledger.history(user.user_id).await?;
    history.truncate(query.limit.unwrap_or(100));
    ok(history)
}
