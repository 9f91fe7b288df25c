pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt_auth_middleware;
use crate::config::GatewayConfig;
use state::AppState;

/// Build the HTTP router. Everything except health and docs requires a bearer token.
pub fn router(state: Arc<AppState>) -> Router {
    let private_routes = Router::new()
        // Credits
        .route("/credits", get(handlers::get_credits))
        .route("/credits/history", get(handlers::get_credit_history))
        // Contacts
        .route(
            "/contacts",
            post(handlers::create_contact).get(handlers::list_contacts),
        )
        .route(
            "/contacts/{id}",
            get(handlers::get_contact).patch(handlers::update_contact),
        )
        // Paid actions
        .route("/contacts/{id}/enrich", post(handlers::enrich_contact))
        .route("/contacts/{id}/verify-email", post(handlers::verify_email))
        .route("/contacts/{id}/find-email", post(handlers::find_email))
        .route("/contacts/{id}/outreach", post(handlers::generate_outreach))
        // CRM sync
        .route("/crm/import", post(handlers::import_contacts))
        .route("/crm/export", post(handlers::export_contacts))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1", private_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {} (port in use?): {}", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
