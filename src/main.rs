//! CRM enrichment gateway
//!
//! ```text
//! crm_enrichment [--env dev] [--port 8080] [--issue-token EMAIL [--grant N]]
//! ```
//!
//! Uses PostgreSQL when `postgres_url` is configured, otherwise (mock-api
//! builds only) in-memory stores and synthetic providers.

use anyhow::Context;
use std::sync::Arc;

use crm_enrichment::config::AppConfig;
use crm_enrichment::crm_sync::InMemoryCrmGateway;
use crm_enrichment::db::Database;
use crm_enrichment::enrichment::SyntheticEnrichmentProvider;
use crm_enrichment::gateway::{self, state::AppState, state::Providers};
use crm_enrichment::outreach::TemplateWriter;
use crm_enrichment::storage::Stores;
use crm_enrichment::verification::{IcypeasClient, VerificationProvider};

fn arg_value(flag: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn get_env() -> String {
    arg_value("--env")
        .or_else(|| arg_value("-e"))
        .unwrap_or_else(|| "dev".to_string())
}

fn get_port_override() -> Option<u16> {
    arg_value("--port").and_then(|p| p.parse().ok())
}

async fn open_stores(config: &AppConfig) -> anyhow::Result<(Stores, Option<Database>)> {
    match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.migrate().await.context("Failed to apply schema")?;
            Ok((Stores::postgres(&db), Some(db)))
        }
        #[cfg(feature = "mock-api")]
        None => {
            tracing::warn!("No postgres_url configured, using in-memory stores");
            Ok((Stores::memory(), None))
        }
        #[cfg(not(feature = "mock-api"))]
        None => anyhow::bail!("postgres_url is required"),
    }
}

fn verification_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn VerificationProvider>> {
    if config.verification.api_key.is_empty() {
        return fallback_verification_provider();
    }
    Ok(Arc::new(IcypeasClient::new(&config.verification)?))
}

#[cfg(feature = "mock-api")]
fn fallback_verification_provider() -> anyhow::Result<Arc<dyn VerificationProvider>> {
    tracing::warn!("No verification api_key configured, using synthetic provider");
    Ok(Arc::new(
        crm_enrichment::verification::SyntheticVerificationProvider::new(),
    ))
}

#[cfg(not(feature = "mock-api"))]
fn fallback_verification_provider() -> anyhow::Result<Arc<dyn VerificationProvider>> {
    anyhow::bail!("verification.api_key is required")
}

/// Find or create the user, optionally grant credits, and print a bearer token.
async fn issue_token(state: &AppState, email: &str, grant: Option<i64>) -> anyhow::Result<()> {
    let user = match state.users.get_user_by_email(email).await? {
        Some(user) => user,
        None => state.users.create_user(email, None).await?,
    };
    if let Some(amount) = grant.filter(|a| *a > 0) {
        state.ledger.credit(user.user_id, amount, "grant").await?;
    }
    let token = state.tokens.issue(user.user_id)?;
    let balance = state.ledger.balance(user.user_id).await?;
    tracing::info!(user_id = user.user_id, balance, "Issued token for {}", email);
    println!("{}", token);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    let _log_guard = crm_enrichment::logging::init_logging(&app_config);

    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    tracing::info!(
        build = env!("GIT_HASH"),
        "Starting CRM enrichment gateway in {} mode",
        env
    );

    let (stores, pg_db) = open_stores(&app_config).await?;
    let providers = Providers {
        enrichment: Arc::new(SyntheticEnrichmentProvider),
        verification: verification_provider(&app_config)?,
        crm: Arc::new(InMemoryCrmGateway::new()),
        writer: Arc::new(TemplateWriter),
    };
    let state = Arc::new(AppState::new(&app_config, stores, providers, pg_db));

    if let Some(email) = arg_value("--issue-token") {
        let grant = arg_value("--grant").and_then(|g| g.parse().ok());
        issue_token(&state, &email, grant).await?;
    }

    gateway::run_server(&app_config.gateway, state).await
}
