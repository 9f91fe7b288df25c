use std::sync::Arc;
use std::time::Duration;

use crate::account::UserStore;
use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::contacts::{ContactCompanyReconciler, ContactService};
use crate::crm_sync::{CrmSyncGateway, CrmSyncService};
use crate::db::Database;
use crate::enrichment::{EnrichmentOrchestrator, EnrichmentProvider};
use crate::ledger::Ledger;
use crate::outreach::{MessageWriter, OutreachService};
use crate::storage::Stores;
use crate::verification::{PollBudget, RefundPolicy, VerificationProvider, VerificationService};

/// External collaborators injected at startup
pub struct Providers {
    pub enrichment: Arc<dyn EnrichmentProvider>,
    pub verification: Arc<dyn VerificationProvider>,
    pub crm: Arc<dyn CrmSyncGateway>,
    pub writer: Arc<dyn MessageWriter>,
}

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub ledger: Ledger,
    pub contacts: ContactService,
    pub enrichment: EnrichmentOrchestrator,
    pub verification: VerificationService,
    pub crm: CrmSyncService,
    pub outreach: OutreachService,
    pub tokens: TokenService,
    /// Default refund rules per verification flow
    pub verify_refund: RefundPolicy,
    pub find_refund: RefundPolicy,
    /// PostgreSQL pool, `None` for in-memory runs
    pub pg_db: Option<Database>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        stores: Stores,
        providers: Providers,
        pg_db: Option<Database>,
    ) -> Self {
        let ledger = Ledger::new(stores.ledger.clone());
        let contacts = ContactService::new(
            stores.contacts.clone(),
            ContactCompanyReconciler::new(stores.companies.clone()),
        );
        let costs = config.credits.clone();
        let vcfg = &config.verification;

        Self {
            users: stores.users,
            enrichment: EnrichmentOrchestrator::new(
                ledger.clone(),
                contacts.clone(),
                providers.enrichment,
                costs.clone(),
                Duration::from_millis(config.enrichment.provider_timeout_ms),
            ),
            verification: VerificationService::new(
                ledger.clone(),
                contacts.clone(),
                providers.verification,
                costs.email_verify,
                costs.email_find,
                PollBudget {
                    max_attempts: vcfg.max_attempts,
                    interval: Duration::from_millis(vcfg.poll_interval_ms),
                },
            ),
            crm: CrmSyncService::new(
                ledger.clone(),
                contacts.clone(),
                providers.crm,
                costs.crm_import_per_record,
                costs.crm_export_per_record,
            ),
            outreach: OutreachService::new(
                ledger.clone(),
                contacts.clone(),
                providers.writer,
                costs.ai_message,
                Duration::from_millis(config.outreach.writer_timeout_ms),
            ),
            tokens: TokenService::new(config.auth.jwt_secret.clone(), config.auth.token_ttl_hours),
            verify_refund: vcfg.verify_refund.clone(),
            find_refund: vcfg.find_refund.clone(),
            ledger,
            contacts,
            pg_db,
        }
    }
}
