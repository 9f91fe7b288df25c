//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::contacts::{Company, Contact, ContactPatch};
use crate::crm_sync::{ExportItemResult, ExportReport, ImportItemResult, ImportReport};
use crate::enrichment::{EnrichmentField, EnrichmentReceipt};
use crate::gateway::handlers::{
    CreditsResponse, EnrichRequest, ExportRequest, HealthResponse, ImportRequest,
};
use crate::ledger::{CreditTransaction, TransactionType};
use crate::outreach::{OutreachBrief, OutreachMessage};
use crate::verification::VerificationReceipt;

/// HS256 bearer token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let mut scheme = Http::new(HttpAuthScheme::Bearer);
            scheme.bearer_format = Some("JWT".to_string());
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM Enrichment API",
        version = "0.1.0",
        description = "Credit-metered contact enrichment, email verification and CRM sync.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::credits::get_credits,
        crate::gateway::handlers::credits::get_credit_history,
        crate::gateway::handlers::contacts::create_contact,
        crate::gateway::handlers::contacts::list_contacts,
        crate::gateway::handlers::contacts::get_contact,
        crate::gateway::handlers::contacts::update_contact,
        crate::gateway::handlers::paid::enrich_contact,
        crate::gateway::handlers::paid::verify_email,
        crate::gateway::handlers::paid::find_email,
        crate::gateway::handlers::paid::generate_outreach,
        crate::gateway::handlers::crm::import_contacts,
        crate::gateway::handlers::crm::export_contacts,
    ),
    components(
        schemas(
            HealthResponse,
            CreditsResponse,
            CreditTransaction,
            TransactionType,
            Contact,
            ContactPatch,
            Company,
            EnrichRequest,
            EnrichmentField,
            EnrichmentReceipt,
            VerificationReceipt,
            OutreachBrief,
            OutreachMessage,
            ImportRequest,
            ImportReport,
            ImportItemResult,
            ExportRequest,
            ExportReport,
            ExportItemResult,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health"),
        (name = "Credits", description = "Balance and ledger history"),
        (name = "Contacts", description = "Contact records (company-reconciled)"),
        (name = "Enrichment", description = "Paid field enrichment"),
        (name = "Verification", description = "Paid email verification and finding"),
        (name = "Outreach", description = "Paid message drafting"),
        (name = "CRM", description = "Metered CRM import/export"),
    )
)]
pub struct ApiDoc;
