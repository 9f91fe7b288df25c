//! HTTP handlers

pub mod contacts;
pub mod credits;
pub mod crm;
pub mod health;
pub mod paid;

pub use contacts::{create_contact, get_contact, list_contacts, update_contact};
pub use credits::{CreditsResponse, get_credit_history, get_credits};
pub use crm::{ExportRequest, ImportRequest, export_contacts, import_contacts};
pub use health::{HealthResponse, health_check};
pub use paid::{EnrichRequest, enrich_contact, find_email, generate_outreach, verify_email};
