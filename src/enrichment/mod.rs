//! Contact enrichment
//!
//! [`EnrichmentOrchestrator`] prices a request from the configured cost
//! table, debits up front and refunds in full when the provider comes back
//! empty, fails, or the result cannot be stored.

pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod synthetic;
pub mod types;

pub use error::EnrichmentError;
pub use orchestrator::EnrichmentOrchestrator;
pub use provider::EnrichmentProvider;
pub use synthetic::SyntheticEnrichmentProvider;
pub use types::{ContactProfile, EnrichmentField, EnrichmentReceipt, EnrichmentRequest};
