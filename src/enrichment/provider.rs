//! External data-source seam

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::types::{ContactProfile, EnrichmentField, FoundFields};
use crate::error::ProviderError;

/// Produces best-effort values for requested fields.
///
/// Returning a subset (or nothing) is normal. Errors are reserved for
/// transport-level failure.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Recorded as `enrichment_source` on the contact
    fn name(&self) -> &'static str;

    async fn lookup(
        &self,
        profile: &ContactProfile,
        requested: &BTreeSet<EnrichmentField>,
    ) -> Result<FoundFields, ProviderError>;
}


#[cfg(test)]
pub use mock::MockProvider;
