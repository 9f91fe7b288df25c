//! Enrichment request/response types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use utoipa::ToSchema;

use crate::config::CreditCosts;
use crate::contacts::{Contact, ContactPatch};
use crate::core_types::{ContactId, Credits};

/// Fields a paid enrichment can fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentField {
    Email,
    Phone,
    /// LinkedIn profile URL
    Social,
    /// Company name (resolved to a company record on write)
    Company,
}

impl EnrichmentField {
    pub const ALL: [EnrichmentField; 4] = [
        EnrichmentField::Email,
        EnrichmentField::Phone,
        EnrichmentField::Social,
        EnrichmentField::Company,
    ];

    /// Price of this field from the configured cost table
    pub fn cost(&self, costs: &CreditCosts) -> Credits {
        match self {
            EnrichmentField::Email => costs.email,
            EnrichmentField::Phone => costs.phone,
            EnrichmentField::Social => costs.social,
            EnrichmentField::Company => costs.company,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentField::Email => "email",
            EnrichmentField::Phone => "phone",
            EnrichmentField::Social => "social",
            EnrichmentField::Company => "company",
        }
    }
}

impl fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One enrichment invocation. Never persisted.
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    pub contact_id: ContactId,
    pub requested_fields: BTreeSet<EnrichmentField>,
}

impl EnrichmentRequest {
    /// Cost derives from the request, not from what the provider finds.
    pub fn cost(&self, costs: &CreditCosts) -> Credits {
        self.requested_fields.iter().map(|f| f.cost(costs)).sum()
    }
}

/// What the provider gets to see about a contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactProfile {
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    /// Fields already on the record, keyed by enrichment field
    pub known: BTreeMap<EnrichmentField, String>,
}

impl ContactProfile {
    pub fn from_contact(contact: &Contact) -> Self {
        let mut known = BTreeMap::new();
        if let Some(v) = &contact.email {
            known.insert(EnrichmentField::Email, v.clone());
        }
        if let Some(v) = &contact.phone {
            known.insert(EnrichmentField::Phone, v.clone());
        }
        if let Some(v) = &contact.linkedin_url {
            known.insert(EnrichmentField::Social, v.clone());
        }
        if let Some(v) = &contact.company_name {
            known.insert(EnrichmentField::Company, v.clone());
        }
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            company_name: contact.company_name.clone(),
            known,
        }
    }
}

/// Provider output: a subset of the requested fields
pub type FoundFields = BTreeMap<EnrichmentField, String>;

/// Turn provider output into a contact patch, keeping only requested, non-blank values.
pub fn found_to_patch(found: &FoundFields, requested: &BTreeSet<EnrichmentField>) -> ContactPatch {
    let mut patch = ContactPatch::default();
    for (field, value) in found {
        let value = value.trim();
        if value.is_empty() || !requested.contains(field) {
            continue;
        }
        let value = Some(value.to_string());
        match field {
            EnrichmentField::Email => patch.email = value,
            EnrichmentField::Phone => patch.phone = value,
            EnrichmentField::Social => patch.linkedin_url = value,
            EnrichmentField::Company => patch.company_name = value,
        }
    }
    patch
}

/// Successful enrichment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichmentReceipt {
    pub contact: Contact,
    /// Fields actually applied
    pub enriched_fields: Vec<EnrichmentField>,
    pub credits_used: Credits,
    pub credits_remaining: Credits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_sums_requested_fields() {
        let costs = CreditCosts::default();
        let req = EnrichmentRequest {
            contact_id: 1,
            requested_fields: [EnrichmentField::Email, EnrichmentField::Phone]
                .into_iter()
                .collect(),
        };
        assert_eq!(req.cost(&costs), 5);

        let all = EnrichmentRequest {
            contact_id: 1,
            requested_fields: EnrichmentField::ALL.into_iter().collect(),
        };
        assert_eq!(all.cost(&costs), 10);
    }

    #[test]
    fn test_found_to_patch_filters_unrequested_and_blank() {
        let requested: BTreeSet<_> = [EnrichmentField::Email, EnrichmentField::Phone]
            .into_iter()
            .collect();
        let mut found = FoundFields::new();
        found.insert(EnrichmentField::Email, " a@b.io ".into());
        found.insert(EnrichmentField::Phone, "  ".into());
        found.insert(EnrichmentField::Social, "https://linkedin.com/in/x".into());

        let patch = found_to_patch(&found, &requested);

        assert_eq!(patch.email.as_deref(), Some("a@b.io"));
        assert_eq!(patch.phone, None);
        assert_eq!(patch.linkedin_url, None);
    }

    #[test]
    fn test_field_serde_names() {
        let f: EnrichmentField = serde_json::from_str("\"social\"").unwrap();
        assert_eq!(f, EnrichmentField::Social);
        assert_eq!(EnrichmentField::Company.to_string(), "company");
    }
}
