//! Contact and company records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::{CompanyId, ContactId, UserId};

/// Company record, scoped to one owner.
///
/// `industry`, `location` and `size` are defaults a contact may inherit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Company {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Seed values for a company created by the reconciler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub domain: Option<String>,
}

/// Fully typed contact record.
///
/// When `company_id` is set, `company_name` equals that company's `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Contact {
    pub contact_id: ContactId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub company_id: Option<CompanyId>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub is_enriched: bool,
    pub email_verified: bool,
    pub enrichment_source: Option<String>,
    pub enrichment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Build an unsaved contact from a reconciled patch.
    ///
    /// `contact_id` is 0 until the store assigns one.
    pub fn from_patch(user_id: UserId, patch: ContactPatch) -> Self {
        let now = Utc::now();
        Self {
            contact_id: 0,
            user_id,
            first_name: patch.first_name.unwrap_or_default(),
            last_name: patch.last_name.unwrap_or_default(),
            title: patch.title,
            email: patch.email,
            phone: patch.phone,
            linkedin_url: patch.linkedin_url,
            company_id: patch.company_id,
            company_name: patch.company_name,
            industry: patch.industry,
            location: patch.location,
            is_enriched: false,
            email_verified: false,
            enrichment_source: None,
            enrichment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the fields a patch carries. Absent fields are left untouched.
    ///
    /// The company pair is replaced together so a stale id never survives a
    /// name change.
    pub fn apply_patch(&mut self, patch: ContactPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if patch.title.is_some() {
            self.title = patch.title;
        }
        if let Some(v) = patch.email {
            // A new address has not been verified yet.
            if self.email.as_deref() != Some(v.as_str()) {
                self.email_verified = false;
            }
            self.email = Some(v);
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.linkedin_url.is_some() {
            self.linkedin_url = patch.linkedin_url;
        }
        if patch.company_id.is_some() || patch.company_name.is_some() {
            self.company_id = patch.company_id;
            self.company_name = patch.company_name;
        }
        if patch.industry.is_some() {
            self.industry = patch.industry;
        }
        if patch.location.is_some() {
            self.location = patch.location;
        }
        self.updated_at = Utc::now();
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Contact write payload. Every field is optional; validation plus
/// reconciliation turns it into a [`Contact`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Validate, ToSchema)]
pub struct ContactPatch {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 64))]
    pub phone: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
    pub company_id: Option<CompanyId>,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    #[validate(length(max = 255))]
    pub industry: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    /// Only used to seed a newly created company
    #[validate(length(max = 64))]
    pub company_size: Option<String>,
    /// Never create a company from `company_name` for this write
    #[serde(default)]
    pub skip_company_creation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact::from_patch(
            1,
            ContactPatch {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                email: Some("ada@engines.io".into()),
                company_id: Some(9),
                company_name: Some("Engines".into()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_apply_patch_leaves_absent_fields() {
        let mut c = contact();
        c.apply_patch(ContactPatch {
            title: Some("CTO".into()),
            ..Default::default()
        });

        assert_eq!(c.title.as_deref(), Some("CTO"));
        assert_eq!(c.email.as_deref(), Some("ada@engines.io"));
        assert_eq!(c.company_id, Some(9));
    }

    #[test]
    fn test_company_pair_replaced_together() {
        let mut c = contact();
        c.apply_patch(ContactPatch {
            company_name: Some("Babbage & Co".into()),
            ..Default::default()
        });

        assert_eq!(c.company_id, None);
        assert_eq!(c.company_name.as_deref(), Some("Babbage & Co"));
    }

    #[test]
    fn test_new_email_resets_verification() {
        let mut c = contact();
        c.email_verified = true;
        c.apply_patch(ContactPatch {
            email: Some("ada@engines.io".into()),
            ..Default::default()
        });
        assert!(c.email_verified);

        c.apply_patch(ContactPatch {
            email: Some("countess@engines.io".into()),
            ..Default::default()
        });
        assert!(!c.email_verified);
    }

    #[test]
    fn test_patch_validation() {
        let ok = ContactPatch {
            first_name: Some("Ada".into()),
            email: Some("ada@engines.io".into()),
            linkedin_url: Some("https://linkedin.com/in/ada".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = ContactPatch {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
