//! Contact ↔ Company reconciliation
//!
//! Runs on every contact write. Resolves the payload's company reference
//! (by id, else by free-text name) to one canonical company row owned by the
//! same user, creating it when needed, and back-fills inherited fields.
//!
//! # Invariants
//!
//! - A contact never references another user's company; such ids are dropped
//! - After reconcile, `company_id = Some(id)` implies `company_name` is that
//!   company's exact `name`
//! - Company creation is best effort: a failure leaves the contact unlinked
//!   instead of failing the contact write

use std::sync::Arc;
use tracing::{debug, warn};

use super::error::ContactError;
use super::models::{Company, Contact, ContactPatch, NewCompany};
use super::store::CompanyStore;
use super::validation::CompanyName;
use crate::core_types::{CompanyId, UserId};
use crate::error::StoreError;

#[derive(Clone)]
pub struct ContactCompanyReconciler {
    companies: Arc<dyn CompanyStore>,
}

impl ContactCompanyReconciler {
    pub fn new(companies: Arc<dyn CompanyStore>) -> Self {
        Self { companies }
    }

    /// Resolve the company pair of `patch` for `user_id`.
    ///
    /// `existing` is the stored contact on update, `None` on create.
    pub async fn reconcile(
        &self,
        user_id: UserId,
        mut patch: ContactPatch,
        existing: Option<&Contact>,
    ) -> Result<ContactPatch, ContactError> {
        if patch
            .company_name
            .as_deref()
            .is_some_and(|n| CompanyName::parse(n).is_none())
        {
            patch.company_name = None;
        }

        let mut resolved = match patch.company_id {
            Some(company_id) => self.owned_company(user_id, company_id).await?,
            None => None,
        };
        if resolved.is_none() {
            patch.company_id = None;
        }

        if resolved.is_none()
            && let Some(name) = patch.company_name.as_deref().and_then(CompanyName::parse)
        {
            let unchanged = existing
                .and_then(|e| e.company_name.as_deref())
                .is_some_and(|current| CompanyName::same(current, name.as_str()));

            if unchanged {
                // Same name as stored: keep the current link, if it is still valid.
                if let Some(company_id) = existing.and_then(|e| e.company_id) {
                    resolved = self.owned_company(user_id, company_id).await?;
                }
            } else if !patch.skip_company_creation {
                resolved = self
                    .find_or_create(user_id, &name, &patch, existing)
                    .await;
            }
        }

        if let Some(company) = resolved {
            patch.company_id = Some(company.company_id);
            patch.company_name = Some(company.name.clone());
            if patch.industry.is_none() && existing.is_none_or(|e| e.industry.is_none()) {
                patch.industry = company.industry.clone();
            }
            if patch.location.is_none() && existing.is_none_or(|e| e.location.is_none()) {
                patch.location = company.location.clone();
            }
        }

        Ok(patch)
    }

    /// Fetch a company only if `user_id` owns it
    async fn owned_company(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> Result<Option<Company>, ContactError> {
        match self.companies.get_company(company_id).await? {
            Some(company) if company.user_id == user_id => Ok(Some(company)),
            Some(company) => {
                warn!(
                    user_id,
                    company_id,
                    owner = company.user_id,
                    "Dropping cross-tenant company reference"
                );
                Ok(None)
            }
            None => {
                debug!(user_id, company_id, "Dropping reference to missing company");
                Ok(None)
            }
        }
    }

    /// Step 2: look up by name, create on miss. Never fails the contact write.
    async fn find_or_create(
        &self,
        user_id: UserId,
        name: &CompanyName,
        patch: &ContactPatch,
        existing: Option<&Contact>,
    ) -> Option<Company> {
        match self.companies.find_company_by_name(user_id, name.as_str()).await {
            Ok(Some(company)) => {
                debug!(user_id, company_id = company.company_id, "Matched existing company");
                return Some(company);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(user_id, company = %name, error = %e, "Company lookup failed, saving contact unlinked");
                return None;
            }
        }

        let seed = NewCompany {
            name: name.as_str().to_string(),
            industry: patch
                .industry
                .clone()
                .or_else(|| existing.and_then(|e| e.industry.clone())),
            location: patch
                .location
                .clone()
                .or_else(|| existing.and_then(|e| e.location.clone())),
            size: patch.company_size.clone(),
            domain: None,
        };

        match self.companies.create_company(user_id, &seed).await {
            Ok(company) => {
                debug!(user_id, company_id = company.company_id, "Created company {}", company.name);
                Some(company)
            }
            Err(StoreError::Conflict(_)) => {
                // Lost a race against a concurrent write of the same name.
                match self.companies.find_company_by_name(user_id, name.as_str()).await {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(user_id, company = %name, error = %e, "Company re-lookup failed, saving contact unlinked");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(user_id, company = %name, error = %e, "Company creation failed, saving contact unlinked");
                None
            }
        }
    }
}
