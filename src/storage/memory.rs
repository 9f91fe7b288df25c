//! In-memory backend
//!
//! Implements every store trait over `DashMap`s. A user's balance and its
//! transaction log live in the same map entry, so the entry's shard lock
//! serializes `apply_delta` the way a row lock does in PostgreSQL. Secondary
//! name/email maps use `entry()` to emulate unique indexes.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::account::{User, UserStore};
use crate::contacts::{Company, CompanyName, CompanyStore, Contact, ContactStore, NewCompany};
use crate::core_types::{CompanyId, ContactId, Credits, UserId};
use crate::error::StoreError;
use crate::ledger::{CreditTransaction, DeltaOutcome, LedgerStore, TransactionType};

struct UserRow {
    user: User,
    transactions: Vec<CreditTransaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserRow>,
    user_emails: DashMap<String, UserId>,
    companies: DashMap<CompanyId, Company>,
    company_names: DashMap<(UserId, String), CompanyId>,
    contacts: DashMap<ContactId, Contact>,
    sequence: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, StoreError> {
        let user_id = match self.user_emails.entry(email.trim().to_lowercase()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict(format!("email {} already registered", email)));
            }
            Entry::Vacant(slot) => {
                let id = self.next_id();
                slot.insert(id);
                id
            }
        };

        let user = User {
            user_id,
            email: email.trim().to_string(),
            name: name.map(str::to_string),
            credits: 0,
            created_at: Utc::now(),
        };
        self.users.insert(
            user_id,
            UserRow {
                user: user.clone(),
                transactions: Vec::new(),
            },
        );
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&user_id).map(|row| row.value().user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(user_id) = self
            .user_emails
            .get(&email.trim().to_lowercase())
            .map(|id| *id)
        else {
            return Ok(None);
        };
        self.get_user(user_id).await
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn balance(&self, user_id: UserId) -> Result<Option<Credits>, StoreError> {
        Ok(self.users.get(&user_id).map(|row| row.user.credits))
    }

    async fn apply_delta(
        &self,
        user_id: UserId,
        delta: Credits,
        floor: Credits,
        description: &str,
    ) -> Result<DeltaOutcome, StoreError> {
        // Held for the whole check-and-write: this is the row lock.
        let mut row = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;

        let balance = row.user.credits;
        let next = balance
            .checked_add(delta)
            .ok_or_else(|| StoreError::Database("credit balance overflow".to_string()))?;
        if next < floor {
            return Ok(DeltaOutcome::Rejected { balance });
        }

        let tx = CreditTransaction {
            transaction_id: self.next_id(),
            user_id,
            amount: delta,
            tx_type: TransactionType::from_delta(delta),
            description: description.to_string(),
            balance_after: next,
            created_at: Utc::now(),
        };
        row.user.credits = next;
        row.transactions.push(tx.clone());

        Ok(DeltaOutcome::Applied(tx))
    }

    async fn history(&self, user_id: UserId) -> Result<Vec<CreditTransaction>, StoreError> {
        Ok(self
            .users
            .get(&user_id)
            .map(|row| row.transactions.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn get_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.companies.get(&company_id).map(|c| c.value().clone()))
    }

    async fn find_company_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<Company>, StoreError> {
        let Some(name) = CompanyName::parse(name) else {
            return Ok(None);
        };
        let Some(company_id) = self
            .company_names
            .get(&(user_id, name.key().to_string()))
            .map(|id| *id)
        else {
            return Ok(None);
        };
        self.get_company(company_id).await
    }

    async fn create_company(
        &self,
        user_id: UserId,
        company: &NewCompany,
    ) -> Result<Company, StoreError> {
        let name = CompanyName::parse(&company.name)
            .ok_or_else(|| StoreError::Database("company name must not be blank".to_string()))?;

        match self.company_names.entry((user_id, name.key().to_string())) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "company '{}' already exists for user {}",
                name, user_id
            ))),
            Entry::Vacant(slot) => {
                let record = Company {
                    company_id: self.next_id(),
                    user_id,
                    name: name.as_str().to_string(),
                    industry: company.industry.clone(),
                    location: company.location.clone(),
                    size: company.size.clone(),
                    domain: company.domain.clone(),
                    created_at: Utc::now(),
                };
                self.companies.insert(record.company_id, record.clone());
                slot.insert(record.company_id);
                Ok(record)
            }
        }
    }

    async fn list_companies(&self, user_id: UserId) -> Result<Vec<Company>, StoreError> {
        let mut companies: Vec<Company> = self
            .companies
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect();
        companies.sort_by_key(|c| c.company_id);
        Ok(companies)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn get_contact(&self, contact_id: ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.contacts.get(&contact_id).map(|c| c.value().clone()))
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<Contact, StoreError> {
        let now = Utc::now();
        let mut record = contact.clone();
        record.contact_id = self.next_id();
        record.created_at = now;
        record.updated_at = now;
        self.contacts.insert(record.contact_id, record.clone());
        Ok(record)
    }

    async fn update_contact(&self, contact: &Contact) -> Result<Contact, StoreError> {
        let mut slot = self
            .contacts
            .get_mut(&contact.contact_id)
            .ok_or_else(|| StoreError::NotFound(format!("contact {}", contact.contact_id)))?;
        let mut record = contact.clone();
        record.created_at = slot.created_at;
        record.updated_at = Utc::now();
        *slot = record.clone();
        Ok(record)
    }

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, StoreError> {
        let mut contacts: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect();
        contacts.sort_by_key(|c| c.contact_id);
        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user("a@b.io", None).await.unwrap();
        let err = store.create_user("A@B.io", None).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_company_name_unique_per_user() {
        let store = MemoryStore::new();
        let seed = NewCompany {
            name: "Acme".into(),
            ..Default::default()
        };
        store.create_company(1, &seed).await.unwrap();
        assert!(matches!(
            store
                .create_company(
                    1,
                    &NewCompany {
                        name: "ACME".into(),
                        ..Default::default()
                    }
                )
                .await,
            Err(StoreError::Conflict(_))
        ));
        // Another tenant may reuse the name.
        assert!(store.create_company(2, &seed).await.is_ok());
    }

    #[tokio::test]
    async fn test_apply_delta_floor() {
        let store = MemoryStore::new();
        let uid = store.create_user("a@b.io", None).await.unwrap().user_id;
        store.apply_delta(uid, 3, Credits::MIN, "seed").await.unwrap();

        let rejected = store.apply_delta(uid, -4, 0, "too much").await.unwrap();
        assert_eq!(rejected, DeltaOutcome::Rejected { balance: 3 });
        assert_eq!(store.history(uid).await.unwrap().len(), 1);

        let applied = store.apply_delta(uid, -3, 0, "exact").await.unwrap();
        assert!(matches!(applied, DeltaOutcome::Applied(ref tx) if tx.balance_after == 0));
    }

    #[tokio::test]
    async fn test_apply_delta_unknown_user() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.apply_delta(42, 1, 0, "x").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
