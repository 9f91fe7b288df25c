//! Contacts and companies
//!
//! - [`models`] - typed records and the all-optional [`ContactPatch`]
//! - [`reconciler`] - company resolution/de-duplication on every write
//! - [`service`] - the single reconciled write path
//! - [`store`] - storage seams implemented in [`crate::storage`]

pub mod error;
pub mod models;
pub mod reconciler;
pub mod service;
pub mod store;
pub mod validation;

pub use error::ContactError;
pub use models::{Company, Contact, ContactPatch, NewCompany};
pub use reconciler::ContactCompanyReconciler;
pub use service::ContactService;
pub use store::{CompanyStore, ContactStore};
pub use validation::CompanyName;
