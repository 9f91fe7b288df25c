//! CRM synchronization
//!
//! [`CrmSyncGateway`] is the seam to an external CRM; [`CrmSyncService`]
//! meters import/export per record.

pub mod error;
pub mod gateway;
pub mod service;

pub use error::CrmSyncError;
pub use gateway::{CrmSyncGateway, ExportItemResult, InMemoryCrmGateway};
pub use service::{CrmSyncService, ExportReport, ImportItemResult, ImportReport};
