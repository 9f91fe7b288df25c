//! Credit-metered CRM enrichment engine
//!
//! Every paid operation debits the [`ledger`] first and refunds when the
//! external call produced nothing usable. Contact writes always pass through
//! the company reconciler in [`contacts`].
//!
//! # Modules
//!
//! - [`ledger`] - append-only credit log with a materialized balance
//! - [`contacts`] - contacts, companies and company reconciliation
//! - [`enrichment`] - paid field enrichment
//! - [`verification`] - email verification/finding with bounded polling
//! - [`crm_sync`] - metered CRM import/export
//! - [`outreach`] - paid message drafting
//! - [`storage`] - in-memory and PostgreSQL backends
//! - [`gateway`] - axum HTTP API

pub mod core_types;

pub mod account;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod crm_sync;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod outreach;
pub mod storage;
pub mod verification;

pub use core_types::{CompanyId, ContactId, Credits, TransactionId, UserId};
pub use ledger::{Debit, Ledger};
