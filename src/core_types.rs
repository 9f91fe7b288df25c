//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They map 1:1 to the BIGINT primary keys of the PostgreSQL schema.

/// User ID - tenant identity, immutable after assignment.
///
/// # Usage:
/// - Owner key for contacts, companies and the credit ledger
/// - Every mutation is checked against the requesting user's id
pub type UserId = i64;

/// Contact ID - unique within the system
pub type ContactId = i64;

/// Company ID - unique within the system, scoped to one owner
pub type CompanyId = i64;

/// Credit transaction ID - append-only ledger row id
pub type TransactionId = i64;

/// Credit amount. Signed so that debits can be recorded as negative deltas.
pub type Credits = i64;
