//! Data models for user accounts

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core_types::{Credits, UserId};

/// User account (tenant)
///
/// `credits` is a materialized balance owned by the ledger. It is read here
/// for display only; every mutation goes through [`crate::ledger::Ledger`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub credits: Credits,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_credits() {
        let user = User {
            user_id: 7,
            email: "ops@acme.io".to_string(),
            name: None,
            credits: 12,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["credits"], 12);
        assert_eq!(json["email"], "ops@acme.io");
    }
}
