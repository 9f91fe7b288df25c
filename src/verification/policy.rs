//! Refund decisions for verification outcomes

use serde::{Deserialize, Serialize};

use crate::core_types::Credits;

/// How much of a charge to give back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Refund {
    Full,
    /// Keep `retain` credits, refund the rest
    Partial { retain: Credits },
    None,
}

impl Refund {
    /// Credits to return out of `charged`
    pub fn amount(&self, charged: Credits) -> Credits {
        match self {
            Refund::Full => charged,
            Refund::Partial { retain } => charged.saturating_sub(*retain).clamp(0, charged),
            Refund::None => 0,
        }
    }
}

/// Per-outcome refund rules. Callers always pass one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPolicy {
    /// Vendor answered "not found" / "invalid"
    pub on_negative: Refund,
    /// Permanent vendor error or unknown status
    pub on_error: Refund,
    /// Poll budget spent without a terminal status
    pub on_exhausted: Refund,
}

impl RefundPolicy {
    pub fn full() -> Self {
        Self {
            on_negative: Refund::Full,
            on_error: Refund::Full,
            on_exhausted: Refund::Full,
        }
    }
}
