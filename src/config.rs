use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::verification::{Refund, RefundPolicy};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. In-memory stores are used when absent.
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub credits: CreditCosts,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub outreach: OutreachConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl_hours: 24,
        }
    }
}

/// Per-operation credit prices.
///
/// Enrichment is priced per requested field; CRM sync per record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CreditCosts {
    pub email: i64,
    pub phone: i64,
    pub social: i64,
    pub company: i64,
    pub email_verify: i64,
    pub email_find: i64,
    pub crm_import_per_record: i64,
    pub crm_export_per_record: i64,
    pub ai_message: i64,
}

impl CreditCosts {
    /// Every paid operation must cost at least one credit: the ledger refuses
    /// zero and negative debits.
    pub fn validate(&self) -> Result<(), String> {
        let prices = [
            ("email", self.email),
            ("phone", self.phone),
            ("social", self.social),
            ("company", self.company),
            ("email_verify", self.email_verify),
            ("email_find", self.email_find),
            ("crm_import_per_record", self.crm_import_per_record),
            ("crm_export_per_record", self.crm_export_per_record),
            ("ai_message", self.ai_message),
        ];
        match prices.iter().find(|(_, cost)| *cost < 1) {
            Some((name, cost)) => Err(format!("credits.{} must be at least 1, got {}", name, cost)),
            None => Ok(()),
        }
    }
}

impl Default for CreditCosts {
    fn default() -> Self {
        Self {
            email: 2,
            phone: 3,
            social: 1,
            company: 4,
            email_verify: 1,
            email_find: 2,
            crm_import_per_record: 1,
            crm_export_per_record: 1,
            ai_message: 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Outer bound on a single provider lookup
    pub provider_timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutreachConfig {
    pub writer_timeout_ms: u64,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            writer_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VerificationConfig {
    pub base_url: String,
    /// Provider API key. The synthetic provider is used when empty (mock-api builds).
    pub api_key: String,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub find_refund: RefundPolicy,
    pub verify_refund: RefundPolicy,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.icypeas.com/api".to_string(),
            api_key: String::new(),
            max_attempts: 10,
            poll_interval_ms: 2_000,
            request_timeout_ms: 5_000,
            // Finder: nothing found costs nothing.
            find_refund: RefundPolicy {
                on_negative: Refund::Full,
                on_error: Refund::Full,
                on_exhausted: Refund::Full,
            },
            // Verifier: an "invalid" verdict is still a delivered answer.
            verify_refund: RefundPolicy {
                on_negative: Refund::None,
                on_error: Refund::Full,
                on_exhausted: Refund::Full,
            },
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let config: Self = serde_yaml::from_str(content)?;
        config
            .credits
            .validate()
            .map_err(<serde_yaml::Error as serde::de::Error>::custom)?;
        Ok(config)
    }
}
