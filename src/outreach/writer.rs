//! Message generation seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::contacts::Contact;
use crate::error::ProviderError;

/// What the user wants the message to achieve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct OutreachBrief {
    #[validate(length(min = 1, max = 2000))]
    pub purpose: String,
    /// e.g. "friendly", "formal"
    #[validate(length(max = 64))]
    pub tone: Option<String>,
    #[validate(length(max = 255))]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Draft {
    pub subject: String,
    pub body: String,
}

/// Writes a personalized message for one contact
#[async_trait]
pub trait MessageWriter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, contact: &Contact, brief: &OutreachBrief) -> Result<Draft, ProviderError>;
}

/// Fill-in-the-blanks writer, no external calls
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateWriter;

#[async_trait]
impl MessageWriter for TemplateWriter {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn write(&self, contact: &Contact, brief: &OutreachBrief) -> Result<Draft, ProviderError> {
        let greeting = match brief.tone.as_deref() {
            Some("formal") => format!("Dear {}", contact.full_name()),
            _ => format!("Hi {}", contact.first_name),
        };
        let about = match (&contact.title, &contact.company_name) {
            (Some(title), Some(company)) => format!(" As {} at {}, you", title, company),
            (None, Some(company)) => format!(" At {}, you", company),
            (Some(title), None) => format!(" As {}, you", title),
            (None, None) => " You".to_string(),
        };
        let signature = brief.sender_name.as_deref().unwrap_or("The team");

        Ok(Draft {
            subject: match &contact.company_name {
                Some(company) => format!("Quick idea for {}", company),
                None => format!("Quick idea for you, {}", contact.first_name),
            },
            body: format!(
                "{},\n\n{} may find this relevant: {}\n\nBest,\n{}",
                greeting,
                about.trim_start(),
                brief.purpose.trim(),
                signature
            ),
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writer that always fails
    #[derive(Default)]
    pub struct FailingWriter {
        calls: AtomicUsize,
    }

    impl FailingWriter {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageWriter for FailingWriter {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn write(&self, _contact: &Contact, _brief: &OutreachBrief) -> Result<Draft, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Transport("model unavailable".into()))
        }
    }
}
