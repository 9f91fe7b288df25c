//! Paid outreach message drafting

pub mod error;
pub mod service;
pub mod writer;

pub use error::OutreachError;
pub use service::{OutreachMessage, OutreachService};
pub use writer::{Draft, MessageWriter, OutreachBrief, TemplateWriter};
