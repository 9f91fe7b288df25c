//! Email verification and email finding
//!
//! Vendor jobs are asynchronous: [`VerificationService`] debits, starts a
//! job, then drives [`VerificationPoller`] until a terminal status or the
//! attempt budget runs out. Refunds for non-success outcomes follow an
//! explicit [`RefundPolicy`].
//!
//! Jobs are not persisted; a process restart mid-poll loses the job.

pub mod error;
pub mod icypeas;
pub mod policy;
pub mod poller;
pub mod provider;
pub mod service;
pub mod status;
pub mod synthetic;

pub use error::VerificationError;
pub use icypeas::IcypeasClient;
pub use policy::{Refund, RefundPolicy};
pub use poller::{PollOutcome, VerificationPoller};
pub use provider::{ExternalJobId, JobSnapshot, VerificationProvider, VerificationRequest};
pub use service::{PollBudget, VerificationReceipt, VerificationService};
pub use status::{JobStatus, ResolvedResult};
pub use synthetic::SyntheticVerificationProvider;
