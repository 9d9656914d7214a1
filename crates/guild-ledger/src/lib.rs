//! guild-ledger: registration ledger and identity resolution.
//!
//! # Modules
//!
//! - [`registration`] - capacity-limited, idempotent event registration
//! - [`identity`] - find-or-create member resolution from partial hints
//! - [`notify`] - notification dispatcher collaborator boundary
//! - [`token`] - deregistration token generation

pub mod error;
pub mod identity;
pub mod notify;
pub mod registration;
pub mod token;

pub use error::LedgerError;
pub use identity::{IdentityHints, IdentityResolver};
pub use notify::{EmailNotifier, Notifier, NotifyConfig, NotifyError, RecordingNotifier, Template};
pub use registration::{Notify, RegisterOutcome, RegistrationLedger};
pub use token::generate_deregistration_token;
