//! Database entity models for guild-db.
//!
//! These models represent the database tables and provide
//! type-safe interactions with PostgreSQL.

pub mod event;
pub mod keyword;
pub mod member;
pub mod registration;
pub mod sponsor;

pub use event::{Event, NewEvent};
pub use keyword::{Keyword, NewKeyword};
pub use member::{Member, MemberContact, NewMember};
pub use registration::{NewRegistration, Registration, DEREGISTRATION_TOKEN_LEN};
pub use sponsor::{NewSponsor, Sponsor};
