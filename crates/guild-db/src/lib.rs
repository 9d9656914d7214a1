//! guild-db: data model and persistence for the guild community platform.
//!
//! Entities are plain structs with named fields ([`models`]); the
//! persistence boundary is a set of typed repository traits ([`store`])
//! with a PostgreSQL implementation ([`store::PgStore`]) and an in-memory
//! implementation ([`store::MemStore`]) for tests.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod store;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
pub use store::{
    EventStore, KeywordStore, MemStore, MemberStore, PgStore, RegistrationStore, SponsorStore,
    Store,
};
