//! guild-import: external report reconciliation.
//!
//! Three reconcilers share one shape: parse an external dataset into
//! normalized records, resolve each record to a member, then upsert
//! registrations or members, skipping data that was already imported.
//!
//! # Modules
//!
//! - [`bigmarker`] - webinar attendance report (workbook)
//! - [`clubdesk`] - membership spreadsheet (workbook)
//! - [`legacy`] - legacy SQL database replay
//! - [`report`] - workbook-reader collaborator boundary
//! - [`organizer`] - organizer name to member ID mapping file

pub mod bigmarker;
pub mod clubdesk;
pub mod error;
pub mod legacy;
pub mod organizer;
pub mod report;
pub mod summary;

pub use bigmarker::{BigMarkerImporter, BigMarkerRegistration, BIGMARKER_SOURCE};
pub use clubdesk::{ClubDeskImporter, ClubDeskMember};
pub use error::ImportError;
pub use legacy::{LegacyDatabase, LegacyImporter, PgLegacyDatabase, LEGACY_SOURCE};
pub use organizer::OrganizerMap;
pub use report::{CsvWorkbook, Sheet, Workbook};
pub use summary::ImportSummary;
