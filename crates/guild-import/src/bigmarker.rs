//! Webinar attendance report reconciliation.
//!
//! Parses a BigMarker report workbook (a "Summary" sheet carrying the
//! webinar URL plus a "Registered List" sheet of registrants), resolves
//! each row to a member and applies it to the registration ledger.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use guild_db::models::Event;
use guild_db::{EventStore, Store};
use guild_ledger::{IdentityHints, IdentityResolver, Notify, RegistrationLedger};

use crate::error::ImportError;
use crate::report::{Sheet, Workbook};
use crate::summary::ImportSummary;

/// Source label written on registrations created by this reconciler.
pub const BIGMARKER_SOURCE: &str = "BigMarker";

const SUMMARY_SHEET: &str = "Summary";
const REGISTERED_LIST_SHEET: &str = "Registered List";

/// One normalized registrant row from the report.
///
/// Deduplication key is the normalized email; rows without a real email
/// get one synthesized from their "Guest-" display name so that identity
/// resolution always has a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigMarkerRegistration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub registered_at: DateTime<Utc>,
    pub no_show: bool,
}

/// Synthesize a placeholder email from a guest display name.
///
/// `"Guest-42"` becomes `"guest-42@bigmarker.com"`: lower-cased, with
/// everything but letters, digits and hyphens stripped.
fn synthesize_guest_email(first_name: &str) -> String {
    let local: String = first_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!("{local}@bigmarker.com")
}

fn parse_report_timestamp(value: &str) -> Result<DateTime<Utc>, ImportError> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ImportError::DateParse(value.to_string()))
}

/// Reconciler for the webinar attendance report.
pub struct BigMarkerImporter;

impl BigMarkerImporter {
    /// Extract the webinar URL from the summary sheet.
    ///
    /// The summary sheet is a key/value listing; the URL sits in the row
    /// whose first cell mentions the webinar URL.
    fn webinar_url(summary: &Sheet) -> Result<String, ImportError> {
        for row in 0..summary.row_count() {
            let Some(label) = summary.cell(row, 0) else {
                continue;
            };
            if label.to_lowercase().contains("url") {
                if let Some(url) = summary.cell(row, 1) {
                    return Ok(url.to_string());
                }
            }
        }
        Err(ImportError::InvalidReport(
            "Summary sheet carries no webinar URL".to_string(),
        ))
    }

    /// Parse the registered-list sheet into normalized rows.
    ///
    /// Columns are located by case-insensitive header substring, so the
    /// report's column order does not matter. Duplicate emails keep the
    /// first occurrence.
    fn parse_rows(list: &Sheet) -> Result<Vec<BigMarkerRegistration>, ImportError> {
        let email_col = list.require_column_containing("email")?;
        let first_col = list.require_column_containing("first name")?;
        let last_col = list.require_column_containing("last name")?;
        let registered_col = list.require_column_containing("registration date")?;
        let attended_col = list.require_column_containing("attended live")?;
        let unsubscribed_col = list.require_column_containing("unsubscribed")?;

        let mut rows: Vec<BigMarkerRegistration> = Vec::new();
        for row in 0..list.row_count() {
            let first_name = list.cell(row, first_col).unwrap_or("").to_string();
            let last_name = list.cell(row, last_col).unwrap_or("").to_string();

            let email = match list.cell(row, email_col) {
                Some(email) => email.to_lowercase(),
                None => synthesize_guest_email(&first_name),
            };

            let registered_at = match list.cell(row, registered_col) {
                Some(value) => parse_report_timestamp(value)?,
                None => Utc::now(),
            };

            let attended_live = list.cell_bool(row, attended_col);
            let unsubscribed = list.cell_bool(row, unsubscribed_col);

            if rows.iter().any(|r| r.email == email) {
                continue;
            }
            rows.push(BigMarkerRegistration {
                email,
                first_name,
                last_name,
                registered_at,
                no_show: !attended_live && !unsubscribed,
            });
        }
        Ok(rows)
    }

    async fn target_event<S: EventStore>(store: &S, url: &str) -> Result<Event, ImportError> {
        store
            .find_event_by_webinar_url(url)
            .await?
            .ok_or_else(|| ImportError::EventNotFound {
                webinar_url: url.to_string(),
            })
    }

    /// Run the reconciliation against a report workbook.
    ///
    /// The run is skipped entirely when the target event already carries
    /// BigMarker-sourced registrations, so re-running the same report is
    /// a no-op. An unknown webinar URL aborts the run.
    pub async fn run<S: Store>(
        book: &dyn Workbook,
        store: &S,
        ledger: &RegistrationLedger<S>,
    ) -> Result<ImportSummary, ImportError> {
        let url = Self::webinar_url(book.sheet(SUMMARY_SHEET)?)?;
        let event = Self::target_event(store, &url).await?;
        let event_id = event.event_id();

        let already = store
            .count_event_registrations_by_source(event_id, BIGMARKER_SOURCE)
            .await?;
        if already > 0 {
            info!(
                event_id = %event_id,
                existing = already,
                "Webinar report already imported, skipping"
            );
            return Ok(ImportSummary {
                skipped: 1,
                ..ImportSummary::default()
            });
        }

        let rows = Self::parse_rows(book.sheet(REGISTERED_LIST_SHEET)?)?;
        info!(event_id = %event_id, rows = rows.len(), "Importing webinar report");

        let mut summary = ImportSummary::default();
        for row in rows {
            let hints = IdentityHints {
                email: Some(row.email.clone()),
                first_name: Some(row.first_name.clone()),
                last_name: Some(row.last_name.clone()),
                ..IdentityHints::default()
            };
            let member = IdentityResolver::resolve(store, &hints).await?;

            if let Some(existing) = store.find_registration(event_id, member.member_id()).await? {
                ledger
                    .update_no_show(existing.registration_id(), row.no_show)
                    .await?;
                summary.updated += 1;
                continue;
            }

            let outcome = ledger
                .register(
                    event_id,
                    member.member_id(),
                    row.registered_at,
                    BIGMARKER_SOURCE,
                    row.no_show,
                    Notify::Suppress,
                )
                .await?;
            if outcome.is_success() {
                summary.created += 1;
            } else {
                warn!(
                    event_id = %event_id,
                    member_id = member.id,
                    "Report row did not create a registration"
                );
                summary.skipped += 1;
            }
        }

        info!(
            event_id = %event_id,
            created = summary.created,
            updated = summary.updated,
            "Webinar report import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_email_synthesis() {
        assert_eq!(synthesize_guest_email("Guest-42"), "guest-42@bigmarker.com");
        assert_eq!(synthesize_guest_email("Gäst 7!"), "gst7@bigmarker.com");
    }

    #[test]
    fn test_no_show_derivation() {
        let sheet = Sheet::from_csv(
            "Registered List",
            b"Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
              a@x.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No\n\
              b@x.com,Grace,Hopper,2024-03-01 10:05:00,No,No\n\
              c@x.com,Edsger,Dijkstra,2024-03-01 10:10:00,No,Yes",
        )
        .unwrap();
        let rows = BigMarkerImporter::parse_rows(&sheet).unwrap();
        assert!(!rows[0].no_show);
        assert!(rows[1].no_show);
        assert!(!rows[2].no_show);
    }

    #[test]
    fn test_duplicate_emails_keep_first_row() {
        let sheet = Sheet::from_csv(
            "Registered List",
            b"Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
              A@X.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No\n\
              a@x.com,Ada,Lovelace,2024-03-01 10:05:00,No,No",
        )
        .unwrap();
        let rows = BigMarkerImporter::parse_rows(&sheet).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].no_show);
    }

    #[test]
    fn test_blank_email_synthesizes_guest_address() {
        let sheet = Sheet::from_csv(
            "Registered List",
            b"Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
              ,Guest-42,,2024-03-01 10:00:00,Yes,No",
        )
        .unwrap();
        let rows = BigMarkerImporter::parse_rows(&sheet).unwrap();
        assert_eq!(rows[0].email, "guest-42@bigmarker.com");
    }

    #[test]
    fn test_summary_url_extraction() {
        let sheet = Sheet::from_csv(
            "Summary",
            b"Field,Value\nTitle,Rust Evening\nWebinar URL,https://bigmarker.com/guild/rust-evening",
        )
        .unwrap();
        let url = BigMarkerImporter::webinar_url(&sheet).unwrap();
        assert_eq!(url, "https://bigmarker.com/guild/rust-evening");
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        assert!(matches!(
            parse_report_timestamp("yesterday"),
            Err(ImportError::DateParse(_))
        ));
    }
}
