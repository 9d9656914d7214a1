//! Membership spreadsheet reconciliation.
//!
//! Parses a ClubDesk member export (fixed German column headers) and
//! upserts a member per row, keyed by email. Spreadsheet data is
//! authoritative: contact and membership fields are overwritten wholesale.

use chrono::NaiveDate;
use tracing::info;

use guild_db::models::{MemberContact, NewMember};
use guild_db::MemberStore;

use crate::error::ImportError;
use crate::report::{Sheet, Workbook};
use crate::summary::ImportSummary;

const MEMBER_SHEET: &str = "Mitglieder";

/// One normalized member row from the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubDeskMember {
    pub legacy_id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub street: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub membership_begin: Option<NaiveDate>,
    pub membership_end: Option<NaiveDate>,
}

/// Strip the trailing ".0" artifact numeric cell formatting leaves on
/// postal codes.
fn normalize_zip(raw: &str) -> String {
    raw.strip_suffix(".0").unwrap_or(raw).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, ImportError> {
    NaiveDate::parse_from_str(value, "%d.%m.%Y")
        .map_err(|_| ImportError::DateParse(value.to_string()))
}

/// Reconciler for the ClubDesk membership spreadsheet.
pub struct ClubDeskImporter;

impl ClubDeskImporter {
    /// Parse the member sheet into normalized rows.
    ///
    /// Headers are matched exactly. Rows without an email are dropped
    /// since email is the upsert key. Duplicate legacy IDs keep the first
    /// occurrence.
    fn parse_rows(sheet: &Sheet) -> Result<Vec<ClubDeskMember>, ImportError> {
        let id_col = sheet.require_column_exact("Mitglieder-ID")?;
        let email_col = sheet.require_column_exact("E-Mail")?;
        let first_col = sheet.require_column_exact("Vorname")?;
        let last_col = sheet.require_column_exact("Nachname")?;
        let company_col = sheet.require_column_exact("Firma")?;
        let street_col = sheet.require_column_exact("Strasse")?;
        let zip_col = sheet.require_column_exact("PLZ")?;
        let city_col = sheet.require_column_exact("Ort")?;
        let begin_col = sheet.require_column_exact("Eintritt")?;
        let end_col = sheet.require_column_exact("Austritt")?;

        let mut rows: Vec<ClubDeskMember> = Vec::new();
        for row in 0..sheet.row_count() {
            let Some(email) = sheet.cell(row, email_col) else {
                continue;
            };
            let legacy_id = sheet
                .cell(row, id_col)
                .and_then(|v| v.parse::<i64>().ok());
            if legacy_id.is_some() && rows.iter().any(|r| r.legacy_id == legacy_id) {
                continue;
            }

            let membership_begin = sheet
                .cell(row, begin_col)
                .map(parse_date)
                .transpose()?;
            let membership_end = sheet.cell(row, end_col).map(parse_date).transpose()?;

            rows.push(ClubDeskMember {
                legacy_id,
                email: email.to_lowercase(),
                first_name: sheet.cell(row, first_col).unwrap_or("").to_string(),
                last_name: sheet.cell(row, last_col).unwrap_or("").to_string(),
                company: sheet.cell(row, company_col).map(str::to_string),
                street: sheet.cell(row, street_col).map(str::to_string),
                zip_code: sheet.cell(row, zip_col).map(normalize_zip),
                city: sheet.cell(row, city_col).map(str::to_string),
                membership_begin,
                membership_end,
            });
        }
        Ok(rows)
    }

    /// Run the reconciliation against a spreadsheet workbook.
    ///
    /// The run is skipped entirely when any member already carries a
    /// membership begin date, the trace this import leaves behind.
    pub async fn run<S: MemberStore>(
        book: &dyn Workbook,
        store: &S,
    ) -> Result<ImportSummary, ImportError> {
        if store.count_members_with_membership().await? > 0 {
            info!("Membership spreadsheet already imported, skipping");
            return Ok(ImportSummary {
                skipped: 1,
                ..ImportSummary::default()
            });
        }

        let rows = Self::parse_rows(book.sheet(MEMBER_SHEET)?)?;
        info!(rows = rows.len(), "Importing membership spreadsheet");

        let mut summary = ImportSummary::default();
        for row in rows {
            let contact = MemberContact {
                first_name: row.first_name.clone(),
                last_name: row.last_name.clone(),
                company: row.company.clone(),
                street: row.street.clone(),
                zip_code: row.zip_code.clone(),
                city: row.city.clone(),
                membership_begin: row.membership_begin,
                membership_end: row.membership_end,
            };

            match store.find_member_by_email(&row.email).await? {
                Some(existing) => {
                    store
                        .overwrite_member_contact(existing.member_id(), &contact)
                        .await?;
                    summary.updated += 1;
                }
                None => {
                    store
                        .insert_member(NewMember {
                            email: row.email.clone(),
                            first_name: contact.first_name,
                            last_name: contact.last_name,
                            company: contact.company,
                            street: contact.street,
                            zip_code: contact.zip_code,
                            city: contact.city,
                            membership_begin: contact.membership_begin,
                            membership_end: contact.membership_end,
                            is_active: true,
                            ..NewMember::default()
                        })
                        .await?;
                    summary.created += 1;
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            "Membership spreadsheet import finished"
        );
        Ok(summary)
    }
}
