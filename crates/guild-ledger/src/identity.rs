//! Identity resolution.
//!
//! Given partial identity facts from an external system, find the canonical
//! member record or create one, without producing duplicates for the same
//! person across repeated invocations.

use guild_core::MemberId;
use guild_db::models::{Member, NewMember};
use guild_db::MemberStore;

use crate::error::LedgerError;

/// Partial identity facts carried by an external record.
#[derive(Debug, Clone, Default)]
pub struct IdentityHints {
    /// Externally assigned numeric member ID (legacy systems).
    pub external_id: Option<MemberId>,
    /// Email address.
    pub email: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Company.
    pub company: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// Member identity resolver.
pub struct IdentityResolver;

impl IdentityResolver {
    /// Resolve hints to an existing member, or create one.
    ///
    /// Resolution order, first match wins:
    /// 1. external numeric ID, when a member with that ID exists
    /// 2. exact first name + last name + company, when all three are non-blank
    /// 3. exact email, when non-blank
    /// 4. create a new member from the available fields
    ///
    /// When hints disagree (same email, different external ID) the first
    /// match is returned; there is no conflict-resolution policy.
    pub async fn resolve<S: MemberStore>(
        store: &S,
        hints: &IdentityHints,
    ) -> Result<Member, LedgerError> {
        if let Some(id) = hints.external_id {
            if let Some(member) = store.find_member(id).await? {
                tracing::debug!(member_id = %id, "Resolved member by external ID");
                return Ok(member);
            }
        }

        if let (Some(first), Some(last), Some(company)) = (
            non_blank(hints.first_name.as_ref()),
            non_blank(hints.last_name.as_ref()),
            non_blank(hints.company.as_ref()),
        ) {
            if let Some(member) = store
                .find_member_by_name_and_company(first, last, company)
                .await?
            {
                tracing::debug!(member_id = member.id, "Resolved member by name and company");
                return Ok(member);
            }
        }

        if let Some(email) = non_blank(hints.email.as_ref()) {
            if let Some(member) = store.find_member_by_email(email).await? {
                tracing::debug!(member_id = member.id, "Resolved member by email");
                return Ok(member);
            }
        }

        let member = store
            .insert_member(NewMember {
                id: hints.external_id.map(|id| id.as_i64()),
                email: non_blank(hints.email.as_ref()).unwrap_or("").to_string(),
                first_name: non_blank(hints.first_name.as_ref())
                    .unwrap_or("")
                    .to_string(),
                last_name: non_blank(hints.last_name.as_ref())
                    .unwrap_or("")
                    .to_string(),
                company: non_blank(hints.company.as_ref()).map(str::to_string),
                is_active: true,
                ..NewMember::default()
            })
            .await?;
        tracing::info!(member_id = member.id, "Created member from identity hints");
        Ok(member)
    }
}
