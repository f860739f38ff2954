//! Record comparison rules.
//!
//! Pure classification of one directory record against its profile-store
//! counterpart. Rules run in a fixed order; a failed or orphaned lookup
//! stops the remaining checks for that record, everything else accumulates.

use crosswalk_core::{strip_dashes, to_dashed};
use crosswalk_directory::DirectoryRecord;
use crosswalk_profile::ProfileRecord;
use serde::{Deserialize, Serialize};

/// Directory-side first-name sentinel meaning "no claim made"; written by
/// the sync mapping when the source had no name, never a mismatch.
const NAME_SENTINEL: &str = "unknown";

/// Classification of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// The directory record has no stored external identifier.
    MissingExternalId,
    /// The profile lookup never returned (transport failure after retries).
    LookupFailed,
    /// The profile store answered, but reported the record as not found.
    OrphanedRecord,
    /// Dashed-form profile id does not match the directory id.
    IdMismatch,
    /// Stored raw external id does not match the profile primary key.
    RawIdMismatch,
    /// Profile email matches neither the directory username nor email.
    EmailMismatch,
    /// Directory account status disagrees with the profile active flag.
    StatusMismatch,
    /// Display names disagree.
    NameMismatch,
}

impl MismatchKind {
    /// Wire name used in events and CSV rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingExternalId => "missing_external_id",
            Self::LookupFailed => "lookup_failed",
            Self::OrphanedRecord => "orphaned_record",
            Self::IdMismatch => "id_mismatch",
            Self::RawIdMismatch => "raw_id_mismatch",
            Self::EmailMismatch => "email_mismatch",
            Self::StatusMismatch => "status_mismatch",
            Self::NameMismatch => "name_mismatch",
        }
    }
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rule violation produced by [`compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: MismatchKind,
    /// Directory-side value involved in the comparison.
    pub source_value: String,
    /// Profile-side value involved in the comparison.
    pub target_value: String,
    /// Human-readable explanation.
    pub details: String,
}

/// The raw external id used for profile lookups: the stored field when
/// present, otherwise the directory id with dashes stripped.
#[must_use]
pub fn raw_external_id(record: &DirectoryRecord) -> String {
    match record.external_raw_id.as_deref() {
        Some(raw) if !raw.is_empty() => raw.to_string(),
        _ => strip_dashes(&record.id),
    }
}

/// Directory-side contact address: username first, then email.
#[must_use]
pub fn primary_email(record: &DirectoryRecord) -> String {
    record
        .user_name
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| record.email.clone().filter(|s| !s.is_empty()))
        .unwrap_or_default()
}

/// Compare one directory record against its resolved profile (or the
/// absence of one) and return every rule violation, in rule order.
///
/// `profile` is `None` only when the lookup itself never returned; a
/// profile-store "not found" arrives as a record with a nonzero error code.
/// Both cases stop the remaining checks for the record.
#[must_use]
pub fn compare(record: &DirectoryRecord, profile: Option<&ProfileRecord>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let raw_id = raw_external_id(record);

    // 1. Missing stored external identifier. The remaining checks still run
    //    against the id derived from the directory identifier.
    if record.external_raw_id.as_deref().unwrap_or("").is_empty() {
        findings.push(Finding {
            kind: MismatchKind::MissingExternalId,
            source_value: "externalRawId: (empty)".to_string(),
            target_value: "N/A".to_string(),
            details: "externalRawId is empty/missing - cannot verify the profile identifier mapping"
                .to_string(),
        });
    }

    // 2. The lookup never returned anything.
    let Some(profile) = profile else {
        findings.push(Finding {
            kind: MismatchKind::LookupFailed,
            source_value: record.id.clone(),
            target_value: "Error: failed to retrieve profile".to_string(),
            details: format!("Could not retrieve profile for external id {raw_id}"),
        });
        return findings;
    };

    // 3. The profile store answered "not found".
    if !profile.found() {
        let message = profile.error_message.as_deref().unwrap_or("");
        findings.push(Finding {
            kind: MismatchKind::OrphanedRecord,
            source_value: record.id.clone(),
            target_value: format!("Profile error {}: {message}", profile.error_code),
            details: format!("No profile found for external id {raw_id}. Error: {message}"),
        });
        return findings;
    }

    // 4. Dashed-form identifier comparison.
    let profile_id = profile.external_id.as_str();
    let dashed = to_dashed(profile_id);
    if dashed.to_lowercase() != record.id.to_lowercase() {
        findings.push(Finding {
            kind: MismatchKind::IdMismatch,
            source_value: record.id.clone(),
            target_value: dashed.clone(),
            details: format!(
                "Directory id \"{}\" does not match dashed profile id \"{dashed}\" (raw: {profile_id})",
                record.id
            ),
        });
    }

    // 5. Raw identifier comparison, only when the directory stored one.
    if let Some(stored) = record.external_raw_id.as_deref() {
        if !stored.is_empty() && stored.to_lowercase() != profile_id.to_lowercase() {
            findings.push(Finding {
                kind: MismatchKind::RawIdMismatch,
                source_value: stored.to_string(),
                target_value: profile_id.to_string(),
                details: format!(
                    "externalRawId \"{stored}\" does not match profile id \"{profile_id}\""
                ),
            });
        }
    }

    // 6. Email: the profile address must match either the directory
    //    username or the directory email.
    let profile_email = profile.email.as_deref().unwrap_or("");
    let record_email = primary_email(record);
    if !profile_email.is_empty() && !record_email.is_empty() {
        let user_name = record.user_name.as_deref().unwrap_or("");
        let email = record.email.as_deref().unwrap_or("");
        let matched = user_name.to_lowercase() == profile_email.to_lowercase()
            || email.to_lowercase() == profile_email.to_lowercase();
        if !matched {
            findings.push(Finding {
                kind: MismatchKind::EmailMismatch,
                source_value: format!("userName: {user_name}, email: {email}"),
                target_value: profile_email.to_string(),
                details: format!(
                    "Directory email fields do not match profile email \"{profile_email}\""
                ),
            });
        }
    }

    // 7. Account status against the profile active flag.
    if let (Some(status), Some(is_active)) = (record.account_status.as_deref(), profile.is_active)
    {
        let expected = if is_active { "active" } else { "inactive" };
        if !status.is_empty() && status.to_lowercase() != expected {
            findings.push(Finding {
                kind: MismatchKind::StatusMismatch,
                source_value: status.to_string(),
                target_value: format!("isActive: {is_active} (expected: {expected})"),
                details: format!(
                    "Directory accountStatus \"{status}\" does not match expected \"{expected}\" from profile isActive={is_active}"
                ),
            });
        }
    }

    // 8. Display names, only when both sides claim a first name.
    let profile_first = profile.first_name.as_deref().unwrap_or("");
    let record_first = record.given_name.as_deref().unwrap_or("");
    if !profile_first.is_empty()
        && !record_first.is_empty()
        && record_first.to_lowercase() != NAME_SENTINEL
    {
        let record_full = full_name(record_first, record.surname.as_deref().unwrap_or(""));
        let profile_full = full_name(profile_first, profile.last_name.as_deref().unwrap_or(""));
        if record_full.to_lowercase() != profile_full.to_lowercase() {
            findings.push(Finding {
                kind: MismatchKind::NameMismatch,
                source_value: record_full.clone(),
                target_value: profile_full.clone(),
                details: format!(
                    "Name mismatch: directory \"{record_full}\" vs profile \"{profile_full}\""
                ),
            });
        }
    }

    findings
}

fn full_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}
