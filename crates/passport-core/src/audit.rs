//! Audit trail appender
//!
//! Every committed mutation adds exactly one entry to the record it touched.
//! The entry time is the transaction clock handed in by the caller, so every
//! replica executing the same transaction writes the same bytes.

use chrono::{DateTime, Utc};

use crate::types::{AuditAction, AuditLogEntry, Dpp};

/// Append one entry for `action` and stamp `updated_at`
///
/// Existing entries are never touched.
pub fn append(dpp: &mut Dpp, action: AuditAction, signed_by: &str, tx_time: DateTime<Utc>) {
    dpp.audit_log.push(AuditLogEntry::new(action, signed_by, tx_time));
    dpp.updated_at = tx_time;
}

/// True when `after` keeps every entry of `before`, in order, as a prefix
pub fn is_append_of(before: &[AuditLogEntry], after: &[AuditLogEntry]) -> bool {
    after.len() >= before.len() && after[..before.len()] == *before
}
