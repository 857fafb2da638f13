//! Record model for Digital Product Passports
//!
//! A [`Dpp`] is the aggregate root stored under its `dpp_id`. It owns its
//! audit trail: there is no separate persisted entity for audit entries.
//! Field order below is the wire order, so every replica encodes the same
//! record to the same bytes.

use crate::error::{PassportError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of mutation recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// Record was created
    Create,
    /// Mutable fields were replaced
    Update,
    /// Ownership moved to a new DID
    Transfer,
}

impl AuditAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a record's append-only history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// What happened
    pub action: AuditAction,

    /// Public key (signed paths) or owner DID (unsigned paths)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signed_by: String,

    /// Transaction time, RFC 3339 with second precision
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
}

impl AuditLogEntry {
    /// Build an entry stamped with a transaction time
    pub fn new(action: AuditAction, signed_by: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            action,
            signed_by: signed_by.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Access grants attached to a passport
///
/// Older records carry a flat list of roles; newer ones map a role name to
/// the identifiers granted that role. Both shapes are accepted and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Permissions {
    /// Set of role strings
    Roles(Vec<String>),
    /// Role name -> grantee identifiers
    Grants(BTreeMap<String, Vec<String>>),
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::Roles(Vec::new())
    }
}

impl Permissions {
    /// Permissions expressed as a list of roles
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Permissions::Roles(roles.into_iter().map(Into::into).collect())
    }

    /// Permissions expressed as role -> grantees
    pub fn grants<I, K>(grants: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: Into<String>,
    {
        Permissions::Grants(grants.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// True when no role is present in either shape
    pub fn is_empty(&self) -> bool {
        match self {
            Permissions::Roles(roles) => roles.is_empty(),
            Permissions::Grants(grants) => grants.is_empty(),
        }
    }
}

/// The mutable part of a passport
///
/// Updates replace every field here at once; nothing is merged with the
/// stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DppFields {
    pub owner_did: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Permissions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<String>,
}

impl DppFields {
    /// Start a field set for the given owner
    pub fn new(owner_did: impl Into<String>) -> Self {
        Self {
            owner_did: owner_did.into(),
            ..Self::default()
        }
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = serial_number.into();
        self
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }
}

/// Digital Product Passport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dpp {
    /// Primary key, also the world-state key. Never reassigned.
    pub dpp_id: String,

    /// Current controlling identity
    #[serde(default)]
    pub owner_did: String,

    #[serde(default)]
    pub serial_number: String,

    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Permissions,

    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<String>,

    /// Append-only history, one entry per committed mutation
    #[serde(default, deserialize_with = "null_as_default")]
    pub audit_log: Vec<AuditLogEntry>,

    /// Time of the last mutation, from the transaction clock
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Dpp {
    /// Create a record with an empty history
    ///
    /// Callers append the `CREATE` entry through the audit appender.
    pub fn new(dpp_id: impl Into<String>, fields: DppFields, updated_at: DateTime<Utc>) -> Self {
        let mut dpp = Self {
            dpp_id: dpp_id.into(),
            updated_at,
            ..Self::default()
        };
        dpp.replace_fields(fields);
        dpp
    }

    /// Replace every mutable field wholesale. `dpp_id` and history are kept.
    pub fn replace_fields(&mut self, fields: DppFields) {
        let DppFields {
            owner_did,
            serial_number,
            product_name,
            status,
            permissions,
            components,
        } = fields;

        self.owner_did = owner_did;
        self.serial_number = serial_number;
        self.product_name = product_name;
        self.status = status;
        self.permissions = permissions;
        self.components = components;
    }

    /// Snapshot of the mutable fields
    pub fn fields(&self) -> DppFields {
        DppFields {
            owner_did: self.owner_did.clone(),
            serial_number: self.serial_number.clone(),
            product_name: self.product_name.clone(),
            status: self.status.clone(),
            permissions: self.permissions.clone(),
            components: self.components.clone(),
        }
    }

    /// Most recent audit entry, if any
    pub fn last_entry(&self) -> Option<&AuditLogEntry> {
        self.audit_log.last()
    }

    /// Serialize to the canonical JSON wire encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(PassportError::from)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(PassportError::from)
    }
}

/// Reject ids that cannot serve as a world-state key
pub fn validate_dpp_id(dpp_id: &str) -> Result<()> {
    if dpp_id.is_empty() {
        return Err(PassportError::Malformed("dpp_id must not be empty".into()));
    }
    Ok(())
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
