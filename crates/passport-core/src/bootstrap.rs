//! Ledger seeding from a JSON array of records
//!
//! Seed records are written as given, audit log included. No existence check
//! is made, so re-running a seed overwrites whatever is stored under the same
//! ids.

use std::path::Path;

use tracing::info;

use crate::error::{PassportError, Result};
use crate::ledger::LedgerStore;
use crate::types::{validate_dpp_id, Dpp};

/// Read a seed file holding a JSON array of records
pub fn load_seed(path: impl AsRef<Path>) -> Result<Vec<Dpp>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        PassportError::Malformed(format!("cannot read seed file {}: {}", path.display(), e))
    })?;
    parse_seed(&data)
}

/// Decode a seed document
pub fn parse_seed(data: &[u8]) -> Result<Vec<Dpp>> {
    serde_json::from_slice(data)
        .map_err(|e| PassportError::Malformed(format!("invalid seed document: {}", e)))
}

/// Write every record under its own id; returns the number written
pub fn init_ledger<S>(ledger: &mut S, records: &[Dpp]) -> Result<usize>
where
    S: LedgerStore + ?Sized,
{
    // Validate first so a bad record leaves nothing pending
    for dpp in records {
        validate_dpp_id(&dpp.dpp_id)?;
    }

    for dpp in records {
        ledger.put_state(&dpp.dpp_id, dpp.to_bytes()?)?;
    }

    info!(records = records.len(), "Seeded ledger");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::types::AuditAction;
    use chrono::Utc;

    const SEED: &str = r#"[
        {
            "dpp_id": "DPP-100",
            "owner_did": "did:ex:factory",
            "serial_number": "SN-100",
            "product_name": "Heat pump",
            "status": "active",
            "permissions": {"read": ["did:ex:auditor"]},
            "components": ["compressor"],
            "audit_log": [
                {"action": "CREATE", "signed_by": "did:ex:factory", "timestamp": "2024-01-01T00:00:00Z"}
            ],
            "updated_at": "2024-01-01T00:00:00Z"
        },
        {
            "dpp_id": "DPP-101",
            "owner_did": "did:ex:factory",
            "permissions": null,
            "components": null
        }
    ]"#;

    #[test]
    fn test_seed_written_verbatim() {
        let records = parse_seed(SEED.as_bytes()).unwrap();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(Utc::now());
        assert_eq!(init_ledger(&mut tx, &records).unwrap(), 2);
        tx.commit();

        let stored = Dpp::from_bytes(ledger.get("DPP-100").unwrap()).unwrap();
        assert_eq!(stored, records[0]);
        assert_eq!(stored.audit_log.len(), 1);
        assert_eq!(stored.audit_log[0].action, AuditAction::Create);

        let sparse = Dpp::from_bytes(ledger.get("DPP-101").unwrap()).unwrap();
        assert!(sparse.audit_log.is_empty());
        assert!(sparse.components.is_empty());
    }

    #[test]
    fn test_seed_overwrites_existing() {
        let records = parse_seed(SEED.as_bytes()).unwrap();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(Utc::now());
        tx.put_state("DPP-100", b"{}".to_vec()).unwrap();
        tx.commit();

        let mut tx = ledger.begin(Utc::now());
        init_ledger(&mut tx, &records).unwrap();
        tx.commit();

        let stored = Dpp::from_bytes(ledger.get("DPP-100").unwrap()).unwrap();
        assert_eq!(stored.product_name, "Heat pump");
    }

    #[test]
    fn test_empty_id_rejects_whole_seed() {
        let mut records = parse_seed(SEED.as_bytes()).unwrap();
        records[1].dpp_id.clear();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(Utc::now());
        let err = init_ledger(&mut tx, &records).unwrap_err();
        assert!(matches!(err, PassportError::Malformed(_)));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_invalid_document_is_malformed() {
        assert!(matches!(
            parse_seed(b"{\"dpp_id\": 1}"),
            Err(PassportError::Malformed(_))
        ));
        assert!(matches!(
            load_seed("/nonexistent/seed.json"),
            Err(PassportError::Malformed(_))
        ));
    }
}
