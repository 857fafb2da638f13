//! Read-only listing over the passport keyspace

use crate::error::Result;
use crate::ledger::{LedgerStore, Selector, StateIter};
use crate::types::Dpp;

/// Field used by owner queries
pub const OWNER_FIELD: &str = "owner_did";

/// Selector matching records owned by `owner_did`
pub fn owner_selector(owner_did: &str) -> Selector {
    Selector::new().field_eq(OWNER_FIELD, owner_did)
}

/// Stream every record in store order
///
/// The iterator is single-pass. Store and decode errors are yielded as they
/// occur.
pub fn scan_all<S>(ledger: &S) -> Result<impl Iterator<Item = Result<Dpp>> + '_>
where
    S: LedgerStore + ?Sized,
{
    // Empty bounds: open-ended scan of the whole namespace
    Ok(decode(ledger.state_by_range("", "")?))
}

/// Stream records whose `owner_did` equals `owner_did`
pub fn scan_by_owner<'a, S>(
    ledger: &'a S,
    owner_did: &str,
) -> Result<impl Iterator<Item = Result<Dpp>> + 'a>
where
    S: LedgerStore + ?Sized,
{
    Ok(decode(ledger.query(&owner_selector(owner_did))?))
}

/// All records, in the order the range scan returns them
pub fn list_all<S>(ledger: &S) -> Result<Vec<Dpp>>
where
    S: LedgerStore + ?Sized,
{
    scan_all(ledger)?.collect()
}

/// All records owned by `owner_did`
pub fn list_by_owner<S>(ledger: &S, owner_did: &str) -> Result<Vec<Dpp>>
where
    S: LedgerStore + ?Sized,
{
    scan_by_owner(ledger, owner_did)?.collect()
}

fn decode(iter: StateIter<'_>) -> impl Iterator<Item = Result<Dpp>> + '_ {
    iter.map(|entry| {
        let entry = entry?;
        Dpp::from_bytes(&entry.value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::types::DppFields;
    use chrono::{TimeZone, Utc};

    fn seed(ledger: &mut MemoryLedger, records: &[(&str, &str)]) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tx = ledger.begin(now);
        for (id, owner) in records {
            let dpp = Dpp::new(*id, DppFields::new(*owner), now);
            tx.put_state(id, dpp.to_bytes().unwrap()).unwrap();
        }
        tx.commit();
    }

    #[test]
    fn test_list_all_in_key_order() {
        let mut ledger = MemoryLedger::new();
        seed(&mut ledger, &[("DPP-2", "bob"), ("DPP-1", "alice"), ("DPP-3", "alice")]);

        let tx = ledger.begin(Utc::now());
        let ids: Vec<String> = list_all(&tx).unwrap().into_iter().map(|d| d.dpp_id).collect();
        assert_eq!(ids, vec!["DPP-1", "DPP-2", "DPP-3"]);
    }

    #[test]
    fn test_list_by_owner_filters_exactly() {
        let mut ledger = MemoryLedger::new();
        seed(
            &mut ledger,
            &[("DPP-1", "alice"), ("DPP-2", "bob"), ("DPP-3", "alice"), ("DPP-4", "alice2")],
        );

        let tx = ledger.begin(Utc::now());
        let owned = list_by_owner(&tx, "alice").unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|d| d.owner_did == "alice"));
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let mut ledger = MemoryLedger::new();
        let tx = ledger.begin(Utc::now());
        assert!(list_all(&tx).unwrap().is_empty());
        assert!(list_by_owner(&tx, "anyone").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_surfaces_error() {
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(Utc::now());
        tx.put_state("DPP-X", b"[1,2,3]".to_vec()).unwrap();
        tx.commit();

        let tx = ledger.begin(Utc::now());
        assert!(list_all(&tx).is_err());
    }
}
