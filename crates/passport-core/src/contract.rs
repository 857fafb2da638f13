//! Passport contract: CRUD, ownership transfer and their signed variants
//!
//! Each method is one transaction body. It receives the transaction-scoped
//! [`LedgerStore`], checks existence, authorizes when signed, applies the
//! change, appends one audit entry and writes the record back. Every
//! failure returns before the write, so a failed call leaves no trace.
//! Commit and rollback belong to the caller.

use tracing::{info, warn};

use crate::audit;
use crate::auth::{authorize_owner, verify_envelope};
use crate::crypto::SignedEnvelope;
use crate::error::{PassportError, Result};
use crate::ledger::LedgerStore;
use crate::query;
use crate::types::{validate_dpp_id, AuditAction, Dpp, DppFields};

/// Deployment switches for the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractPolicy {
    /// Accept `Create`, `Update`, `Transfer` and `Delete` without a signature
    pub allow_unsigned: bool,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        Self {
            allow_unsigned: true,
        }
    }
}

impl ContractPolicy {
    /// Only signed mutations are accepted
    pub fn signed_only() -> Self {
        Self {
            allow_unsigned: false,
        }
    }
}

/// The passport contract
#[derive(Debug, Clone, Default)]
pub struct DppContract {
    policy: ContractPolicy,
}

impl DppContract {
    pub fn new(policy: ContractPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ContractPolicy {
        self.policy
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// True when a record is stored under `dpp_id`
    pub fn exists<S>(&self, ledger: &S, dpp_id: &str) -> Result<bool>
    where
        S: LedgerStore + ?Sized,
    {
        Ok(ledger.get_state(dpp_id)?.is_some())
    }

    /// Load the record stored under `dpp_id`
    pub fn read<S>(&self, ledger: &S, dpp_id: &str) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        match ledger.get_state(dpp_id)? {
            Some(bytes) => Dpp::from_bytes(&bytes),
            None => Err(PassportError::NotFound(dpp_id.to_string())),
        }
    }

    /// Every record, in store order
    pub fn list_all<S>(&self, ledger: &S) -> Result<Vec<Dpp>>
    where
        S: LedgerStore + ?Sized,
    {
        query::list_all(ledger)
    }

    /// Every record owned by `owner_did`
    pub fn list_by_owner<S>(&self, ledger: &S, owner_did: &str) -> Result<Vec<Dpp>>
    where
        S: LedgerStore + ?Sized,
    {
        query::list_by_owner(ledger, owner_did)
    }

    // =========================================================================
    // Unsigned mutations
    // =========================================================================

    /// Create a record; the owner DID is recorded as signer
    pub fn create<S>(&self, ledger: &mut S, dpp_id: &str, fields: DppFields) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        self.ensure_unsigned_allowed("Create", dpp_id)?;
        self.ensure_absent(&*ledger, dpp_id)?;

        let signer = fields.owner_did.clone();
        self.insert(ledger, dpp_id, fields, &signer)
    }

    /// Replace all mutable fields; the owner before the update is recorded
    pub fn update<S>(&self, ledger: &mut S, dpp_id: &str, fields: DppFields) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        self.ensure_unsigned_allowed("Update", dpp_id)?;
        let mut dpp = self.read(&*ledger, dpp_id)?;

        let signer = dpp.owner_did.clone();
        dpp.replace_fields(fields);
        self.commit_mutation(ledger, dpp, AuditAction::Update, &signer)
    }

    /// Remove a record and its history
    pub fn delete<S>(&self, ledger: &mut S, dpp_id: &str) -> Result<()>
    where
        S: LedgerStore + ?Sized,
    {
        self.ensure_unsigned_allowed("Delete", dpp_id)?;
        if !self.exists(&*ledger, dpp_id)? {
            return Err(PassportError::NotFound(dpp_id.to_string()));
        }

        ledger.del_state(dpp_id)?;
        info!(dpp_id = %dpp_id, "Deleted DPP");
        Ok(())
    }

    /// Move ownership without proof; the previous owner is recorded
    pub fn transfer<S>(&self, ledger: &mut S, dpp_id: &str, new_owner_did: &str) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        self.ensure_unsigned_allowed("Transfer", dpp_id)?;
        let mut dpp = self.read(&*ledger, dpp_id)?;

        let signer = std::mem::replace(&mut dpp.owner_did, new_owner_did.to_string());
        self.commit_mutation(ledger, dpp, AuditAction::Transfer, &signer)
    }

    // =========================================================================
    // Signed mutations
    // =========================================================================

    /// Create a record after checking the envelope signature
    ///
    /// There is no prior owner to match, so only the signature is checked.
    /// The presented key becomes the `CREATE` signer.
    pub fn create_with_signature<S>(
        &self,
        ledger: &mut S,
        dpp_id: &str,
        fields: DppFields,
        envelope: &SignedEnvelope,
    ) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        self.ensure_absent(&*ledger, dpp_id)?;
        verify_envelope(dpp_id, envelope)?;

        self.insert(ledger, dpp_id, fields, envelope.signer())
    }

    /// Replace all mutable fields on behalf of the current owner
    pub fn update_with_signature<S>(
        &self,
        ledger: &mut S,
        dpp_id: &str,
        fields: DppFields,
        envelope: &SignedEnvelope,
    ) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        let mut dpp = self.read(&*ledger, dpp_id)?;
        authorize_owner(dpp_id, &dpp.owner_did, envelope)?;

        dpp.replace_fields(fields);
        self.commit_mutation(ledger, dpp, AuditAction::Update, envelope.signer())
    }

    /// Hand the record to `new_owner_did` on behalf of the current owner
    pub fn transfer_with_signature<S>(
        &self,
        ledger: &mut S,
        dpp_id: &str,
        new_owner_did: &str,
        envelope: &SignedEnvelope,
    ) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        let mut dpp = self.read(&*ledger, dpp_id)?;
        authorize_owner(dpp_id, &dpp.owner_did, envelope)?;

        dpp.owner_did = new_owner_did.to_string();
        self.commit_mutation(ledger, dpp, AuditAction::Transfer, envelope.signer())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_unsigned_allowed(&self, operation: &str, dpp_id: &str) -> Result<()> {
        if self.policy.allow_unsigned {
            return Ok(());
        }
        warn!(
            dpp_id = %dpp_id,
            operation = operation,
            "SECURITY: unsigned mutation refused by policy"
        );
        Err(PassportError::Unauthorized(format!(
            "unsigned {} is disabled on this ledger",
            operation
        )))
    }

    fn ensure_absent<S>(&self, ledger: &S, dpp_id: &str) -> Result<()>
    where
        S: LedgerStore + ?Sized,
    {
        validate_dpp_id(dpp_id)?;
        if self.exists(&*ledger, dpp_id)? {
            return Err(PassportError::AlreadyExists(dpp_id.to_string()));
        }
        Ok(())
    }

    fn insert<S>(&self, ledger: &mut S, dpp_id: &str, fields: DppFields, signer: &str) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        let tx_time = ledger.tx_timestamp()?;
        let dpp = Dpp::new(dpp_id, fields, tx_time);
        self.commit_mutation(ledger, dpp, AuditAction::Create, signer)
    }

    /// Append the audit entry and write the record; the single write of a call
    fn commit_mutation<S>(
        &self,
        ledger: &mut S,
        mut dpp: Dpp,
        action: AuditAction,
        signer: &str,
    ) -> Result<Dpp>
    where
        S: LedgerStore + ?Sized,
    {
        let tx_time = ledger.tx_timestamp()?;
        audit::append(&mut dpp, action, signer, tx_time);

        let bytes = dpp.to_bytes()?;
        ledger.put_state(&dpp.dpp_id, bytes)?;

        info!(
            dpp_id = %dpp.dpp_id,
            action = %action,
            signed_by = %signer,
            entries = dpp.audit_log.len(),
            "Committed DPP mutation"
        );
        Ok(dpp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::ledger::MemoryLedger;
    use chrono::{DateTime, TimeZone, Utc};

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 8, 0, 0).unwrap()
    }

    fn fields(owner: &str) -> DppFields {
        DppFields::new(owner)
            .with_serial_number("SN-001")
            .with_product_name("Battery pack")
            .with_status("active")
    }

    #[test]
    fn test_create_then_read() {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(t(1));
        let created = contract.create(&mut tx, "DPP-1", fields("did:ex:alice")).unwrap();
        tx.commit();

        let tx = ledger.begin(t(2));
        let read = contract.read(&tx, "DPP-1").unwrap();
        assert_eq!(read, created);
        assert_eq!(read.fields(), fields("did:ex:alice"));
        assert_eq!(read.audit_log.len(), 1);
        assert_eq!(read.audit_log[0].action, AuditAction::Create);
        assert_eq!(read.audit_log[0].signed_by, "did:ex:alice");
        assert_eq!(read.updated_at, t(1));
    }

    #[test]
    fn test_create_rejects_empty_id() {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(t(1));

        let err = contract.create(&mut tx, "", fields("did:ex:alice")).unwrap_err();
        assert!(matches!(err, PassportError::Malformed(_)));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_update_records_previous_owner() {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(t(1));
        contract.create(&mut tx, "DPP-1", fields("did:ex:alice")).unwrap();
        tx.commit();

        let mut tx = ledger.begin(t(2));
        let updated = contract
            .update(&mut tx, "DPP-1", fields("did:ex:carol").with_status("recalled"))
            .unwrap();
        tx.commit();

        assert_eq!(updated.owner_did, "did:ex:carol");
        assert_eq!(updated.status, "recalled");
        assert_eq!(updated.audit_log[1].action, AuditAction::Update);
        assert_eq!(updated.audit_log[1].signed_by, "did:ex:alice");
        assert_eq!(updated.updated_at, t(2));
    }

    #[test]
    fn test_delete_removes_record() {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(t(1));
        contract.create(&mut tx, "DPP-1", fields("did:ex:alice")).unwrap();
        tx.commit();

        let mut tx = ledger.begin(t(2));
        contract.delete(&mut tx, "DPP-1").unwrap();
        tx.commit();

        let tx = ledger.begin(t(3));
        assert!(!contract.exists(&tx, "DPP-1").unwrap());
        assert!(matches!(
            contract.read(&tx, "DPP-1"),
            Err(PassportError::NotFound(_))
        ));
    }

    #[test]
    fn test_signed_only_policy_refuses_unsigned_calls() {
        let contract = DppContract::new(ContractPolicy::signed_only());
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(t(1));

        for result in [
            contract.create(&mut tx, "DPP-1", fields("did:ex:alice")).map(|_| ()),
            contract.update(&mut tx, "DPP-1", fields("did:ex:alice")).map(|_| ()),
            contract.transfer(&mut tx, "DPP-1", "did:ex:bob").map(|_| ()),
            contract.delete(&mut tx, "DPP-1"),
        ] {
            assert!(matches!(result, Err(PassportError::Unauthorized(_))));
        }
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_signed_create_records_presented_key() {
        let contract = DppContract::new(ContractPolicy::signed_only());
        let mut ledger = MemoryLedger::new();
        let kp = KeyPair::generate();
        let envelope = kp.sign("create DPP-1");

        let mut tx = ledger.begin(t(1));
        let dpp = contract
            .create_with_signature(&mut tx, "DPP-1", fields(&kp.public_key_base64()), &envelope)
            .unwrap();

        assert_eq!(dpp.audit_log[0].signed_by, kp.public_key_base64());
        assert_eq!(tx.pending_writes(), 1);
    }

    #[test]
    fn test_signed_update_requires_owner() {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();
        let owner = KeyPair::generate();
        let intruder = KeyPair::generate();

        let mut tx = ledger.begin(t(1));
        contract
            .create(&mut tx, "DPP-1", fields(&owner.public_key_base64()))
            .unwrap();
        tx.commit();

        let mut tx = ledger.begin(t(2));
        let err = contract
            .update_with_signature(
                &mut tx,
                "DPP-1",
                fields(&intruder.public_key_base64()),
                &intruder.sign("update DPP-1"),
            )
            .unwrap_err();
        assert!(matches!(err, PassportError::Unauthorized(_)));
        assert_eq!(tx.pending_writes(), 0);

        let updated = contract
            .update_with_signature(
                &mut tx,
                "DPP-1",
                fields(&owner.public_key_base64()).with_status("repaired"),
                &owner.sign("update DPP-1"),
            )
            .unwrap();
        assert_eq!(updated.status, "repaired");
        assert_eq!(updated.audit_log.len(), 2);
    }
}
