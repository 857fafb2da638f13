//! Property-based tests for the passport invariants
//!
//! 1. SIGNATURES: only the exact (message, signature, key) triple verifies
//! 2. HISTORY: each committed mutation adds one audit entry, never rewrites
//! 3. QUERY: owner listing returns exactly the owner's records
//! 4. ATOMICITY: failed calls leave world state untouched

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use passport_core::audit::is_append_of;
use passport_core::crypto::verify_signature;
use passport_core::{DppContract, DppFields, KeyPair, MemoryLedger, PassportError};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn flip_bit(b64: &str, index: usize) -> String {
    let mut bytes = STANDARD.decode(b64).unwrap();
    let bit = index % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
    STANDARD.encode(bytes)
}

// =============================================================================
// SIGNATURES
// =============================================================================

proptest! {
    /// Any message signed by a key verifies under that key
    #[test]
    fn prop_sign_then_verify(seed in any::<[u8; 32]>(), message in ".{0,64}") {
        let kp = KeyPair::from_seed(&seed);
        let envelope = kp.sign(message.clone());

        prop_assert!(envelope.verify().is_ok());
        prop_assert_eq!(envelope.original_message, message);
    }

    /// Changing the message breaks the signature
    #[test]
    fn prop_altered_message_fails(
        seed in any::<[u8; 32]>(),
        message in "[a-z ]{1,40}",
        suffix in "[A-Z0-9]{1,8}",
    ) {
        let kp = KeyPair::from_seed(&seed);
        let envelope = kp.sign(message.clone());
        let altered = format!("{}{}", message, suffix);

        prop_assert!(verify_signature(
            altered.as_bytes(),
            &envelope.signed_base64,
            &envelope.public_key_base64
        )
        .is_err());
    }

    /// Flipping any signature bit breaks verification
    #[test]
    fn prop_signature_bit_flip_fails(
        seed in any::<[u8; 32]>(),
        message in ".{0,32}",
        bit in 0usize..512,
    ) {
        let kp = KeyPair::from_seed(&seed);
        let envelope = kp.sign(message.clone());
        let tampered = flip_bit(&envelope.signed_base64, bit);

        prop_assert!(verify_signature(
            message.as_bytes(),
            &tampered,
            &envelope.public_key_base64
        )
        .is_err());
    }

    /// A different key never verifies another key's signature
    #[test]
    fn prop_foreign_key_fails(
        seed in any::<[u8; 32]>(),
        other in any::<[u8; 32]>(),
        message in ".{0,32}",
    ) {
        prop_assume!(seed != other);
        let signer = KeyPair::from_seed(&seed);
        let stranger = KeyPair::from_seed(&other);
        let envelope = signer.sign(message.clone());

        prop_assert!(verify_signature(
            message.as_bytes(),
            &envelope.signed_base64,
            &stranger.public_key_base64()
        )
        .is_err());
    }
}

// =============================================================================
// HISTORY
// =============================================================================

proptest! {
    /// One CREATE plus N transfers leaves N+1 entries, each a strict extension
    #[test]
    fn prop_audit_grows_by_one_per_mutation(owners in prop::collection::vec("did:ex:[a-z]{3,8}", 1..12)) {
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(epoch());
        let mut current = contract.create(&mut tx, "DPP-1", DppFields::new("did:ex:origin")).unwrap();
        tx.commit();

        for (i, owner) in owners.iter().enumerate() {
            let at = epoch() + Duration::minutes(i as i64 + 1);
            let mut tx = ledger.begin(at);
            let next = contract.transfer(&mut tx, "DPP-1", owner).unwrap();
            tx.commit();

            prop_assert!(is_append_of(&current.audit_log, &next.audit_log));
            prop_assert_eq!(next.audit_log.len(), current.audit_log.len() + 1);
            prop_assert_eq!(next.updated_at, at);
            current = next;
        }

        prop_assert_eq!(current.audit_log.len(), owners.len() + 1);
        prop_assert_eq!(&current.owner_did, owners.last().unwrap());
    }
}

// =============================================================================
// QUERY
// =============================================================================

proptest! {
    /// Owner listing is exact: all of theirs, nothing else
    #[test]
    fn prop_list_by_owner_is_exact(assignment in prop::collection::vec(0usize..4, 0..20)) {
        let owners = ["did:ex:a", "did:ex:b", "did:ex:c", "did:ex:a2"];
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(epoch());
        for (i, owner) in assignment.iter().enumerate() {
            contract
                .create(&mut tx, &format!("DPP-{:03}", i), DppFields::new(owners[*owner]))
                .unwrap();
        }
        tx.commit();

        let tx = ledger.begin(epoch());
        prop_assert_eq!(contract.list_all(&tx).unwrap().len(), assignment.len());

        for (index, owner) in owners.iter().enumerate() {
            let listed = contract.list_by_owner(&tx, owner).unwrap();
            let expected = assignment.iter().filter(|o| **o == index).count();
            prop_assert_eq!(listed.len(), expected);
            prop_assert!(listed.iter().all(|d| d.owner_did == *owner));
        }
    }
}

// =============================================================================
// ATOMICITY
// =============================================================================

proptest! {
    /// A non-owner's signed transfer writes nothing, whatever they sign
    #[test]
    fn prop_non_owner_transfer_leaves_bytes(
        owner_seed in any::<[u8; 32]>(),
        intruder_seed in any::<[u8; 32]>(),
        message in ".{0,32}",
    ) {
        prop_assume!(owner_seed != intruder_seed);
        let owner = KeyPair::from_seed(&owner_seed);
        let intruder = KeyPair::from_seed(&intruder_seed);
        let contract = DppContract::default();
        let mut ledger = MemoryLedger::new();

        let mut tx = ledger.begin(epoch());
        contract.create(&mut tx, "DPP-1", DppFields::new(owner.public_key_base64())).unwrap();
        tx.commit();
        let before = ledger.get("DPP-1").unwrap().to_vec();

        let mut tx = ledger.begin(epoch());
        let result = contract.transfer_with_signature(
            &mut tx,
            "DPP-1",
            &intruder.public_key_base64(),
            &intruder.sign(message),
        );
        let is_unauthorized = matches!(result, Err(PassportError::Unauthorized(_)));
        prop_assert!(is_unauthorized);
        prop_assert_eq!(tx.commit(), 0);
        prop_assert_eq!(ledger.get("DPP-1").unwrap(), before.as_slice());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_bit_changes_one_bit() {
        let original = STANDARD.encode([0u8; 4]);
        let flipped = STANDARD.decode(flip_bit(&original, 9)).unwrap();
        assert_eq!(flipped, vec![0, 2, 0, 0]);
    }

    #[test]
    fn test_public_key_bit_flip_fails() {
        let kp = KeyPair::from_seed(&[7u8; 32]);
        let envelope = kp.sign("hello");
        let tampered_key = flip_bit(&envelope.public_key_base64, 3);

        assert!(verify_signature(b"hello", &envelope.signed_base64, &tampered_key).is_err());
    }
}
