//! Run receipt summarizing a completed matching run.
//!
//! The receipt carries the run's work counters and a 32-byte state root:
//! a SHA-256 hash over the terminal assignment, encoded as fixed-size
//! placement records. Two runs from identical fresh input produce identical
//! state roots, which is how the idempotent-re-run property is checked.
//!
//! ## Record Layout
//!
//! [`PlacementRecord`] serializes as a fixed-size SSZ container of
//! concatenated little-endian fields: 8 + 8 + 1 = 17 bytes.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::PlacementStatus;

// ============================================================================
// PlacementRecord struct
// ============================================================================

/// One terminal assignment row: a candidate, the provider holding it, and
/// the entry's status.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct PlacementRecord {
    /// Candidate sequence number
    pub candidate_id: u64,

    /// Provider sequence number
    pub provider_id: u64,

    /// Placement status as u8 (0=Tentative, 1=Final)
    pub status_raw: u8,
}

impl PlacementRecord {
    /// Serialized size of one record in bytes
    pub const ENCODED_LEN: usize = 17;

    /// Create a record for a terminal placement
    pub fn new(candidate_id: u64, provider_id: u64, status: PlacementStatus) -> Self {
        Self {
            candidate_id,
            provider_id,
            status_raw: status.to_u8(),
        }
    }

    /// Get the placement status
    pub fn status(&self) -> PlacementStatus {
        PlacementStatus::from_u8(self.status_raw).unwrap_or(PlacementStatus::Tentative)
    }

    /// Infallible fixed-layout encoding, byte-identical to the SSZ
    /// serialization of this record.
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        buf[..8].copy_from_slice(&self.candidate_id.to_le_bytes());
        buf[8..16].copy_from_slice(&self.provider_id.to_le_bytes());
        buf[16] = self.status_raw;
        buf
    }
}

// ============================================================================
// RunReceipt struct
// ============================================================================

/// Summary of a completed matching run.
///
/// Work counters follow the termination argument: total work is bounded by
/// the sum of all candidates' original preference-list lengths.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RunReceipt {
    /// Times a candidate was dequeued from the pending queue
    /// (re-entries after eviction included)
    pub candidates_processed: u64,

    /// Pairings examined by qualification
    pub proposals_considered: u64,

    /// Evictions performed to free a slot for a more-preferred candidate
    pub evictions: u64,

    /// Candidates holding a placement at termination
    pub placed: u64,

    /// Candidates who exhausted their options without a placement
    pub unplaced: u64,

    /// SHA-256 over the terminal assignment records (sorted by candidate id)
    pub state_root: [u8; 32],
}

impl RunReceipt {
    /// Create a receipt from raw counters and a precomputed state root
    pub fn new(
        candidates_processed: u64,
        proposals_considered: u64,
        evictions: u64,
        placed: u64,
        unplaced: u64,
        state_root: [u8; 32],
    ) -> Self {
        Self {
            candidates_processed,
            proposals_considered,
            evictions,
            placed,
            unplaced,
            state_root,
        }
    }

    /// Create a receipt with the state root computed from terminal records.
    ///
    /// The caller supplies records sorted by candidate id so the digest is
    /// independent of registry iteration order.
    pub fn with_computed_root(
        candidates_processed: u64,
        proposals_considered: u64,
        evictions: u64,
        unplaced: u64,
        records: &[PlacementRecord],
    ) -> Self {
        let state_root = Self::compute_root(records);
        Self::new(
            candidates_processed,
            proposals_considered,
            evictions,
            records.len() as u64,
            unplaced,
            state_root,
        )
    }

    /// Compute the SHA-256 state root over a record sequence
    pub fn compute_root(records: &[PlacementRecord]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for record in records {
            hasher.update(record.encode());
        }
        let result = hasher.finalize();

        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Check if this receipt represents an empty run (no candidates)
    pub fn is_empty(&self) -> bool {
        self.candidates_processed == 0
    }

    /// Fraction of candidates placed at termination.
    ///
    /// Returns None when the run had no candidates.
    pub fn placement_rate(&self) -> Option<f64> {
        let total = self.placed + self.unplaced;
        if total == 0 {
            None
        } else {
            Some(self.placed as f64 / total as f64)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new() {
        let record = PlacementRecord::new(3, 7, PlacementStatus::Final);

        assert_eq!(record.candidate_id, 3);
        assert_eq!(record.provider_id, 7);
        assert_eq!(record.status(), PlacementStatus::Final);
    }

    #[test]
    fn test_record_encode_layout() {
        let record = PlacementRecord::new(1, 2, PlacementStatus::Tentative);
        let bytes = record.encode();

        assert_eq!(bytes.len(), PlacementRecord::ENCODED_LEN);
        assert_eq!(&bytes[..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &2u64.to_le_bytes());
        assert_eq!(bytes[16], 0);
    }

    #[test]
    fn test_record_encode_matches_ssz() {
        let record = PlacementRecord::new(42, 9, PlacementStatus::Final);

        let serialized = ssz_rs::serialize(&record).expect("Failed to serialize");
        assert_eq!(serialized, record.encode().to_vec());
    }

    #[test]
    fn test_record_ssz_roundtrip() {
        let record = PlacementRecord::new(5, 2, PlacementStatus::Tentative);

        let serialized = ssz_rs::serialize(&record).expect("Failed to serialize");
        let deserialized: PlacementRecord =
            ssz_rs::deserialize(&serialized).expect("Failed to deserialize");

        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_receipt_compute_root_determinism() {
        let records = vec![
            PlacementRecord::new(1, 2, PlacementStatus::Tentative),
            PlacementRecord::new(2, 2, PlacementStatus::Final),
        ];

        let root1 = RunReceipt::compute_root(&records);
        let root2 = RunReceipt::compute_root(&records);
        assert_eq!(root1, root2);

        // Order matters: the caller sorts before hashing
        let reversed: Vec<PlacementRecord> = records.iter().rev().cloned().collect();
        assert_ne!(root1, RunReceipt::compute_root(&reversed));
    }

    #[test]
    fn test_receipt_with_computed_root() {
        let records = vec![PlacementRecord::new(1, 1, PlacementStatus::Final)];
        let receipt = RunReceipt::with_computed_root(3, 5, 1, 2, &records);

        assert_eq!(receipt.candidates_processed, 3);
        assert_eq!(receipt.proposals_considered, 5);
        assert_eq!(receipt.evictions, 1);
        assert_eq!(receipt.placed, 1);
        assert_eq!(receipt.unplaced, 2);
        assert_eq!(receipt.state_root, RunReceipt::compute_root(&records));
    }

    #[test]
    fn test_receipt_state_root_hex() {
        let receipt = RunReceipt::new(0, 0, 0, 0, 0, [0xAB; 32]);

        let hex = receipt.state_root_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_receipt_is_empty() {
        assert!(RunReceipt::default().is_empty());
        assert!(!RunReceipt::new(1, 0, 0, 0, 1, [0u8; 32]).is_empty());
    }

    #[test]
    fn test_receipt_placement_rate() {
        let receipt = RunReceipt::new(5, 9, 1, 4, 1, [0u8; 32]);
        assert_eq!(receipt.placement_rate(), Some(0.8));

        assert_eq!(RunReceipt::default().placement_rate(), None);
    }

    #[test]
    fn test_receipt_ssz_roundtrip() {
        let receipt = RunReceipt::new(6, 14, 1, 4, 1, [0xCD; 32]);

        let serialized = ssz_rs::serialize(&receipt).expect("Failed to serialize");
        let deserialized: RunReceipt =
            ssz_rs::deserialize(&serialized).expect("Failed to deserialize");

        assert_eq!(receipt, deserialized);
    }

    #[test]
    fn test_receipt_ssz_size() {
        let receipt = RunReceipt::default();
        let bytes = ssz_rs::serialize(&receipt).expect("Failed to serialize");

        // 5 u64 counters + 32-byte root = 72 bytes
        assert_eq!(bytes.len(), 72, "RunReceipt should serialize to 72 bytes");
    }
}
