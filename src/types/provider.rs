//! Provider: a participant offering multiple ranked placements.
//!
//! ## Placement Registry
//!
//! A provider holds a registry mapping candidate keys to a
//! [`PlacementStatus`]; each candidate appears at most once. Two derived
//! properties drive qualification:
//!
//! - `is_full`: registry size has reached capacity
//! - `is_final`: every slot holds a final-status entry; the registry is
//!   frozen and no further place/displace operations against it are legal
//!
//! ## Capacity Discipline
//!
//! `place` does not itself enforce the capacity bound. The engine owns
//! eviction: it must free a slot (via `unmatch`) before placing into a full
//! registry. Zero capacity is legal and means immediately and permanently
//! full.
//!
//! ## Rank Queries
//!
//! `lowest_ranked_placement`, `highest_ranking_candidate` and `prefers`
//! require specific registry contents and fail with a typed
//! `PreconditionViolation` instead of crashing on empty collections.

use std::collections::HashMap;

use crate::types::{MatchError, Participant, PlacementStatus};

/// A multi-slot acceptor holding an ordered preference list over candidates
/// and a placement registry bounded by a fixed capacity.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Sequence number unique among providers in a run
    id: u64,

    /// Human-readable identifier
    name: String,

    /// Candidate roster keys, most preferred first
    preferences: Vec<usize>,

    /// Candidate key -> rank index, for O(1) comparisons
    ranks: HashMap<usize, usize>,

    /// Fixed slot count, set at construction
    capacity: usize,

    /// Candidate key -> placement status; each candidate at most once
    placements: HashMap<usize, PlacementStatus>,

    /// Count of final-status entries, maintained across place/displace
    final_count: usize,
}

impl Provider {
    /// Create a provider with its preference list fully populated.
    ///
    /// Preference entries must be unique; the roster builder enforces that
    /// before construction.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        preferences: Vec<usize>,
        capacity: usize,
    ) -> Self {
        let ranks = preferences
            .iter()
            .enumerate()
            .map(|(rank, &key)| (key, rank))
            .collect();

        Self {
            id,
            name: name.into(),
            preferences,
            ranks,
            capacity,
            placements: HashMap::with_capacity(capacity),
            final_count: 0,
        }
    }

    // ========================================================================
    // Registry Access
    // ========================================================================

    /// Fixed slot count
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The full placement registry (candidate key -> status)
    #[inline]
    pub fn placements(&self) -> &HashMap<usize, PlacementStatus> {
        &self.placements
    }

    /// Registry entries carrying the given status
    pub fn placements_with_status(
        &self,
        status: PlacementStatus,
    ) -> impl Iterator<Item = usize> + '_ {
        self.placements
            .iter()
            .filter(move |(_, &s)| s == status)
            .map(|(&key, _)| key)
    }

    /// Status of a specific candidate's entry, if present
    #[inline]
    pub fn status_of(&self, candidate: usize) -> Option<PlacementStatus> {
        self.placements.get(&candidate).copied()
    }

    /// Registry size has reached capacity
    #[inline]
    pub fn is_full(&self) -> bool {
        self.placements.len() >= self.capacity
    }

    /// Every slot holds a final entry; the registry is frozen
    #[inline]
    pub fn is_final(&self) -> bool {
        self.final_count >= self.capacity
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert or overwrite the registry entry for `candidate`.
    ///
    /// Does not enforce the capacity bound: the caller must have already
    /// ensured room, via eviction if necessary.
    pub fn place(&mut self, candidate: usize, status: PlacementStatus) {
        if let Some(previous) = self.placements.insert(candidate, status) {
            if previous == PlacementStatus::Final {
                self.final_count -= 1;
            }
        }
        if status == PlacementStatus::Final {
            self.final_count += 1;
        }
    }

    /// Remove the registry entry for `candidate`.
    ///
    /// # Errors
    ///
    /// `MatchError::NotPlaced` if no entry exists.
    pub fn displace(&mut self, candidate: usize) -> Result<(), MatchError> {
        match self.placements.remove(&candidate) {
            Some(PlacementStatus::Final) => {
                self.final_count -= 1;
                Ok(())
            }
            Some(PlacementStatus::Tentative) => Ok(()),
            None => Err(MatchError::NotPlaced),
        }
    }

    // ========================================================================
    // Rank Queries
    // ========================================================================

    /// Rank index of the least-preferred tentative entry.
    fn lowest_tentative_rank(&self) -> Result<usize, MatchError> {
        let mut lowest: Option<usize> = None;
        for (&candidate, &status) in &self.placements {
            if status != PlacementStatus::Tentative {
                continue;
            }
            let rank = self.rank_of(candidate).ok_or(MatchError::InvalidPreferenceState(
                "placed candidate is missing from the provider's preference list",
            ))?;
            lowest = Some(match lowest {
                Some(current) => current.max(rank),
                None => rank,
            });
        }
        lowest.ok_or(MatchError::PreconditionViolation(
            "no tentative placements to rank",
        ))
    }

    /// Among tentative entries only, the candidate whose rank index is
    /// numerically largest (least preferred by this provider).
    ///
    /// # Errors
    ///
    /// `MatchError::PreconditionViolation` if no tentative entries exist.
    pub fn lowest_ranked_placement(&self) -> Result<usize, MatchError> {
        let rank = self.lowest_tentative_rank()?;
        Ok(self.preferences[rank])
    }

    /// First candidate in rank order who does not currently hold a
    /// final-status placement here.
    ///
    /// # Errors
    ///
    /// `MatchError::PreconditionViolation` if the entire preference list is
    /// exhausted. Should not occur under correct invariants, but guarded.
    pub fn highest_ranking_candidate(&self) -> Result<usize, MatchError> {
        self.preferences
            .iter()
            .copied()
            .find(|&candidate| self.status_of(candidate) != Some(PlacementStatus::Final))
            .ok_or(MatchError::PreconditionViolation(
                "preference list exhausted without a non-final candidate",
            ))
    }

    /// Whether `candidate` ranks strictly better (lower index) than the
    /// current lowest-ranked tentative placement.
    ///
    /// # Errors
    ///
    /// Propagates `PreconditionViolation` when no tentative placement exists
    /// to compare against; `InvalidPreferenceState` when `candidate` is not
    /// in the preference list at all.
    pub fn prefers(&self, candidate: usize) -> Result<bool, MatchError> {
        let lowest_rank = self.lowest_tentative_rank()?;
        let candidate_rank = self.rank_of(candidate).ok_or(MatchError::InvalidPreferenceState(
            "candidate is missing from the provider's preference list",
        ))?;
        Ok(candidate_rank < lowest_rank)
    }
}

impl Participant for Provider {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn preferences(&self) -> &[usize] {
        &self.preferences
    }

    fn rank_of(&self, counterpart: usize) -> Option<usize> {
        self.ranks.get(&counterpart).copied()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
