//! Deferred-acceptance matching engine.
//!
//! ## Loop Discipline
//!
//! The engine drives candidates through their preference lists until a
//! fixed point:
//!
//! 1. Dequeue the front pending candidate.
//! 2. Qualify it against the front of its options queue.
//! 3. Rejected: discount the provider (irreversible) and retry with the
//!    next option. Accepted: place at the qualified status and stop
//!    processing the candidate this round.
//! 4. An eviction appends the displaced candidate to the pending tail; on
//!    its next turn it resumes from its next remaining option.
//!
//! The pending queue's FIFO discipline and the front-of-options consumption
//! order are part of the observable contract, not implementation details:
//! changing either changes which stable matching is produced.
//!
//! ## Termination
//!
//! Every iteration either permanently shrinks a candidate's finite options
//! queue or produces a placement that removes the candidate from active
//! processing, so total work is bounded by the sum of all original
//! preference-list lengths.

use std::collections::{HashMap, VecDeque};

use slab::Slab;
use tracing::debug;

use crate::types::{
    Candidate, MatchError, MatchOutcome, Participant, PlacementRecord, PlacementStatus, Provider,
    RunReceipt,
};

/// The deferred-acceptance engine: owns both rosters, the pending queue,
/// and the run statistics.
///
/// ## Example
///
/// ```
/// use placematch::{PlacementStatus, RosterBuilder};
///
/// let mut engine = RosterBuilder::new()
///     .provider("City", 1, &["Ada", "Ben"])
///     .candidate("Ada", &["City"])
///     .candidate("Ben", &["City"])
///     .build()
///     .unwrap();
///
/// let receipt = engine.run().unwrap();
///
/// // Ada is City's top choice: placed final. Ben is squeezed out.
/// assert_eq!(receipt.placed, 1);
/// assert_eq!(receipt.unplaced, 1);
/// let ada = engine.lookup_candidate("Ada").unwrap();
/// let city = engine.lookup_provider("City").unwrap();
/// assert_eq!(engine.candidate(ada).unwrap().placement(), Some(city));
/// assert_eq!(
///     engine.provider(city).unwrap().status_of(ada),
///     Some(PlacementStatus::Final)
/// );
/// ```
#[derive(Debug)]
pub struct MatchingEngine {
    /// Candidate roster; slab keys are the cross-reference currency
    candidates: Slab<Candidate>,

    /// Provider roster
    providers: Slab<Provider>,

    /// Candidate name -> roster key
    candidate_names: HashMap<String, usize>,

    /// Provider name -> roster key
    provider_names: HashMap<String, usize>,

    /// Not-yet-finally-resolved candidates, FIFO
    pending: VecDeque<usize>,

    /// Times a candidate was dequeued (re-entries included)
    candidates_processed: u64,

    /// Pairings examined by qualification
    proposals_considered: u64,

    /// Evictions performed
    evictions: u64,
}

impl MatchingEngine {
    /// Assemble an engine from fully wired rosters.
    ///
    /// The pending queue is seeded with every candidate in roster order.
    pub(crate) fn from_rosters(
        candidates: Slab<Candidate>,
        providers: Slab<Provider>,
        candidate_names: HashMap<String, usize>,
        provider_names: HashMap<String, usize>,
    ) -> Self {
        let pending = candidates.iter().map(|(key, _)| key).collect();
        Self {
            candidates,
            providers,
            candidate_names,
            provider_names,
            pending,
            candidates_processed: 0,
            proposals_considered: 0,
            evictions: 0,
        }
    }

    // ========================================================================
    // Roster Access
    // ========================================================================

    /// Number of candidates in the roster
    #[inline]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Number of providers in the roster
    #[inline]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Get a candidate by roster key
    #[inline]
    pub fn candidate(&self, key: usize) -> Option<&Candidate> {
        self.candidates.get(key)
    }

    /// Get a provider by roster key
    #[inline]
    pub fn provider(&self, key: usize) -> Option<&Provider> {
        self.providers.get(key)
    }

    /// Resolve a candidate name to its roster key
    #[inline]
    pub fn lookup_candidate(&self, name: &str) -> Option<usize> {
        self.candidate_names.get(name).copied()
    }

    /// Resolve a provider name to its roster key
    #[inline]
    pub fn lookup_provider(&self, name: &str) -> Option<usize> {
        self.provider_names.get(name).copied()
    }

    /// Iterate candidates in roster-key order
    pub fn candidates(&self) -> impl Iterator<Item = (usize, &Candidate)> {
        self.candidates.iter()
    }

    /// Iterate providers in roster-key order
    pub fn providers(&self) -> impl Iterator<Item = (usize, &Provider)> {
        self.providers.iter()
    }

    /// Whether the pending queue has drained
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.pending.is_empty()
    }

    fn candidate_ref(&self, key: usize) -> Result<&Candidate, MatchError> {
        self.candidates
            .get(key)
            .ok_or(MatchError::PreconditionViolation("candidate key not in roster"))
    }

    fn candidate_mut(&mut self, key: usize) -> Result<&mut Candidate, MatchError> {
        self.candidates
            .get_mut(key)
            .ok_or(MatchError::PreconditionViolation("candidate key not in roster"))
    }

    fn provider_ref(&self, key: usize) -> Result<&Provider, MatchError> {
        self.providers
            .get(key)
            .ok_or(MatchError::PreconditionViolation("provider key not in roster"))
    }

    fn provider_mut(&mut self, key: usize) -> Result<&mut Provider, MatchError> {
        self.providers
            .get_mut(key)
            .ok_or(MatchError::PreconditionViolation("provider key not in roster"))
    }

    // ========================================================================
    // Qualification
    // ========================================================================

    /// Mutual acceptability: each side appears in the other's preference
    /// list.
    pub fn preference_match(
        &self,
        candidate_key: usize,
        provider_key: usize,
    ) -> Result<bool, MatchError> {
        let candidate = self.candidate_ref(candidate_key)?;
        let provider = self.provider_ref(provider_key)?;
        Ok(candidate.accepts(provider_key) && provider.accepts(candidate_key))
    }

    /// Decide whether a proposed pairing is admissible and at which status.
    ///
    /// Rule order is significant:
    /// 1. not mutually acceptable -> Rejected
    /// 2. provider registry frozen (`is_final`) -> Rejected
    /// 3. provider full and does not prefer the candidate -> Rejected
    /// 4. candidate is the provider's highest-ranking candidate -> Final
    /// 5. otherwise -> Tentative
    pub fn qualify_match(
        &self,
        candidate_key: usize,
        provider_key: usize,
    ) -> Result<MatchOutcome, MatchError> {
        if !self.preference_match(candidate_key, provider_key)? {
            return Ok(MatchOutcome::Rejected);
        }

        let provider = self.provider_ref(provider_key)?;
        if provider.is_final() {
            return Ok(MatchOutcome::Rejected);
        }
        // is_full without is_final guarantees a tentative entry exists,
        // so `prefers` cannot hit its empty-registry precondition here
        if provider.is_full() && !provider.prefers(candidate_key)? {
            return Ok(MatchOutcome::Rejected);
        }

        if provider.highest_ranking_candidate()? == candidate_key {
            return Ok(MatchOutcome::Final);
        }
        Ok(MatchOutcome::Tentative)
    }

    // ========================================================================
    // Placement Transitions
    // ========================================================================

    /// Place a qualified pairing, evicting the provider's lowest-ranked
    /// tentative placement first when a slot must be freed.
    ///
    /// # Errors
    ///
    /// `InvalidPreferenceState` when the pairing is not mutually acceptable
    /// (qualification is checked, not assumed); `PreconditionViolation` when
    /// the candidate already holds a placement.
    pub fn match_pair(
        &mut self,
        candidate_key: usize,
        provider_key: usize,
        status: PlacementStatus,
    ) -> Result<(), MatchError> {
        if !self.preference_match(candidate_key, provider_key)? {
            return Err(MatchError::InvalidPreferenceState(
                "pairing is not mutually acceptable",
            ));
        }

        let eviction = {
            let provider = self.provider_ref(provider_key)?;
            if provider.is_full() && !provider.is_final() && provider.prefers(candidate_key)? {
                Some(provider.lowest_ranked_placement()?)
            } else {
                None
            }
        };
        if let Some(evicted_key) = eviction {
            self.unmatch(evicted_key, provider_key)?;
            self.evictions += 1;
            let evicted_name = self.candidate_ref(evicted_key)?.name();
            let provider_name = self.provider_ref(provider_key)?.name();
            debug!(
                evicted = evicted_name,
                provider = provider_name,
                "evicted lowest-ranked tentative placement"
            );
        }

        if !self.candidate_mut(candidate_key)?.place(provider_key) {
            return Err(MatchError::PreconditionViolation(
                "candidate already holds a placement",
            ));
        }
        self.provider_mut(provider_key)?.place(candidate_key, status);

        let candidate_name = self.candidate_ref(candidate_key)?.name();
        let provider_name = self.provider_ref(provider_key)?.name();
        debug!(
            candidate = candidate_name,
            provider = provider_name,
            status = ?status,
            "placed"
        );
        Ok(())
    }

    /// Dissolve an existing pairing and append the candidate to the pending
    /// tail so it resumes from its next remaining option.
    ///
    /// # Errors
    ///
    /// `NotPlaced` when the pairing does not currently exist.
    pub fn unmatch(&mut self, candidate_key: usize, provider_key: usize) -> Result<(), MatchError> {
        self.candidate_ref(candidate_key)?;
        self.provider_ref(provider_key)?;

        self.pending.push_back(candidate_key);
        if !self.candidate_mut(candidate_key)?.displace(provider_key) {
            return Err(MatchError::NotPlaced);
        }
        self.provider_mut(provider_key)?.displace(candidate_key)?;
        Ok(())
    }

    // ========================================================================
    // Main Loop
    // ========================================================================

    /// Run deferred acceptance to its fixed point.
    ///
    /// Executes to completion; termination is guaranteed because every
    /// iteration either discounts an option (irreversible) or places the
    /// candidate. A candidate that exhausts its options simply remains
    /// permanently unplaced.
    pub fn run(&mut self) -> Result<RunReceipt, MatchError> {
        while let Some(candidate_key) = self.pending.pop_front() {
            self.candidates_processed += 1;
            self.process_candidate(candidate_key)?;
        }
        Ok(self.receipt())
    }

    /// Propose the candidate down its remaining options until placed or
    /// exhausted.
    fn process_candidate(&mut self, candidate_key: usize) -> Result<(), MatchError> {
        loop {
            let front = self.candidate_ref(candidate_key)?.front_option();
            let Some(provider_key) = front else {
                let candidate_name = self.candidate_ref(candidate_key)?.name();
                debug!(candidate = candidate_name, "options exhausted; permanently unplaced");
                return Ok(());
            };

            self.proposals_considered += 1;
            let outcome = self.qualify_match(candidate_key, provider_key)?;
            match outcome.status() {
                None => {
                    let candidate_name = self.candidate_ref(candidate_key)?.name();
                    let provider_name = self.provider_ref(provider_key)?.name();
                    debug!(
                        candidate = candidate_name,
                        provider = provider_name,
                        "rejected; discounting"
                    );
                    self.candidate_mut(candidate_key)?.discount(provider_key)?;
                }
                Some(status) => {
                    self.match_pair(candidate_key, provider_key, status)?;
                    return Ok(());
                }
            }
        }
    }

    // ========================================================================
    // Terminal Queries
    // ========================================================================

    /// Terminal assignment rows, sorted by candidate id.
    pub fn placement_records(&self) -> Vec<PlacementRecord> {
        let mut records = Vec::new();
        for (candidate_key, candidate) in &self.candidates {
            let Some(provider_key) = candidate.placement() else {
                continue;
            };
            let Some(provider) = self.providers.get(provider_key) else {
                continue;
            };
            if let Some(status) = provider.status_of(candidate_key) {
                records.push(PlacementRecord::new(candidate.id(), provider.id(), status));
            }
        }
        // Slab iteration is key-ordered and ids are assigned in key order,
        // so the records are already sorted by candidate id
        records
    }

    /// Roster keys of candidates without a placement
    pub fn unplaced_candidates(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .filter(|(_, candidate)| !candidate.is_placed())
            .map(|(key, _)| key)
            .collect()
    }

    /// Receipt over the current state: work counters plus the SHA-256
    /// state root of the terminal assignment.
    pub fn receipt(&self) -> RunReceipt {
        let records = self.placement_records();
        let unplaced = self.unplaced_candidates().len() as u64;
        RunReceipt::with_computed_root(
            self.candidates_processed,
            self.proposals_considered,
            self.evictions,
            unplaced,
            &records,
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RosterBuilder;

    /// Two candidates, one single-slot provider preferring Ben.
    fn two_for_one() -> MatchingEngine {
        RosterBuilder::new()
            .candidate("Ada", &["City"])
            .candidate("Ben", &["City"])
            .provider("City", 1, &["Ben", "Ada"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_qualify_not_mutual() {
        let engine = RosterBuilder::new()
            .candidate("Ada", &["City"])
            .candidate("Ben", &[])
            .provider("City", 1, &["Ben"])
            .build()
            .unwrap();

        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        // Ada lists City but City does not list Ada; Ben is listed by City
        // but lists nobody
        assert_eq!(
            engine.qualify_match(ada, city),
            Ok(MatchOutcome::Rejected)
        );
        assert_eq!(
            engine.qualify_match(ben, city),
            Ok(MatchOutcome::Rejected)
        );
    }

    #[test]
    fn test_qualify_final_for_top_candidate() {
        let engine = two_for_one();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        assert_eq!(engine.qualify_match(ben, city), Ok(MatchOutcome::Final));
    }

    #[test]
    fn test_qualify_tentative_for_lower_candidate() {
        let engine = two_for_one();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        assert_eq!(engine.qualify_match(ada, city), Ok(MatchOutcome::Tentative));
    }

    #[test]
    fn test_qualify_rejects_frozen_registry() {
        let mut engine = two_for_one();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        engine.match_pair(ben, city, PlacementStatus::Final).unwrap();

        assert!(engine.provider(city).unwrap().is_final());
        assert_eq!(engine.qualify_match(ada, city), Ok(MatchOutcome::Rejected));
    }

    #[test]
    fn test_qualify_full_not_preferred() {
        let mut engine = two_for_one();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        // Ben holds the only slot tentatively; Ada ranks below Ben
        engine
            .match_pair(ben, city, PlacementStatus::Tentative)
            .unwrap();
        assert_eq!(engine.qualify_match(ada, city), Ok(MatchOutcome::Rejected));
    }

    #[test]
    fn test_match_pair_evicts_lowest() {
        let mut engine = two_for_one();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        engine
            .match_pair(ada, city, PlacementStatus::Tentative)
            .unwrap();
        engine.match_pair(ben, city, PlacementStatus::Final).unwrap();

        // Ada was evicted and requeued at the pending tail
        assert_eq!(engine.candidate(ada).unwrap().placement(), None);
        assert_eq!(engine.candidate(ben).unwrap().placement(), Some(city));
        assert_eq!(engine.pending.back(), Some(&ada));
        assert_eq!(engine.provider(city).unwrap().placements().len(), 1);
    }

    #[test]
    fn test_match_pair_rejects_non_mutual() {
        let mut engine = RosterBuilder::new()
            .candidate("Ada", &["City"])
            .provider("City", 1, &[])
            .build()
            .unwrap();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        assert_eq!(
            engine.match_pair(ada, city, PlacementStatus::Tentative),
            Err(MatchError::InvalidPreferenceState(
                "pairing is not mutually acceptable"
            ))
        );
    }

    #[test]
    fn test_match_pair_rejects_double_placement() {
        let mut engine = RosterBuilder::new()
            .candidate("Ada", &["City", "Mercy"])
            .provider("City", 1, &["Ada"])
            .provider("Mercy", 1, &["Ada"])
            .build()
            .unwrap();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let city = engine.lookup_provider("City").unwrap();
        let mercy = engine.lookup_provider("Mercy").unwrap();

        engine.match_pair(ada, city, PlacementStatus::Final).unwrap();
        assert_eq!(
            engine.match_pair(ada, mercy, PlacementStatus::Tentative),
            Err(MatchError::PreconditionViolation(
                "candidate already holds a placement"
            ))
        );
    }

    #[test]
    fn test_unmatch_requires_existing_pairing() {
        let mut engine = two_for_one();
        let ada = engine.lookup_candidate("Ada").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        assert_eq!(engine.unmatch(ada, city), Err(MatchError::NotPlaced));
    }

    #[test]
    fn test_run_two_for_one() {
        let mut engine = two_for_one();
        let receipt = engine.run().unwrap();

        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        // Ada proposes first and holds tentatively; Ben is City's top
        // choice and displaces Ada, who has no options left
        assert_eq!(engine.candidate(ben).unwrap().placement(), Some(city));
        assert_eq!(
            engine.provider(city).unwrap().status_of(ben),
            Some(PlacementStatus::Final)
        );
        assert_eq!(engine.candidate(ada).unwrap().placement(), None);

        assert!(engine.is_terminal());
        assert_eq!(receipt.placed, 1);
        assert_eq!(receipt.unplaced, 1);
        assert_eq!(receipt.evictions, 1);
        // Ada dequeued twice (initial + requeue), Ben once
        assert_eq!(receipt.candidates_processed, 3);
    }

    #[test]
    fn test_run_empty_roster() {
        let mut engine = RosterBuilder::new().build().unwrap();
        let receipt = engine.run().unwrap();

        assert!(receipt.is_empty());
        assert_eq!(receipt.placed, 0);
    }

    #[test]
    fn test_placement_records_sorted() {
        let mut engine = RosterBuilder::new()
            .candidate("Ada", &["City"])
            .candidate("Ben", &["City"])
            .provider("City", 2, &["Ada", "Ben"])
            .build()
            .unwrap();
        engine.run().unwrap();

        let records = engine.placement_records();
        assert_eq!(records.len(), 2);
        assert!(records[0].candidate_id < records[1].candidate_id);
    }
}
