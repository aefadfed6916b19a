//! Candidate: a participant seeking exactly one placement.
//!
//! ## Options Queue
//!
//! Each candidate starts with an *options* queue initialized as a copy of
//! its preference list. Entries are consumed from the front and permanently
//! removed when a pairing is rejected (`discount`). The queue never regrows
//! and never reorders, which is what bounds the engine's total work.
//!
//! ## No-op Failures vs Errors
//!
//! `place`/`displace` return `false` for a legitimate no-op (already placed;
//! displacing a provider that is not the current placement). `discount`
//! against an absent provider is a contract violation and returns a typed
//! error instead.

use std::collections::{HashMap, VecDeque};

use crate::types::{MatchError, Participant};

/// A single-slot seeker holding an ordered preference list over providers.
///
/// Invariant: a candidate has at most one placement at any time.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Sequence number unique among candidates in a run
    id: u64,

    /// Human-readable identifier
    name: String,

    /// Provider roster keys, most preferred first
    preferences: Vec<usize>,

    /// Provider key -> rank index, for O(1) acceptability checks
    ranks: HashMap<usize, usize>,

    /// Remaining options, consumed from the front
    options: VecDeque<usize>,

    /// Current placement, if any
    placement: Option<usize>,
}

impl Candidate {
    /// Create a candidate with its preference list fully populated.
    ///
    /// The options queue starts as a copy of the preference list. Preference
    /// entries must be unique; the roster builder enforces that before
    /// construction.
    pub fn new(id: u64, name: impl Into<String>, preferences: Vec<usize>) -> Self {
        let ranks = preferences
            .iter()
            .enumerate()
            .map(|(rank, &key)| (key, rank))
            .collect();
        let options = preferences.iter().copied().collect();

        Self {
            id,
            name: name.into(),
            preferences,
            ranks,
            options,
            placement: None,
        }
    }

    // ========================================================================
    // State Access
    // ========================================================================

    /// Read-only view of the remaining-option queue
    #[inline]
    pub fn options(&self) -> &VecDeque<usize> {
        &self.options
    }

    /// The next provider this candidate would propose to, if any
    #[inline]
    pub fn front_option(&self) -> Option<usize> {
        self.options.front().copied()
    }

    /// Whether any options remain
    #[inline]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// The current placement, or None if unplaced
    #[inline]
    pub fn placement(&self) -> Option<usize> {
        self.placement
    }

    /// Whether the candidate currently holds a placement
    #[inline]
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Assign a provider as this candidate's placement.
    ///
    /// Returns true on success. Returns false (legitimate no-op, not an
    /// error) if the candidate already holds a placement; well-behaved
    /// callers check state first.
    pub fn place(&mut self, provider: usize) -> bool {
        if self.placement.is_some() {
            return false;
        }
        self.placement = Some(provider);
        true
    }

    /// Clear the placement, if `provider` is the current one.
    ///
    /// Returns false (no-op) when `provider` is not the current placement.
    /// A displaced candidate is simply unplaced afterwards.
    pub fn displace(&mut self, provider: usize) -> bool {
        if self.placement != Some(provider) {
            return false;
        }
        self.placement = None;
        true
    }

    /// Permanently remove `provider` from the options queue.
    ///
    /// # Errors
    ///
    /// `MatchError::NotInOptions` if the provider is not among the
    /// remaining options.
    pub fn discount(&mut self, provider: usize) -> Result<(), MatchError> {
        let position = self
            .options
            .iter()
            .position(|&key| key == provider)
            .ok_or(MatchError::NotInOptions)?;
        self.options.remove(position);
        Ok(())
    }
}

impl Participant for Candidate {
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
