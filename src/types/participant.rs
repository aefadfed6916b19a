//! Shared participant capability.
//!
//! Candidates and providers are two independent concrete types; what they
//! share is an identity plus an ordered preference ranking over the other
//! side. That shared shape is a trait, not a base class.
//!
//! Preference lists hold roster keys (see the engine's `RosterBuilder`),
//! never references to the counterpart objects themselves, so the object
//! graph stays acyclic.

/// Identity plus an ordered preference ranking over counterpart roster keys.
///
/// Position in the preference list determines strict rank: index 0 is the
/// most preferred counterpart, and no ties exist. Duplicate entries are
/// rejected at construction.
pub trait Participant {
    /// Sequence number unique within a run (per side)
    fn id(&self) -> u64;

    /// Human-readable identifier, unique within a run (per side)
    fn name(&self) -> &str;

    /// Counterpart roster keys, most preferred first
    fn preferences(&self) -> &[usize];

    /// Rank index of a counterpart (0 = most preferred), or None if the
    /// counterpart does not appear in the preference list.
    fn rank_of(&self, counterpart: usize) -> Option<usize>;

    /// Whether the counterpart appears anywhere in the preference list.
    ///
    /// Mutual acceptability is `a.accepts(b) && b.accepts(a)`; the engine
    /// exposes that pairwise check since it owns both rosters.
    fn accepts(&self, counterpart: usize) -> bool {
        self.rank_of(counterpart).is_some()
    }
}
