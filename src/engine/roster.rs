//! Roster construction and identifier wiring.
//!
//! Construction input names participants by string identifier; the builder
//! resolves those names into roster keys and hands the engine two fully
//! wired [`Slab`] rosters. Participants never hold references to each
//! other, so the object graph stays acyclic and the engine remains the
//! single owner of all matching state.
//!
//! Unknown identifiers, duplicate identifiers and duplicate preference
//! entries are construction errors: the core treats them as undefined
//! behavior, so the boundary refuses them instead of letting rank maps
//! silently collapse.
//!
//! ## Example
//!
//! ```
//! use placematch::RosterBuilder;
//!
//! let engine = RosterBuilder::new()
//!     .provider("City", 2, &["Ada", "Ben"])
//!     .candidate("Ada", &["City"])
//!     .candidate("Ben", &["City"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(engine.candidate_count(), 2);
//! assert_eq!(engine.provider_count(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use slab::Slab;

use crate::engine::MatchingEngine;
use crate::types::{Candidate, MatchError, Provider};

struct CandidateSpec {
    name: String,
    preferences: Vec<String>,
}

struct ProviderSpec {
    name: String,
    preferences: Vec<String>,
    capacity: usize,
}

/// Builder collecting candidate and provider specifications and wiring
/// them into a ready-to-run [`MatchingEngine`].
///
/// Declaration order is observable: candidates enter the pending queue in
/// the order they were added, and preference lists keep their given order
/// as strict rank.
#[derive(Default)]
pub struct RosterBuilder {
    candidates: Vec<CandidateSpec>,
    providers: Vec<ProviderSpec>,
}

impl RosterBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate with an ordered provider preference list
    /// (most preferred first).
    pub fn candidate(mut self, name: &str, preferences: &[&str]) -> Self {
        self.candidates.push(CandidateSpec {
            name: name.to_string(),
            preferences: preferences.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Add a provider with a fixed capacity and an ordered candidate
    /// preference list (most preferred first). Capacity 0 is legal: the
    /// provider is immediately and permanently full.
    pub fn provider(mut self, name: &str, capacity: usize, preferences: &[&str]) -> Self {
        self.providers.push(ProviderSpec {
            name: name.to_string(),
            preferences: preferences.iter().map(|s| s.to_string()).collect(),
            capacity,
        });
        self
    }

    /// Resolve all identifiers and construct the engine.
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentifier`: two participants on the same side share a name
    /// - `UnknownParticipant`: a preference entry names nobody on the other side
    /// - `DuplicatePreference`: one preference list names a counterpart twice
    pub fn build(self) -> Result<MatchingEngine, MatchError> {
        // Keys are assigned positionally: a fresh slab hands out sequential
        // keys, so the name maps can be built before the slabs are filled.
        let candidate_keys = Self::key_by_name(self.candidates.iter().map(|s| s.name.as_str()))?;
        let provider_keys = Self::key_by_name(self.providers.iter().map(|s| s.name.as_str()))?;

        let mut candidates = Slab::with_capacity(self.candidates.len());
        for (index, spec) in self.candidates.into_iter().enumerate() {
            let preferences = Self::resolve(&spec.name, &spec.preferences, &provider_keys)?;
            let key = candidates.insert(Candidate::new(
                (index + 1) as u64,
                spec.name,
                preferences,
            ));
            debug_assert_eq!(key, index);
        }

        let mut providers = Slab::with_capacity(self.providers.len());
        for (index, spec) in self.providers.into_iter().enumerate() {
            let preferences = Self::resolve(&spec.name, &spec.preferences, &candidate_keys)?;
            let key = providers.insert(Provider::new(
                (index + 1) as u64,
                spec.name,
                preferences,
                spec.capacity,
            ));
            debug_assert_eq!(key, index);
        }

        Ok(MatchingEngine::from_rosters(
            candidates,
            providers,
            candidate_keys,
            provider_keys,
        ))
    }

    fn key_by_name<'a>(
        names: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, usize>, MatchError> {
        let mut keys = HashMap::new();
        for (index, name) in names.enumerate() {
            if keys.insert(name.to_string(), index).is_some() {
                return Err(MatchError::DuplicateIdentifier(name.to_string()));
            }
        }
        Ok(keys)
    }

    fn resolve(
        owner: &str,
        preferences: &[String],
        keys: &HashMap<String, usize>,
    ) -> Result<Vec<usize>, MatchError> {
        let mut seen = HashSet::with_capacity(preferences.len());
        let mut resolved = Vec::with_capacity(preferences.len());
        for name in preferences {
            let key = *keys
                .get(name)
                .ok_or_else(|| MatchError::UnknownParticipant(name.clone()))?;
            if !seen.insert(key) {
                return Err(MatchError::DuplicatePreference(format!("{owner}: {name}")));
            }
            resolved.push(key);
        }
        Ok(resolved)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Participant;

    #[test]
    fn test_builder_wires_keys() {
        let engine = RosterBuilder::new()
            .candidate("Ada", &["City", "Mercy"])
            .candidate("Ben", &["Mercy"])
            .provider("Mercy", 1, &["Ben", "Ada"])
            .provider("City", 2, &["Ada"])
            .build()
            .unwrap();

        let ada = engine.lookup_candidate("Ada").unwrap();
        let mercy = engine.lookup_provider("Mercy").unwrap();
        let city = engine.lookup_provider("City").unwrap();

        // Ada's preferences resolve to City then Mercy, in that order
        assert_eq!(engine.candidate(ada).unwrap().preferences(), &[city, mercy]);
        assert_eq!(engine.provider(mercy).unwrap().capacity(), 1);
    }

    #[test]
    fn test_builder_assigns_sequential_ids() {
        let engine = RosterBuilder::new()
            .candidate("Ada", &[])
            .candidate("Ben", &[])
            .provider("City", 1, &[])
            .build()
            .unwrap();

        let ada = engine.lookup_candidate("Ada").unwrap();
        let ben = engine.lookup_candidate("Ben").unwrap();
        assert_eq!(engine.candidate(ada).unwrap().id(), 1);
        assert_eq!(engine.candidate(ben).unwrap().id(), 2);
        let city = engine.lookup_provider("City").unwrap();
        assert_eq!(engine.provider(city).unwrap().id(), 1);
    }

    #[test]
    fn test_builder_unknown_identifier() {
        let result = RosterBuilder::new()
            .candidate("Ada", &["Nowhere"])
            .build();

        assert_eq!(
            result.err(),
            Some(MatchError::UnknownParticipant("Nowhere".to_string()))
        );
    }

    #[test]
    fn test_builder_duplicate_identifier() {
        let result = RosterBuilder::new()
            .candidate("Ada", &[])
            .candidate("Ada", &[])
            .build();

        assert_eq!(
            result.err(),
            Some(MatchError::DuplicateIdentifier("Ada".to_string()))
        );
    }

    #[test]
    fn test_builder_duplicate_preference() {
        let result = RosterBuilder::new()
            .candidate("Ada", &["City", "City"])
            .provider("City", 1, &["Ada"])
            .build();

        assert_eq!(
            result.err(),
            Some(MatchError::DuplicatePreference("Ada: City".to_string()))
        );
    }

    #[test]
    fn test_builder_same_name_across_sides() {
        // Identifier namespaces are per side; a candidate and a provider
        // may share a name
        let engine = RosterBuilder::new()
            .candidate("Mercy", &["Mercy"])
            .provider("Mercy", 1, &["Mercy"])
            .build()
            .unwrap();

        assert_eq!(engine.candidate_count(), 1);
        assert_eq!(engine.provider_count(), 1);
    }

    #[test]
    fn test_builder_empty() {
        let engine = RosterBuilder::new().build().unwrap();
        assert_eq!(engine.candidate_count(), 0);
        assert!(engine.is_terminal());
    }
}
