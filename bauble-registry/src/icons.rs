//! Slot icon selection.
//!
//! Several producers may suggest an icon for the same slot type. The winner is the
//! greatest candidate by the textual order of its identifier, so it never depends
//! on which producer happened to load first.

use std::collections::{BTreeMap, BTreeSet};

use bauble_utils::Identifier;
use rustc_hash::FxHashMap;

use crate::RegistryExt;

/// Collects icon candidates and caches the resolved winners.
#[derive(Debug)]
pub struct IconResolver {
    candidates: FxHashMap<String, BTreeSet<Identifier>>,
    resolved: BTreeMap<String, Identifier>,
    dirty: bool,
    registering: bool,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IconResolver {
    /// Creates an empty resolver in its registration phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: FxHashMap::default(),
            resolved: BTreeMap::new(),
            dirty: false,
            registering: true,
        }
    }

    /// Adds an icon candidate for a slot type. Duplicates collapse.
    ///
    /// The cache is invalidated only when a type gets its first candidate while
    /// registration is still open. Later contributions are stored but do not
    /// change the resolved icons.
    pub fn contribute(&mut self, identifier: &str, icon: Identifier) {
        let set = self.candidates.entry(identifier.to_string()).or_default();
        let was_empty = set.is_empty();
        set.insert(icon);
        if was_empty && self.registering {
            self.dirty = true;
        }
    }

    /// Returns the icon for every type that has at least one candidate.
    pub fn resolve(&mut self) -> &BTreeMap<String, Identifier> {
        if self.dirty {
            self.resolved = self
                .candidates
                .iter()
                .filter_map(|(id, set)| set.last().map(|icon| (id.clone(), icon.clone())))
                .collect();
            self.dirty = false;
        }
        &self.resolved
    }

    /// Returns the resolved icon of one type.
    pub fn icon(&mut self, identifier: &str) -> Option<&Identifier> {
        self.resolve().get(identifier)
    }

    /// Returns whether contributions can still change the resolved icons.
    #[must_use]
    pub fn is_registering(&self) -> bool {
        self.registering
    }

    /// Drops every candidate and reopens registration.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl RegistryExt for IconResolver {
    fn freeze(&mut self) {
        // Pending candidates from the registration phase still count.
        self.resolve();
        self.registering = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(path: &'static str) -> Identifier {
        Identifier::new("bauble", path)
    }

    #[test]
    fn test_winner_ignores_contribution_order() {
        let icons = [icon("ring_a"), icon("ring_c"), icon("ring_b"), icon("ring_c")];

        let mut forward = IconResolver::new();
        for candidate in icons.iter().cloned() {
            forward.contribute("ring", candidate);
        }
        let mut backward = IconResolver::new();
        for candidate in icons.iter().rev().cloned() {
            backward.contribute("ring", candidate);
        }

        assert_eq!(forward.icon("ring"), Some(&icon("ring_c")));
        assert_eq!(forward.resolve(), backward.resolve());
    }

    #[test]
    fn test_types_without_candidates_are_omitted() {
        let mut resolver = IconResolver::new();
        resolver.contribute("ring", icon("ring"));
        let resolved = resolver.resolve();
        assert_eq!(resolved.len(), 1);
        assert!(!resolved.contains_key("belt"));
    }

    #[test]
    fn test_late_contributions_are_ignored() {
        let mut resolver = IconResolver::new();
        resolver.contribute("ring", icon("ring"));
        resolver.freeze();

        resolver.contribute("belt", icon("belt"));
        resolver.contribute("ring", icon("zz_ring"));
        assert_eq!(resolver.icon("belt"), None);
        assert_eq!(resolver.icon("ring"), Some(&icon("ring")));
    }

    #[test]
    fn test_cache_only_refreshes_on_new_types() {
        let mut resolver = IconResolver::new();
        resolver.contribute("ring", icon("ring_a"));
        assert_eq!(resolver.icon("ring"), Some(&icon("ring_a")));

        // A second candidate for an already non-empty set keeps the cached winner.
        resolver.contribute("ring", icon("ring_b"));
        assert_eq!(resolver.icon("ring"), Some(&icon("ring_a")));

        // A new type refreshes the whole table.
        resolver.contribute("belt", icon("belt"));
        assert_eq!(resolver.icon("ring"), Some(&icon("ring_b")));
        assert_eq!(resolver.icon("belt"), Some(&icon("belt")));
    }
}
