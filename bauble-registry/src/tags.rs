//! Item tags and the derived item → slot type index.

use std::collections::BTreeSet;

use bauble_utils::Identifier;
use rustc_hash::{FxHashMap, FxHashSet};

/// Item tags as loaded from data: tag identifier → member items.
#[derive(Debug, Default, Clone)]
pub struct TagCollection {
    tags: FxHashMap<Identifier, FxHashSet<Identifier>>,
}

impl TagCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds items to a tag, creating the tag if needed.
    pub fn add(&mut self, tag: Identifier, items: impl IntoIterator<Item = Identifier>) {
        self.tags.entry(tag).or_default().extend(items);
    }

    /// Returns the members of a tag.
    #[must_use]
    pub fn get(&self, tag: &Identifier) -> Option<&FxHashSet<Identifier>> {
        self.tags.get(tag)
    }

    /// Iterates over every tag and its members.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &FxHashSet<Identifier>)> {
        self.tags.iter()
    }

    /// Drops every tag.
    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

/// Maps items to the slot types they may be equipped in.
///
/// A tag `<namespace>:<slot id>` in the [`TagCollection`] marks its items as
/// belonging to that slot type. The tag table is copied out of the collection the
/// first time a lookup finds it empty and is never refreshed afterwards, so tags
/// that appear after the first non-empty build are not seen.
#[derive(Debug)]
pub struct ClassificationIndex {
    namespace: String,
    by_type: FxHashMap<String, FxHashSet<Identifier>>,
    by_item: FxHashMap<Identifier, BTreeSet<String>>,
}

impl ClassificationIndex {
    /// Creates an empty index reading tags from `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            by_type: FxHashMap::default(),
            by_item: FxHashMap::default(),
        }
    }

    /// Returns the slot types `item` is tagged for.
    pub fn types_for(&mut self, item: &Identifier, tags: &TagCollection) -> BTreeSet<String> {
        if self.by_type.is_empty() {
            self.by_type = tags
                .iter()
                .filter(|(tag, _)| tag.namespace == self.namespace)
                .map(|(tag, items)| (tag.path.to_string(), items.clone()))
                .collect();
            self.by_item.clear();
        }

        if let Some(types) = self.by_item.get(item) {
            return types.clone();
        }

        let types: BTreeSet<String> = self
            .by_type
            .iter()
            .filter(|(_, items)| items.contains(item))
            .map(|(id, _)| id.clone())
            .collect();
        self.by_item.insert(item.clone(), types.clone());
        types
    }

    /// Empties the index so the next lookup rebuilds it.
    pub fn clear(&mut self) {
        self.by_type.clear();
        self.by_item.clear();
    }
}
