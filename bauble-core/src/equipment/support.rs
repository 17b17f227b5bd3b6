//! Which entity kinds carry equipment.

use bauble_registry::TypeRegistry;
use rustc_hash::FxHashSet;

use super::SlotCollection;

/// Table of entity kinds that get a [`SlotCollection`] when they are created.
#[derive(Debug, Clone, Default)]
pub struct EquipmentSupport {
    kinds: FxHashSet<String>,
}

impl EquipmentSupport {
    /// Creates a table where no kind has equipment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from a list of kinds.
    pub fn from_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Gives `kind` equipment support.
    pub fn assign(&mut self, kind: impl Into<String>) {
        let kind = kind.into();
        if !self.kinds.insert(kind.clone()) {
            log::warn!("Entity kind {kind} already has equipment support");
        }
    }

    /// Returns whether `kind` carries equipment.
    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    /// Builds the starting equipment for a new entity of `kind`.
    ///
    /// Supported kinds start with every enabled type at its default size.
    #[must_use]
    pub fn attach(&self, kind: &str, types: &TypeRegistry) -> Option<SlotCollection> {
        self.supports(kind)
            .then(|| SlotCollection::with_defaults(types))
    }
}

#[cfg(test)]
mod tests {
    use bauble_registry::TypeDeclaration;

    use super::*;

    #[test]
    fn test_only_supported_kinds_get_equipment() {
        let mut types = TypeRegistry::new();
        types.declare(&TypeDeclaration::new("ring").size(2), true);

        let mut support = EquipmentSupport::from_kinds(["player"]);
        support.assign("zombie");

        let player = support.attach("player", &types).unwrap();
        assert_eq!(player.layout(), [("ring".to_string(), 2)]);
        assert!(support.attach("zombie", &types).is_some());
        assert!(support.attach("pig", &types).is_none());
    }
}
