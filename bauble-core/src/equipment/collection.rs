//! Per-entity slot groups keyed by slot type.

use std::collections::BTreeMap;

use bauble_registry::{ItemStack, Registries, TypeRegistry};
use bauble_utils::Identifier;

use super::{
    finder::{FoundSlot, SlotCriterion, SlotScope},
    slot_group::{MAX_GROUP_SIZE, SlotGroup},
};

/// Everything an entity has equipped, one [`SlotGroup`] per slot type.
///
/// Groups are iterated in identifier order. Operations naming a slot type the
/// collection does not have are silent no-ops. Structural changes flag the
/// collection for a full resync; plain slot writes are tracked per slot.
#[derive(Debug, Clone, Default)]
pub struct SlotCollection {
    groups: BTreeMap<String, SlotGroup>,
    needs_full_sync: bool,
}

impl SlotCollection {
    /// Creates a collection with no groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding every enabled type at its default size.
    ///
    /// A fresh collection has no pending resync; clients receive its state when
    /// they start tracking the entity.
    #[must_use]
    pub fn with_defaults(types: &TypeRegistry) -> Self {
        Self {
            groups: default_groups(types),
            needs_full_sync: false,
        }
    }

    /// Adds a group for `identifier` at its default size.
    ///
    /// Does nothing unless the type is registered and enabled and the collection
    /// has no group for it yet.
    pub fn enable(&mut self, types: &TypeRegistry, identifier: &str) -> bool {
        let Some(slot_type) = types.lookup(identifier) else {
            return false;
        };
        if !slot_type.is_enabled() || self.groups.contains_key(identifier) {
            return false;
        }
        self.groups.insert(
            identifier.to_string(),
            SlotGroup::new(slot_type.size() as usize),
        );
        self.needs_full_sync = true;
        true
    }

    /// Removes the group for `identifier`, discarding its contents.
    pub fn disable(&mut self, identifier: &str) -> Option<SlotGroup> {
        let removed = self.groups.remove(identifier)?;
        self.needs_full_sync = true;
        Some(removed)
    }

    /// Appends `amount` slots to an existing group.
    ///
    /// A request that would exceed [`MAX_GROUP_SIZE`] is rejected.
    pub fn add_slots(&mut self, identifier: &str, amount: usize) -> bool {
        let Some(group) = self.groups.get_mut(identifier) else {
            return false;
        };
        if amount == 0 {
            return false;
        }
        if !group.grow(amount) {
            log::debug!(
                "Refusing to grow {identifier} from {} by {amount}",
                group.size()
            );
            return false;
        }
        self.needs_full_sync = true;
        true
    }

    /// Removes `amount` slots from the end of an existing group.
    ///
    /// A request that would leave fewer than one slot is rejected and the group
    /// keeps its size. Items in removed slots are discarded.
    pub fn remove_slots(&mut self, identifier: &str, amount: usize) -> bool {
        let Some(group) = self.groups.get_mut(identifier) else {
            return false;
        };
        if amount == 0 {
            return false;
        }
        let Some(removed) = group.shrink(amount) else {
            log::debug!(
                "Refusing to shrink {identifier} from {} by {amount}",
                group.size()
            );
            return false;
        };
        let lost = removed.iter().filter(|stack| !stack.is_empty()).count();
        if lost > 0 {
            log::debug!("Discarded {lost} stacks while shrinking {identifier}");
        }
        self.needs_full_sync = true;
        true
    }

    /// Puts `item` into a slot. Returns false when the slot does not exist.
    pub fn set_stack(&mut self, identifier: &str, index: usize, item: ItemStack) -> bool {
        self.groups
            .get_mut(identifier)
            .is_some_and(|group| group.set_item(index, item))
    }

    /// Returns the item in a slot.
    #[must_use]
    pub fn get_stack(&self, identifier: &str, index: usize) -> Option<&ItemStack> {
        self.groups.get(identifier)?.get_item(index)
    }

    /// Returns the first slot matching `criterion`, ordered by identifier then index.
    #[must_use]
    pub fn find_first(&self, criterion: &SlotCriterion<'_>, scope: &SlotScope<'_>) -> Option<FoundSlot> {
        match scope {
            SlotScope::All => self
                .groups
                .iter()
                .find_map(|(id, group)| Self::find_in(id, group, criterion)),
            SlotScope::Types(ids) => ids.iter().find_map(|id| {
                self.groups
                    .get(id)
                    .and_then(|group| Self::find_in(id, group, criterion))
            }),
        }
    }

    fn find_in(identifier: &str, group: &SlotGroup, criterion: &SlotCriterion<'_>) -> Option<FoundSlot> {
        group
            .iter()
            .find(|(_, stack)| criterion.matches(stack))
            .map(|(index, stack)| FoundSlot {
                identifier: identifier.to_string(),
                index,
                stack: stack.clone(),
            })
    }

    /// Finds `item` in the groups its tags classify it into.
    pub fn find_equipped(&self, registries: &mut Registries, item: &Identifier) -> Option<FoundSlot> {
        let types = registries.types_for_item(item);
        self.find_first(&SlotCriterion::Item(item), &SlotScope::Types(&types))
    }

    /// Finds the first stack in any group that `predicate` accepts.
    pub fn find_equipped_matching(&self, predicate: impl Fn(&ItemStack) -> bool) -> Option<FoundSlot> {
        self.find_first(&SlotCriterion::Matches(&predicate), &SlotScope::All)
    }

    /// Swaps in a whole new set of groups.
    pub fn replace_all(&mut self, groups: BTreeMap<String, SlotGroup>) {
        self.groups = groups;
        self.needs_full_sync = true;
    }

    /// Replaces the groups with every enabled type at its default size.
    pub fn reset_to_defaults(&mut self, types: &TypeRegistry) {
        self.replace_all(default_groups(types));
    }

    /// Empties one group, or every group when `identifier` is `None` or unknown.
    pub fn clear(&mut self, identifier: Option<&str>) {
        if let Some(group) = identifier.and_then(|id| self.groups.get_mut(id)) {
            group.clear();
            return;
        }
        for group in self.groups.values_mut() {
            group.clear();
        }
    }

    /// Returns the group for a slot type.
    #[must_use]
    pub fn group(&self, identifier: &str) -> Option<&SlotGroup> {
        self.groups.get(identifier)
    }

    /// Returns the group for a slot type mutably.
    pub fn group_mut(&mut self, identifier: &str) -> Option<&mut SlotGroup> {
        self.groups.get_mut(identifier)
    }

    /// Iterates over the groups in identifier order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &SlotGroup)> {
        self.groups.iter().map(|(id, group)| (id.as_str(), group))
    }

    /// Returns `(identifier, size)` for every group, in identifier order.
    #[must_use]
    pub fn layout(&self) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .map(|(id, group)| (id.clone(), group.size()))
            .collect()
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns whether a full resync is pending and clears the flag.
    ///
    /// A pending full resync supersedes individual slot changes, so those are
    /// dropped as well.
    pub fn take_full_sync(&mut self) -> bool {
        if !self.needs_full_sync {
            return false;
        }
        self.needs_full_sync = false;
        for group in self.groups.values_mut() {
            group.take_changed();
        }
        true
    }

    /// Returns every slot written since the last call, in identifier then index order.
    pub fn take_changed_slots(&mut self) -> Vec<(String, usize)> {
        self.groups
            .iter_mut()
            .flat_map(|(id, group)| {
                group
                    .take_changed()
                    .into_iter()
                    .map(move |index| (id.clone(), index))
            })
            .collect()
    }
}

fn default_groups(types: &TypeRegistry) -> BTreeMap<String, SlotGroup> {
    types
        .iter()
        .filter(|ty| ty.is_enabled())
        .map(|ty| (ty.identifier().to_string(), SlotGroup::new(ty.size() as usize)))
        .collect()
}
