//! A resizable run of item slots for one slot type.

use std::{collections::BTreeSet, mem};

use bauble_registry::{ItemStack, MAX_SLOT_COUNT};

/// Most slots a group can hold.
pub const MAX_GROUP_SIZE: usize = MAX_SLOT_COUNT as usize;

/// The slots an entity has for a single slot type.
///
/// Writes through [`SlotGroup::set_item`] and [`SlotGroup::get_item_mut`] mark
/// the slot as changed until [`SlotGroup::take_changed`] is called.
#[derive(Debug, Clone, Default)]
pub struct SlotGroup {
    items: Vec<ItemStack>,
    changed: BTreeSet<usize>,
}

impl SlotGroup {
    /// Creates a group with `size` empty slots, capped at [`MAX_GROUP_SIZE`].
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            items: (0..size.min(MAX_GROUP_SIZE))
                .map(|_| ItemStack::empty())
                .collect(),
            changed: BTreeSet::new(),
        }
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Returns true if every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(ItemStack::is_empty)
    }

    /// Gets the item in a slot.
    #[must_use]
    pub fn get_item(&self, slot: usize) -> Option<&ItemStack> {
        self.items.get(slot)
    }

    /// Gets a mutable reference to the item in a slot and marks it changed.
    pub fn get_item_mut(&mut self, slot: usize) -> Option<&mut ItemStack> {
        let item = self.items.get_mut(slot)?;
        self.changed.insert(slot);
        Some(item)
    }

    /// Sets the item in a slot. Returns false when the slot does not exist.
    pub fn set_item(&mut self, slot: usize, item: ItemStack) -> bool {
        match self.get_item_mut(slot) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Iterates over `(slot, item)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.items.iter().enumerate()
    }

    /// Appends `amount` empty slots.
    ///
    /// Returns false and leaves the group untouched when the result would exceed
    /// [`MAX_GROUP_SIZE`].
    pub fn grow(&mut self, amount: usize) -> bool {
        if self
            .items
            .len()
            .checked_add(amount)
            .is_none_or(|size| size > MAX_GROUP_SIZE)
        {
            return false;
        }
        self.items.extend((0..amount).map(|_| ItemStack::empty()));
        true
    }

    /// Drops the last `amount` slots and returns whatever they held.
    ///
    /// Returns `None` and leaves the group untouched when fewer than one slot
    /// would remain.
    pub fn shrink(&mut self, amount: usize) -> Option<Vec<ItemStack>> {
        let remaining = self.items.len().checked_sub(amount).filter(|&n| n >= 1)?;
        let removed = self.items.split_off(remaining);
        self.changed.retain(|&slot| slot < remaining);
        Some(removed)
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for (slot, item) in self.items.iter_mut().enumerate() {
            if !item.is_empty() {
                *item = ItemStack::empty();
                self.changed.insert(slot);
            }
        }
    }

    /// Returns the slots changed since the last call, in order.
    pub fn take_changed(&mut self) -> BTreeSet<usize> {
        mem::take(&mut self.changed)
    }
}
