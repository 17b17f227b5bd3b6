//! Searching equipped items.

use std::collections::BTreeSet;

use bauble_registry::ItemStack;
use bauble_utils::Identifier;

/// What a slot has to hold to match a search.
///
/// Empty stacks never match.
#[derive(Clone, Copy)]
pub enum SlotCriterion<'a> {
    /// The stack is of this item.
    Item(&'a Identifier),
    /// The predicate accepts the stack.
    Matches(&'a dyn Fn(&ItemStack) -> bool),
}

impl SlotCriterion<'_> {
    /// Returns whether `stack` satisfies this criterion.
    #[must_use]
    pub fn matches(&self, stack: &ItemStack) -> bool {
        if stack.is_empty() {
            return false;
        }
        match self {
            Self::Item(item) => stack.is(item),
            Self::Matches(predicate) => predicate(stack),
        }
    }
}

/// Which slot groups a search looks at.
#[derive(Debug, Clone, Copy)]
pub enum SlotScope<'a> {
    /// Every group.
    All,
    /// Only the named groups. Names without a group are skipped.
    Types(&'a BTreeSet<String>),
}

/// A matching slot and a copy of what it holds.
#[derive(Debug, Clone)]
pub struct FoundSlot {
    /// The slot type of the group.
    pub identifier: String,
    /// The slot index inside the group.
    pub index: usize,
    /// The stack found there.
    pub stack: ItemStack,
}
