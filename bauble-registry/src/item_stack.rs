//! Item stacks held in equipment slots.

use bauble_utils::Identifier;
use simdnbt::owned::NbtCompound;

/// A stack of items.
///
/// `tag` is the item's own data and travels with the item on the wire. The
/// `extension` compound is state owned by the equipment system (for example a
/// charge counter on an amulet); it is synchronised separately from the item.
#[derive(Debug, Clone)]
pub struct ItemStack {
    item: Identifier,
    count: i32,
    tag: Option<NbtCompound>,
    extension: Option<NbtCompound>,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemStack {
    /// The item used by empty stacks.
    pub const AIR: Identifier = Identifier::vanilla_static("air");

    /// Creates an empty stack.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item: Self::AIR,
            count: 0,
            tag: None,
            extension: None,
        }
    }

    /// Creates a stack holding one item.
    #[must_use]
    pub fn new(item: Identifier) -> Self {
        Self::with_count(item, 1)
    }

    /// Creates a stack holding `count` items.
    #[must_use]
    pub fn with_count(item: Identifier, count: i32) -> Self {
        Self {
            item,
            count,
            tag: None,
            extension: None,
        }
    }

    /// Returns whether the stack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count <= 0 || self.item == Self::AIR
    }

    /// Returns the item of this stack.
    #[must_use]
    pub fn item(&self) -> &Identifier {
        &self.item
    }

    /// Returns whether this stack is a non-empty stack of `item`.
    #[must_use]
    pub fn is(&self, item: &Identifier) -> bool {
        !self.is_empty() && self.item == *item
    }

    /// Returns the number of items in the stack.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Returns the item's own data.
    #[must_use]
    pub fn tag(&self) -> Option<&NbtCompound> {
        self.tag.as_ref()
    }

    /// Replaces the item's own data.
    pub fn set_tag(&mut self, tag: Option<NbtCompound>) {
        self.tag = tag;
    }

    /// Returns the equipment extension data.
    #[must_use]
    pub fn extension(&self) -> Option<&NbtCompound> {
        self.extension.as_ref()
    }

    /// Returns the equipment extension data, creating an empty compound if needed.
    pub fn extension_mut(&mut self) -> &mut NbtCompound {
        self.extension.get_or_insert_with(NbtCompound::new)
    }

    /// Applies a synchronised extension tag to this stack.
    ///
    /// `None` leaves the current extension untouched; a compound replaces it.
    pub fn apply_sync_tag(&mut self, tag: Option<NbtCompound>) {
        if let Some(tag) = tag {
            self.extension = Some(tag);
        }
    }
}
