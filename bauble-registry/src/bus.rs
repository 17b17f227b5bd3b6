//! Inter-producer messages carrying slot type declarations.

use crate::slot_type::TypeDeclaration;

/// Method name of create-or-merge declarations.
pub const REGISTER_TYPE: &str = "register_type";
/// Method name of merge-only declarations.
pub const MODIFY_TYPE: &str = "modify_type";

/// One message sent by a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterModMessage {
    /// The producer that sent the message.
    pub sender: String,
    /// What the receiver should do with the payload.
    pub method: String,
    /// The declaration itself.
    pub declaration: TypeDeclaration,
}

/// Messages queued by producers until the registries process them.
#[derive(Debug, Default)]
pub struct DeclarationBus {
    queue: Vec<InterModMessage>,
}

impl DeclarationBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message with an arbitrary method.
    pub fn send(
        &mut self,
        sender: impl Into<String>,
        method: impl Into<String>,
        declaration: TypeDeclaration,
    ) {
        self.queue.push(InterModMessage {
            sender: sender.into(),
            method: method.into(),
            declaration,
        });
    }

    /// Queues a `register_type` message.
    pub fn register_type(&mut self, sender: impl Into<String>, declaration: TypeDeclaration) {
        self.send(sender, REGISTER_TYPE, declaration);
    }

    /// Queues a `modify_type` message.
    pub fn modify_type(&mut self, sender: impl Into<String>, declaration: TypeDeclaration) {
        self.send(sender, MODIFY_TYPE, declaration);
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Takes every queued message, leaving the bus empty.
    pub fn drain(&mut self) -> Vec<InterModMessage> {
        std::mem::take(&mut self.queue)
    }
}
