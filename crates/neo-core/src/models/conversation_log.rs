use super::message::{Message, Role};

/// Horizontal placement of a rendered entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// Assistant side
    Start,
    /// User side
    End,
}

impl From<Role> for Alignment {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Alignment::End,
            Role::Assistant => Alignment::Start,
        }
    }
}

/// What a renderer draws, in order.
///
/// `Typing` is synthetic: it is produced while a reply is pending and never
/// stored in the log.
#[derive(Debug, PartialEq)]
pub enum RenderEntry<'a> {
    Message {
        message: &'a Message,
        alignment: Alignment,
    },
    Typing,
}

/// Append-only message sequence plus the pending-reply flag
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    pending: bool,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Empty the sequence for a new conversation. Also clears pending.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending = false;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn render_entries(&self) -> Vec<RenderEntry<'_>> {
        let mut entries: Vec<RenderEntry<'_>> = self
            .messages
            .iter()
            .map(|message| RenderEntry::Message {
                message,
                alignment: message.role().into(),
            })
            .collect();

        if self.pending {
            entries.push(RenderEntry::Typing);
        }

        entries
    }
}
