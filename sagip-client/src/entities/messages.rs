use chrono::{DateTime, Utc};
use im::Vector;
use sagip_types::{MessageInput, UserRole};
use serde::Deserialize;

use crate::store::{Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMessage {
    pub id: i64,
    pub conversation_id: String,
    pub sender: String,
    pub body: String,
    pub recipient_role: Option<UserRole>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub conversation_id: String,
    pub sender: String,
    pub body: String,
    pub recipient_role: Option<UserRole>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Message {
    type Raw = RawMessage;
    type Draft = MessageInput;

    const NAME: &'static str = "messages";
    const PATH: &'static str = "/api/messages";
    const PLACEMENT: Placement = Placement::Append;

    fn from_raw(raw: RawMessage) -> Self {
        Self {
            id: raw.id,
            conversation_id: raw.conversation_id,
            sender: raw.sender,
            body: raw.body,
            recipient_role: raw.recipient_role,
            created_at: super::timestamp(raw.created_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Messages sharing a conversation id, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Role the conversation was opened towards, taken from its first addressed message.
    pub fn recipient_role(&self) -> Option<UserRole> {
        self.messages.iter().find_map(|m| m.recipient_role)
    }

    pub fn involves(&self, sender: &str) -> bool {
        self.messages.iter().any(|m| m.sender == sender)
    }

    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().filter_map(|m| m.created_at).max()
    }
}

/// Groups messages by conversation. The most recently active conversation comes first.
pub fn conversations(messages: &Vector<Message>) -> Vec<Conversation> {
    let mut grouped: Vec<Conversation> = Vec::new();
    for message in messages {
        match grouped.iter_mut().find(|c| c.id == message.conversation_id) {
            Some(conversation) => conversation.messages.push(message.clone()),
            None => grouped.push(Conversation {
                id: message.conversation_id.clone(),
                messages: vec![message.clone()],
            }),
        }
    }

    grouped.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
    grouped
}
