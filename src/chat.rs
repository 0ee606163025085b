//! Per-ride chat placeholder. Messages live only in this process.

use crate::models::{ChatMessage, RideId};

#[derive(Debug, Clone)]
pub struct ChatLog {
    ride_id: RideId,
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new(ride_id: RideId) -> Self {
        Self {
            ride_id,
            messages: Vec::new(),
        }
    }

    pub fn ride_id(&self) -> RideId {
        self.ride_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn receive(&mut self, author: &str, text: &str) -> Option<&ChatMessage> {
        self.push(author, text, false)
    }

    /// Blank messages are ignored.
    pub fn send(&mut self, author: &str, text: &str) -> Option<&ChatMessage> {
        self.push(author, text, true)
    }

    fn push(&mut self, author: &str, text: &str, mine: bool) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.messages.last().map_or(1, |message| message.id + 1);
        self.messages.push(ChatMessage {
            id,
            author: author.to_string(),
            text: text.to_string(),
            mine,
        });
        self.messages.last()
    }
}

#[test]
fn blank_messages_are_dropped() {
    let mut log = ChatLog::new(3);
    assert!(log.send("Maya", "   ").is_none());
    assert!(log.send("Maya", "On my way").is_some());
    log.receive("Rami", "See you at the corner");
    let ids: Vec<_> = log.messages().iter().map(|message| message.id).collect();
    assert_eq!(ids, [1, 2]);
    assert!(log.messages()[0].mine);
    assert!(!log.messages()[1].mine);
}
