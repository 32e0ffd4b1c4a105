//! The message store — ordered live buffer plus pause buffer.
//!
//! The scroller never owns messages; it reaches the store through the
//! [`PauseBuffer`] and [`MessageSink`] traits in [`crate::core::drain`].

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use super::drain::{MessageSink, PauseBuffer};

/// One feed item.
#[derive(Debug, Clone)]
pub struct Message {
    pub timestamp: DateTime<Local>,
    pub author: String,
    pub body: String,
}

impl Message {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            author: author.into(),
            body: body.into(),
        }
    }
}

/// Append-only transcript with a display cap.  While scrolling is paused,
/// new arrivals go to the pause buffer instead of the live list and are
/// drained back in batches on resume.
pub struct Transcript {
    messages: VecDeque<Message>,
    pause_buffer: Vec<Message>,
    /// Display cap: the live list is trimmed from the front beyond this.
    line_limit: usize,
}

impl Transcript {
    pub fn new(line_limit: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            pause_buffer: Vec::new(),
            line_limit: line_limit.max(1),
        }
    }

    /// Add a message.  `direct` appends straight to the live list (normal
    /// arrival, or a drained batch); otherwise it is held in the pause
    /// buffer until the next drain.
    pub fn add(&mut self, msg: Message, direct: bool) {
        if direct {
            self.push_live(msg);
        } else {
            self.pause_buffer.push(msg);
        }
    }

    fn push_live(&mut self, msg: Message) {
        self.messages.push_back(msg);
        while self.messages.len() > self.line_limit {
            self.messages.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages waiting in the pause buffer.
    pub fn backlog(&self) -> usize {
        self.pause_buffer.len()
    }
}

impl MessageSink for Transcript {
    fn append(&mut self, msg: Message) {
        self.push_live(msg);
    }
}

impl PauseBuffer for Transcript {
    fn take_batch(&mut self, max: usize) -> Vec<Message> {
        let n = max.min(self.pause_buffer.len());
        self.pause_buffer.drain(..n).collect()
    }

    fn backlog(&self) -> usize {
        self.pause_buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_add_appends_to_the_live_list() {
        let mut tr = Transcript::new(10);
        tr.add(Message::new("a", "hello"), true);
        assert_eq!(tr.len(), 1);
        assert_eq!(tr.backlog(), 0);
    }

    #[test]
    fn buffered_add_goes_to_the_pause_buffer() {
        let mut tr = Transcript::new(10);
        tr.add(Message::new("a", "hello"), false);
        assert_eq!(tr.len(), 0);
        assert_eq!(tr.backlog(), 1);
    }

    #[test]
    fn live_list_is_trimmed_to_the_line_limit() {
        let mut tr = Transcript::new(3);
        for i in 0..5 {
            tr.add(Message::new("a", format!("m{i}")), true);
        }
        assert_eq!(tr.len(), 3);
        let bodies: Vec<_> = tr.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn take_batch_removes_from_the_front() {
        let mut tr = Transcript::new(10);
        for i in 0..7 {
            tr.add(Message::new("a", format!("m{i}")), false);
        }
        let batch = tr.take_batch(5);
        assert_eq!(batch.len(), 5);
        assert_eq!(batch[0].body, "m0");
        assert_eq!(tr.backlog(), 2);
        let rest = tr.take_batch(5);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].body, "m6");
        assert!(tr.take_batch(5).is_empty());
    }
}
