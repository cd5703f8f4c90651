//! # Message Queue
//!
//! Pending messages kept sorted by timer. Immediate messages sit at the
//! front, timed ones follow in ascending tick order, and equal timers keep
//! insertion order.

use super::error::MessageFileResult;
use super::file;
use super::message::{Message, Tick, Timer};
use std::path::Path;

/// Time-ordered collection of undelivered messages.
///
/// # Example
///
/// ```rust
/// use tickwork_core::{Message, MessageQueue};
///
/// let mut queue = MessageQueue::new();
/// queue.add(Message::timed(2, "audio", "play", "boom"));
/// queue.add(Message::new("audio", "stop", ""));
///
/// let now = queue.get("audio", 1);
/// assert_eq!(now.len(), 1);
/// assert_eq!(now[0].command(), "stop");
///
/// let later = queue.get("audio", 2);
/// assert_eq!(later[0].command(), "play");
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MessageQueue {
    pending: Vec<Message>,
}

impl MessageQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Returns the number of pending messages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterates pending messages in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.pending.iter()
    }

    /// Queues a message after every pending message with the same timer.
    pub fn add(&mut self, message: Message) {
        let timer = message.timer();
        let pos = self.pending.partition_point(|m| m.timer() <= timer);
        self.pending.insert(pos, message);
    }

    /// Removes and returns every message for `subsystem` deliverable on `tick`.
    ///
    /// Immediate messages always match. Timed messages match only on their
    /// exact tick. The returned batch is in queue order.
    pub fn get(&mut self, subsystem: &str, tick: Tick) -> Vec<Message> {
        let horizon = self.horizon(tick);
        let mut delivered = Vec::new();
        let mut kept = Vec::with_capacity(horizon);

        for message in self.pending.drain(..horizon) {
            if message.subsystem() == subsystem && message.timer().is_due(tick) {
                delivered.push(message);
            } else {
                kept.push(message);
            }
        }
        kept.append(&mut self.pending);
        self.pending = kept;

        if !delivered.is_empty() {
            tracing::trace!(subsystem, tick, count = delivered.len(), "messages delivered");
        }
        delivered
    }

    /// Discards every timed message whose tick is at or before `tick`.
    ///
    /// Immediate messages are never pruned. Returns the number discarded.
    pub fn prune(&mut self, tick: Tick) -> usize {
        let horizon = self.horizon(tick);
        let before = self.pending.len();
        let mut index = 0usize;
        self.pending.retain(|message| {
            let stale = index < horizon && message.is_timed();
            index += 1;
            if stale {
                tracing::trace!(%message, "pruned undelivered message");
            }
            !stale
        });
        before - self.pending.len()
    }

    /// Drops every pending message.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Replaces the queue with absolute-timed records from `bytes`.
    ///
    /// Returns the number of messages loaded.
    ///
    /// # Errors
    ///
    /// Fails if `bytes` is non-empty and holds no complete record. The queue
    /// is left unchanged in that case.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> MessageFileResult<usize> {
        let mut messages = file::decode_messages(bytes)?;
        messages.sort_by_key(Message::timer);
        self.pending = messages;
        Ok(self.pending.len())
    }

    /// Merges relative-timed records from `bytes`, shifting each timed record
    /// by `tick`. Immediate records stay immediate.
    ///
    /// A timed record that would land before tick 0 is skipped. Returns the
    /// number of messages merged.
    ///
    /// # Errors
    ///
    /// Fails if `bytes` is non-empty and holds no complete record.
    pub fn load_script_bytes(&mut self, bytes: &[u8], tick: Tick) -> MessageFileResult<usize> {
        let messages = file::decode_messages(bytes)?;
        let mut count = 0usize;
        for message in messages {
            let shifted = match message.timer() {
                Timer::At(at) => match at.checked_add(tick) {
                    Some(at) if at >= 0 => message.at(at),
                    _ => {
                        tracing::warn!(
                            %message,
                            offset = tick,
                            "script message before tick 0 skipped"
                        );
                        continue;
                    }
                },
                Timer::Immediate => message,
            };
            self.add(shifted);
            count += 1;
        }
        Ok(count)
    }

    /// Replaces the queue with the contents of a message file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds no complete record.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> MessageFileResult<usize> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let count = self.load_bytes(&bytes)?;
        tracing::info!(path = %path.display(), count, "message file loaded");
        Ok(count)
    }

    /// Merges a relative-timed script file, offset by `tick`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds no complete record.
    pub fn load_script(&mut self, path: impl AsRef<Path>, tick: Tick) -> MessageFileResult<usize> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let count = self.load_script_bytes(&bytes, tick)?;
        tracing::info!(path = %path.display(), count, tick, "message script merged");
        Ok(count)
    }

    /// Encodes every pending message with its absolute timer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        file::encode_messages(&self.pending)
    }

    /// Writes every pending message to `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_file(&self, path: impl AsRef<Path>) -> MessageFileResult<usize> {
        let path = path.as_ref();
        let count = file::write_message_file(path, &self.pending)?;
        tracing::info!(path = %path.display(), count, "message file saved");
        Ok(count)
    }

    /// Index one past the last message with timer `<= At(tick)`.
    fn horizon(&self, tick: Tick) -> usize {
        self.pending
            .partition_point(|m| m.timer() <= Timer::At(tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(Message::command).collect()
    }

    #[test]
    fn test_add_keeps_timer_order() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(5, "a", "five", ""));
        queue.add(Message::timed(1, "a", "one", ""));
        queue.add(Message::new("a", "now", ""));
        queue.add(Message::timed(3, "a", "three", ""));

        let order: Vec<_> = queue.iter().map(Message::command).collect();
        assert_eq!(order, vec!["now", "one", "three", "five"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(2, "a", "first", ""));
        queue.add(Message::new("a", "imm1", ""));
        queue.add(Message::timed(2, "a", "second", ""));
        queue.add(Message::new("a", "imm2", ""));

        assert_eq!(commands(&queue.get("a", 2)), vec!["imm1", "imm2", "first", "second"]);
    }

    #[test]
    fn test_get_is_time_gated() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(10, "render", "draw", ""));

        assert!(queue.get("render", 9).is_empty());
        assert_eq!(queue.get("render", 10).len(), 1);
        assert!(queue.get("render", 10).is_empty());
    }

    #[test]
    fn test_get_filters_by_subsystem() {
        let mut queue = MessageQueue::new();
        queue.add(Message::new("audio", "play", ""));
        queue.add(Message::new("render", "draw", ""));
        queue.add(Message::new("audio", "stop", ""));

        assert_eq!(commands(&queue.get("audio", 0)), vec!["play", "stop"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(Message::subsystem), Some("render"));
    }

    #[test]
    fn test_missed_timed_message_not_delivered_late() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(3, "audio", "late", ""));
        assert!(queue.get("audio", 4).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_prune() {
        let mut queue = MessageQueue::new();
        queue.add(Message::new("audio", "keep", ""));
        queue.add(Message::timed(1, "audio", "old", ""));
        queue.add(Message::timed(2, "audio", "now", ""));
        queue.add(Message::timed(3, "audio", "future", ""));

        assert_eq!(queue.prune(2), 2);
        assert_eq!(queue.prune(2), 0);
        assert!(queue.get("audio", 2).iter().all(|m| m.command() == "keep"));
        assert_eq!(commands(&queue.get("audio", 3)), vec!["future"]);
    }

    #[test]
    fn test_load_bytes_replaces_and_sorts() {
        let source = [
            Message::timed(4, "a", "late", ""),
            Message::timed(1, "a", "early", ""),
        ];
        let mut queue = MessageQueue::new();
        queue.add(Message::new("a", "stale", ""));

        assert_eq!(queue.load_bytes(&file::encode_messages(&source)).unwrap(), 2);
        let order: Vec<_> = queue.iter().map(Message::command).collect();
        assert_eq!(order, vec!["early", "late"]);
    }

    #[test]
    fn test_load_bytes_failure_leaves_queue() {
        let mut queue = MessageQueue::new();
        queue.add(Message::new("a", "keep", ""));
        assert!(queue.load_bytes(b"junk").is_err());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_script_offsets_timed_records() {
        let script = [
            Message::timed(0, "a", "at_zero", ""),
            Message::new("a", "immediate", ""),
            Message::timed(5, "a", "at_five", ""),
        ];
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(100, "a", "existing", ""));

        assert_eq!(queue.load_script_bytes(&file::encode_messages(&script), 100).unwrap(), 3);
        let timers: Vec<_> = queue.iter().map(|m| (m.command(), m.timer())).collect();
        assert_eq!(
            timers,
            vec![
                ("immediate", Timer::Immediate),
                ("existing", Timer::At(100)),
                ("at_zero", Timer::At(100)),
                ("at_five", Timer::At(105)),
            ]
        );
    }

    #[test]
    fn test_negative_ticks_survive_save_and_load() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(-1, "audio", "past", ""));
        queue.add(Message::new("audio", "now", ""));

        let mut restored = MessageQueue::new();
        restored.load_bytes(&queue.to_bytes()).unwrap();
        assert!(queue.iter().eq(restored.iter()));
        assert_eq!(restored.iter().filter(|m| m.is_timed()).count(), 1);

        assert_eq!(queue.prune(0), 1);
        assert_eq!(restored.prune(0), 1);
        assert_eq!(commands(&restored.get("audio", 1)), vec!["now"]);
    }

    #[test]
    fn test_script_before_tick_zero_skipped() {
        let script = [
            Message::timed(2, "a", "too_early", ""),
            Message::timed(8, "a", "later", ""),
            Message::new("a", "immediate", ""),
        ];
        let mut queue = MessageQueue::new();

        assert_eq!(queue.load_script_bytes(&file::encode_messages(&script), -5).unwrap(), 2);
        let timers: Vec<_> = queue.iter().map(|m| (m.command(), m.timer())).collect();
        assert_eq!(
            timers,
            vec![("immediate", Timer::Immediate), ("later", Timer::At(3))]
        );

        let mut restored = MessageQueue::new();
        restored.load_bytes(&queue.to_bytes()).unwrap();
        assert!(queue.iter().eq(restored.iter()));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut queue = MessageQueue::new();
        queue.add(Message::timed(2, "spawner", "new", "orc;3;4"));
        queue.add(Message::addressed("entities", "player", "trap", "damage", "1"));
        queue.add(Message::timed(2, "audio", "play", ""));

        let mut restored = MessageQueue::new();
        restored.load_bytes(&queue.to_bytes()).unwrap();
        assert!(queue.iter().eq(restored.iter()));
    }
}
