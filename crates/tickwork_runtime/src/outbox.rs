//! # Outboxes
//!
//! Forward a subsystem's delivered messages to another thread (renderer,
//! audio mixer) over a `crossbeam-channel`.

use crossbeam_channel::{Receiver, Sender};
use tickwork_core::{Message, MessageQueue, Tick};

/// Drains one subsystem each tick and sends its messages to a receiver.
///
/// A detached outbox has no receiver and discards what it drains, so an
/// unconsumed subsystem never accumulates in the queue.
#[derive(Debug)]
pub struct Outbox {
    subsystem: String,
    sender: Option<Sender<Message>>,
}

impl Outbox {
    /// Creates an outbox and the receiver for its messages.
    #[must_use]
    pub fn channel(subsystem: &str) -> (Self, Receiver<Message>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                subsystem: subsystem.to_owned(),
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Creates an outbox that discards its messages.
    #[must_use]
    pub fn detached(subsystem: &str) -> Self {
        Self {
            subsystem: subsystem.to_owned(),
            sender: None,
        }
    }

    /// Returns the drained subsystem.
    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Checks if a receiver is still attached.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.sender.is_some()
    }

    /// Takes this tick's messages for the subsystem and sends them.
    ///
    /// Returns the number sent. When the receiver is gone the outbox logs
    /// once, detaches, and discards from then on.
    pub fn forward(&mut self, queue: &mut MessageQueue, tick: Tick) -> usize {
        let batch = queue.get(&self.subsystem, tick);
        let Some(sender) = &self.sender else {
            if !batch.is_empty() {
                tracing::trace!(
                    subsystem = %self.subsystem,
                    count = batch.len(),
                    "no receiver, messages discarded"
                );
            }
            return 0;
        };

        let mut sent = 0usize;
        let mut disconnected = false;
        for message in batch {
            if sender.send(message).is_err() {
                disconnected = true;
                break;
            }
            sent += 1;
        }
        if disconnected {
            tracing::warn!(subsystem = %self.subsystem, "outbox receiver disconnected");
            self.sender = None;
        }
        sent
    }
}
