//! # System Commands
//!
//! Host-level commands (exit, pause, volume...) delivered on the `system`
//! partition.

use crate::error::{RegistryError, RegistryResult};
use std::collections::HashMap;
use tickwork_core::Message;

/// Subsystem name drained by the command registry.
pub const COMMAND_SUBSYSTEM: &str = "system";

type Handler = Box<dyn FnMut(&[String])>;

/// Maps command names to handlers.
#[derive(Default)]
pub struct Commands {
    handlers: HashMap<String, Handler>,
}

impl Commands {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `command`.
    ///
    /// # Errors
    ///
    /// Fails if the command already has a handler.
    pub fn add<F>(&mut self, command: &str, handler: F) -> RegistryResult<()>
    where
        F: FnMut(&[String]) + 'static,
    {
        if self.handlers.contains_key(command) {
            return Err(RegistryError::Duplicate {
                kind: "command",
                name: command.to_owned(),
            });
        }
        self.handlers.insert(command.to_owned(), Box::new(handler));
        Ok(())
    }

    /// Runs the handler of every known command in the batch.
    ///
    /// Returns the number of messages handled. Unknown commands are ignored.
    pub fn process(&mut self, messages: Vec<Message>) -> usize {
        let mut handled = 0usize;
        for message in messages {
            match self.handlers.get_mut(message.command()) {
                Some(handler) => {
                    handler(message.args());
                    handled += 1;
                }
                None => tracing::trace!(command = message.command(), "unknown system command"),
            }
        }
        handled
    }
}

impl std::fmt::Debug for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("Commands").field("commands", &names).finish()
    }
}
