//! # Messaging
//!
//! Immutable messages, the time-ordered queue that holds them, and the
//! binary file format used for scripts and saved sessions.

mod error;
pub mod file;
mod message;
mod queue;

pub use error::{MessageFileError, MessageFileResult};
pub use file::{decode_messages, encode_message, encode_messages};
pub use message::{Message, Tick, Timer, IMMEDIATE};
pub use queue::MessageQueue;
