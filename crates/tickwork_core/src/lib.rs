//! # TICKWORK Core
//!
//! The state half of a tick-driven simulation:
//! - An entity/component store with named, addressable entities
//! - Immutable messages and a time-ordered queue that delivers them
//! - A binary message file format for scripts and saved sessions
//!
//! ## Architecture Rules
//!
//! 1. **No globals** - every `World` and `MessageQueue` is an owned value
//! 2. **No panics on lookup** - misses return `None`, `false` or [`EntityId::ERROR`]
//! 3. **Deterministic order** - components iterate by id, messages by timer then arrival
//!
//! ## Example
//!
//! ```rust
//! use tickwork_core::{Health, Message, MessageQueue, World};
//!
//! let mut world = World::new();
//! let player = world.new_entity();
//! world.set_name(player, "player");
//! world.add_component(player, Health(3));
//!
//! let mut queue = MessageQueue::new();
//! queue.add(Message::new("entities", "damage", "1").sent_to("player"));
//! assert_eq!(queue.get("entities", 0).len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod messaging;

pub use ecs::{
    Component, ComponentRegistry, ComponentTable, EntityDirectory, EntityId, Health, Position,
    Velocity, World,
};
pub use messaging::{
    decode_messages, encode_message, encode_messages, Message, MessageFileError,
    MessageFileResult, MessageQueue, Tick, Timer, IMMEDIATE,
};
