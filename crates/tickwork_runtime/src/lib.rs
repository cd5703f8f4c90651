//! # TICKWORK Runtime
//!
//! Drives a [`World`](tickwork_core::World) and a
//! [`MessageQueue`](tickwork_core::MessageQueue) one tick at a time.
//!
//! ## Architecture
//!
//! - **Scheduler**: named systems run and dispatch in registration order
//! - **Router**: `entities` messages reach the addressed entity's [`Dispatcher`]
//! - **Consumers**: spawner, system commands and outboxes drain their partitions
//! - **Engine**: owns all of the above and runs the per-tick pipeline
//!
//! ## Message Flow
//!
//! ```text
//! producer --add--> MessageQueue --get(subsystem, tick)--> System::dispatch
//!                        |                                  Router -> Dispatcher
//!                        |                                  Spawner / Commands
//!                        +--prune(tick)--> dropped          Outbox -> other thread
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tickwork_core::{Health, Message};
//! use tickwork_runtime::{Dispatcher, Engine, EngineConfig, LogicSystem};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.add_system(LogicSystem::new()).unwrap();
//! engine.start_session(None).unwrap();
//!
//! let world = engine.world_mut();
//! let player = world.new_entity();
//! world.set_name(player, "player");
//! world.add_component(player, Health(3));
//! world.add_component(player, Dispatcher::new(|id, msg, ctx| {
//!     if msg.command() == "damage" {
//!         if let Some(hp) = ctx.world.set_component::<Health>(id) {
//!             hp.0 -= msg.get_arg(0).parse::<i64>().unwrap_or(0);
//!         }
//!     }
//! }));
//!
//! engine.send(Message::new("entities", "damage", "2").sent_to("player"));
//! engine.step();
//! assert_eq!(engine.world().get_component::<Health>(player), Some(&Health(1)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod commands;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod outbox;
pub mod router;
pub mod scheduler;
pub mod spawner;
pub mod system;
pub mod tick_loop;

pub use commands::{Commands, COMMAND_SUBSYSTEM};
pub use components::{Ai, AiBehavior, Dispatcher, MessageHandler, TickContext};
pub use config::EngineConfig;
pub use engine::{Engine, StepReport};
pub use error::{
    ConfigError, ConfigResult, EngineError, EngineResult, RegistryError, RegistryResult,
    SchedulerError, SchedulerResult,
};
pub use logic::LogicSystem;
pub use outbox::Outbox;
pub use router::{route_entity_messages, ROUTER_SUBSYSTEM};
pub use scheduler::Scheduler;
pub use spawner::{Spawner, SPAWNER_SUBSYSTEM};
pub use system::System;
pub use tick_loop::{TickLoop, TickStats};

/// Default simulation rate in ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 60;
