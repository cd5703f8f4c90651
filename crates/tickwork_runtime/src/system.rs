//! # Systems
//!
//! A system is a named update stage. Each tick the scheduler calls
//! [`System::run`] on enabled systems, then hands every system the messages
//! queued for its name through [`System::dispatch`].

use crate::components::TickContext;
use tickwork_core::Message;

/// A named update stage owned by the [`Scheduler`](crate::Scheduler).
pub trait System {
    /// Unique name. Messages whose subsystem equals this name are delivered here.
    fn name(&self) -> &str;

    /// Advances the simulation by one tick.
    fn run(&mut self, ctx: &mut TickContext<'_>);

    /// Reacts to this tick's messages for the system. Called even while
    /// disabled, with a possibly empty batch.
    fn dispatch(&mut self, _messages: Vec<Message>, _ctx: &mut TickContext<'_>) {}
}
