//! # Dispatch Router
//!
//! Delivers `entities` messages to the [`Dispatcher`] of the entity named in
//! the message's `to` field.

use crate::components::{Dispatcher, TickContext};
use tickwork_core::{MessageQueue, Tick, World};

/// Subsystem name drained by the router. Systems may not use it.
pub const ROUTER_SUBSYSTEM: &str = "entities";

/// Drains the `entities` partition for `tick`.
///
/// Handlers may queue further immediate `entities` messages; those are
/// delivered in a later pass of the same call, so chained reactions finish
/// within the tick. A handler that always re-queues never terminates.
///
/// Messages whose addressee is missing or has no dispatcher are dropped.
///
/// # Returns
///
/// The number of messages delivered to a handler.
pub fn route_entity_messages(world: &mut World, queue: &mut MessageQueue, tick: Tick) -> usize {
    let mut delivered = 0usize;

    loop {
        let batch = queue.get(ROUTER_SUBSYSTEM, tick);
        if batch.is_empty() {
            break;
        }

        for message in batch {
            let target = world.get_id(message.to());
            let Some(handler) = world
                .get_component::<Dispatcher>(target)
                .map(Dispatcher::handler)
            else {
                tracing::trace!(%message, "no dispatcher for addressee, message dropped");
                continue;
            };

            let mut ctx = TickContext::new(world, queue, tick);
            handler.handle(target, &message, &mut ctx);
            delivered += 1;
        }
    }

    delivered
}
