//! # Logic System
//!
//! Runs every [`Ai`] component once per tick.

use crate::components::{Ai, TickContext};
use crate::system::System;
use tickwork_core::Message;

/// Built-in system that drives [`Ai`] components.
///
/// Its dispatch step understands:
/// - `enable` - turns on the addressed entity's AI
/// - `disable` - turns it off
///
/// The target is the message's `to` name, or its first argument when `to`
/// is empty.
#[derive(Debug, Default)]
pub struct LogicSystem;

impl LogicSystem {
    /// Subsystem name of the logic system.
    pub const NAME: &'static str = "logic";

    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl System for LogicSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) {
        for id in ctx.world.component_ids::<Ai>() {
            let Some(behavior) = ctx.world.get_component::<Ai>(id).and_then(Ai::current) else {
                continue;
            };
            behavior.update(id, ctx);
        }
    }

    fn dispatch(&mut self, messages: Vec<Message>, ctx: &mut TickContext<'_>) {
        for message in messages {
            let enabled = match message.command() {
                "enable" => true,
                "disable" => false,
                other => {
                    tracing::trace!(command = other, "logic ignored command");
                    continue;
                }
            };
            let target = if message.to().is_empty() {
                message.get_arg(0)
            } else {
                message.to()
            };
            let id = ctx.world.get_id(target);
            match ctx.world.set_component::<Ai>(id) {
                Some(ai) => ai.set_enabled(enabled),
                None => tracing::trace!(target, "no ai component to toggle"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwork_core::{Health, MessageQueue, World};

    #[test]
    fn test_runs_enabled_behavior() {
        let mut world = World::new();
        let mut queue = MessageQueue::new();
        let id = world.new_entity();
        world.add_component(id, Health(0));
        world.add_component(
            id,
            Ai::new(|id, ctx| {
                if let Some(h) = ctx.world.set_component::<Health>(id) {
                    h.0 += 1;
                }
            })
            .when_disabled(|id, ctx| {
                if let Some(h) = ctx.world.set_component::<Health>(id) {
                    h.0 -= 10;
                }
            }),
        );

        let mut logic = LogicSystem::new();
        let mut ctx = TickContext::new(&mut world, &mut queue, 0);
        logic.run(&mut ctx);
        logic.run(&mut ctx);
        assert_eq!(ctx.world.get_component::<Health>(id), Some(&Health(2)));

        logic.dispatch(vec![Message::new("logic", "disable", "Entity0")], &mut ctx);
        logic.run(&mut ctx);
        assert_eq!(ctx.world.get_component::<Health>(id), Some(&Health(-8)));
    }

    #[test]
    fn test_enable_by_addressee() {
        let mut world = World::new();
        let mut queue = MessageQueue::new();
        let id = world.new_entity();
        world.set_name(id, "orc");
        let mut ai = Ai::new(|_, _| {});
        ai.set_enabled(false);
        world.add_component(id, ai);

        let mut logic = LogicSystem::new();
        let mut ctx = TickContext::new(&mut world, &mut queue, 0);
        logic.dispatch(
            vec![Message::addressed("logic", "orc", "", "enable", "")],
            &mut ctx,
        );
        assert!(ctx.world.get_component::<Ai>(id).is_some_and(Ai::is_enabled));
    }

    #[test]
    fn test_behavior_may_delete_entities() {
        let mut world = World::new();
        let mut queue = MessageQueue::new();
        for _ in 0..3 {
            let id = world.new_entity();
            world.add_component(
                id,
                Ai::new(|_, ctx| {
                    let victims = ctx.world.component_ids::<Ai>();
                    for victim in victims {
                        ctx.world.delete_entity(victim);
                    }
                }),
            );
        }

        let mut ctx = TickContext::new(&mut world, &mut queue, 0);
        LogicSystem::new().run(&mut ctx);
        assert_eq!(ctx.world.entity_count(), 0);
    }
}
