//! # Spawner
//!
//! Creates and deletes entities in response to `spawner` messages.
//!
//! ## Commands
//!
//! ```text
//! new;<template>;<arg>...   create an entity from a named template
//! delete;<name>             delete the named entity
//! ```

use crate::components::TickContext;
use crate::error::{RegistryError, RegistryResult};
use std::collections::HashMap;
use tickwork_core::{EntityId, Message, MessageQueue, Tick, World};

/// Subsystem name drained by the spawner.
pub const SPAWNER_SUBSYSTEM: &str = "spawner";

type Builder = Box<dyn Fn(EntityId, &[String], &mut TickContext<'_>) -> bool>;

struct Template {
    num_args: usize,
    builder: Builder,
}

/// Registry of named entity templates.
#[derive(Default)]
pub struct Spawner {
    templates: HashMap<String, Template>,
}

impl Spawner {
    /// Creates an empty spawner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template that takes exactly `num_args` arguments.
    ///
    /// The builder receives the fresh entity and the arguments that followed
    /// the template name. Returning false deletes the entity.
    ///
    /// # Errors
    ///
    /// Fails if a template with this name exists.
    pub fn add_spawn<F>(&mut self, name: &str, num_args: usize, builder: F) -> RegistryResult<()>
    where
        F: Fn(EntityId, &[String], &mut TickContext<'_>) -> bool + 'static,
    {
        if self.templates.contains_key(name) {
            return Err(RegistryError::Duplicate {
                kind: "spawn template",
                name: name.to_owned(),
            });
        }
        self.templates.insert(
            name.to_owned(),
            Template {
                num_args,
                builder: Box::new(builder),
            },
        );
        Ok(())
    }

    /// Checks if a template is registered.
    #[must_use]
    pub fn has_spawn(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Applies a batch of `spawner` messages.
    ///
    /// Returns the number of entities created.
    pub fn process(
        &self,
        messages: Vec<Message>,
        world: &mut World,
        queue: &mut MessageQueue,
        tick: Tick,
    ) -> usize {
        let mut created = 0usize;
        let mut ctx = TickContext::new(world, queue, tick);

        for message in messages {
            match message.command() {
                "new" => {
                    if self.spawn(&message, &mut ctx) {
                        created += 1;
                    }
                }
                "delete" => {
                    let id = ctx.world.get_id(message.get_arg(0));
                    if !ctx.world.delete_entity(id) {
                        tracing::trace!(name = message.get_arg(0), "delete of missing entity");
                    }
                }
                other => tracing::trace!(command = other, "spawner ignored command"),
            }
        }
        created
    }

    fn spawn(&self, message: &Message, ctx: &mut TickContext<'_>) -> bool {
        let name = message.get_arg(0);
        let Some(template) = self.templates.get(name) else {
            tracing::warn!(template = name, "unknown spawn template");
            return false;
        };
        if message.num_args() != template.num_args + 1 {
            tracing::warn!(
                template = name,
                expected = template.num_args,
                got = message.num_args() - 1,
                "spawn argument count mismatch"
            );
            return false;
        }

        let id = ctx.world.new_entity();
        if id.is_error() {
            return false;
        }
        if (template.builder)(id, &message.args()[1..], ctx) {
            tracing::trace!(template = name, entity = %id, "entity spawned");
            true
        } else {
            tracing::warn!(template = name, "spawn builder failed, entity removed");
            ctx.world.delete_entity(id);
            false
        }
    }
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.templates.keys().collect();
        names.sort();
        f.debug_struct("Spawner").field("templates", &names).finish()
    }
}
