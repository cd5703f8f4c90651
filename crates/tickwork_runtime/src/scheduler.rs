//! # System Scheduler
//!
//! Ordered registry of named systems.
//!
//! ## Lifecycle
//!
//! ```text
//! add, add, ... -> finalize() -> run/dispatch every tick -> clear()
//! ```
//!
//! Systems run and dispatch in registration order. Disabling a system skips
//! its `run` but never its `dispatch`.

use crate::components::TickContext;
use crate::error::{SchedulerError, SchedulerResult};
use crate::router::{route_entity_messages, ROUTER_SUBSYSTEM};
use crate::system::System;
use tickwork_core::{MessageQueue, Tick, World};

struct Slot {
    system: Box<dyn System>,
    enabled: bool,
}

/// Runs registered systems once per tick.
#[derive(Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
    finalized: bool,
}

impl Scheduler {
    /// Creates an empty, open scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a system, enabled.
    ///
    /// # Errors
    ///
    /// Fails if the scheduler is finalized, the name is taken, or the name
    /// is the router's `entities`.
    pub fn add(&mut self, system: impl System + 'static) -> SchedulerResult<()> {
        self.add_boxed(Box::new(system))
    }

    /// Registers an already boxed system.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn add_boxed(&mut self, system: Box<dyn System>) -> SchedulerResult<()> {
        let name = system.name().to_owned();
        if self.finalized {
            return Err(SchedulerError::Finalized { name });
        }
        if name == ROUTER_SUBSYSTEM {
            return Err(SchedulerError::ReservedName { name });
        }
        if self.slot(&name).is_some() {
            return Err(SchedulerError::DuplicateName { name });
        }

        tracing::debug!(system = %name, order = self.slots.len(), "system registered");
        self.slots.push(Slot {
            system,
            enabled: true,
        });
        Ok(())
    }

    /// Locks the registry. Later `add` calls fail.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Checks if the registry is locked.
    #[inline]
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Removes every system and reopens the registry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.finalized = false;
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns system names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.system.name()).collect()
    }

    /// Enables a system. Returns false if the name is unknown.
    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    /// Disables a system. Returns false if the name is unknown.
    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    /// Returns the enabled flag, or `None` if the name is unknown.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.slot(name).map(|index| self.slots[index].enabled)
    }

    /// Calls `run` on every enabled system in registration order.
    pub fn run(&mut self, world: &mut World, queue: &mut MessageQueue, tick: Tick) {
        let mut ctx = TickContext::new(world, queue, tick);
        for slot in self.slots.iter_mut().filter(|slot| slot.enabled) {
            slot.system.run(&mut ctx);
        }
    }

    /// Hands every system its messages for `tick`, then drains the router.
    ///
    /// Returns the number of messages the router delivered.
    pub fn dispatch(&mut self, world: &mut World, queue: &mut MessageQueue, tick: Tick) -> usize {
        for slot in &mut self.slots {
            let batch = queue.get(slot.system.name(), tick);
            let mut ctx = TickContext::new(world, queue, tick);
            slot.system.dispatch(batch, &mut ctx);
        }
        route_entity_messages(world, queue, tick)
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.system.name() == name)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(index) = self.slot(name) else {
            return false;
        };
        self.slots[index].enabled = enabled;
        tracing::debug!(system = name, enabled, "system toggled");
        true
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("systems", &self.names())
            .field("finalized", &self.finalized)
            .finish()
    }
}
