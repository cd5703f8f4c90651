//! # Behavior Components
//!
//! Components that carry code instead of plain data:
//! - [`Dispatcher`] reacts to messages addressed to its entity by name
//! - [`Ai`] runs once per tick from the [`LogicSystem`](crate::LogicSystem)
//!
//! Handlers are shared through `Rc`. The caller clones the handle out of the
//! store before invoking it, so the handler can borrow the world mutably.

use std::fmt;
use std::rc::Rc;
use tickwork_core::{Component, EntityId, Message, MessageQueue, Tick, World};

/// Mutable engine state lent to systems and behaviors for one call.
pub struct TickContext<'a> {
    /// The entity/component store.
    pub world: &'a mut World,
    /// The pending message queue.
    pub messages: &'a mut MessageQueue,
    /// The tick being processed.
    pub tick: Tick,
}

impl<'a> TickContext<'a> {
    /// Bundles the engine state for one call.
    pub fn new(world: &'a mut World, messages: &'a mut MessageQueue, tick: Tick) -> Self {
        Self {
            world,
            messages,
            tick,
        }
    }

    /// Queues a message.
    #[inline]
    pub fn send(&mut self, message: Message) {
        self.messages.add(message);
    }
}

/// Reacts to a message addressed to an entity.
pub trait MessageHandler {
    /// Handles `message` on behalf of entity `id`.
    fn handle(&self, id: EntityId, message: &Message, ctx: &mut TickContext<'_>);
}

impl<F> MessageHandler for F
where
    F: Fn(EntityId, &Message, &mut TickContext<'_>),
{
    fn handle(&self, id: EntityId, message: &Message, ctx: &mut TickContext<'_>) {
        self(id, message, ctx);
    }
}

/// Per-tick behavior of an entity.
pub trait AiBehavior {
    /// Runs the behavior for entity `id`.
    fn update(&self, id: EntityId, ctx: &mut TickContext<'_>);
}

impl<F> AiBehavior for F
where
    F: Fn(EntityId, &mut TickContext<'_>),
{
    fn update(&self, id: EntityId, ctx: &mut TickContext<'_>) {
        self(id, ctx);
    }
}

/// Routes `entities` messages addressed to this entity into a handler.
///
/// # Example
///
/// ```rust
/// use tickwork_runtime::Dispatcher;
///
/// let dispatcher = Dispatcher::new(|_id, message, ctx| {
///     if message.command() == "ping" {
///         ctx.send(tickwork_core::Message::new("audio", "beep", ""));
///     }
/// });
/// # let _ = dispatcher;
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    handler: Rc<dyn MessageHandler>,
}

impl Dispatcher {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(EntityId, &Message, &mut TickContext<'_>) + 'static,
    {
        Self {
            handler: Rc::new(handler),
        }
    }

    /// Wraps an existing handler.
    pub fn from_handler(handler: Rc<dyn MessageHandler>) -> Self {
        Self { handler }
    }

    /// Returns a shared handle to the handler.
    #[must_use]
    pub fn handler(&self) -> Rc<dyn MessageHandler> {
        Rc::clone(&self.handler)
    }
}

impl Component for Dispatcher {}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

/// Per-tick entity logic with an enabled flag.
///
/// While enabled the primary behavior runs. While disabled the optional
/// fallback runs instead, or nothing.
#[derive(Clone)]
pub struct Ai {
    enabled: bool,
    on_enabled: Rc<dyn AiBehavior>,
    on_disabled: Option<Rc<dyn AiBehavior>>,
}

impl Ai {
    /// Creates an enabled AI from a closure.
    pub fn new<F>(behavior: F) -> Self
    where
        F: Fn(EntityId, &mut TickContext<'_>) + 'static,
    {
        Self {
            enabled: true,
            on_enabled: Rc::new(behavior),
            on_disabled: None,
        }
    }

    /// Creates an enabled AI from an existing behavior.
    pub fn from_behavior(behavior: Rc<dyn AiBehavior>) -> Self {
        Self {
            enabled: true,
            on_enabled: behavior,
            on_disabled: None,
        }
    }

    /// Sets the behavior that runs while disabled.
    #[must_use]
    pub fn when_disabled<F>(mut self, behavior: F) -> Self
    where
        F: Fn(EntityId, &mut TickContext<'_>) + 'static,
    {
        self.on_disabled = Some(Rc::new(behavior));
        self
    }

    /// Checks the enabled flag.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the enabled flag.
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the behavior for the current state, if any.
    #[must_use]
    pub fn current(&self) -> Option<Rc<dyn AiBehavior>> {
        if self.enabled {
            Some(Rc::clone(&self.on_enabled))
        } else {
            self.on_disabled.clone()
        }
    }
}

impl Component for Ai {}

impl fmt::Debug for Ai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ai")
            .field("enabled", &self.enabled)
            .field("has_disabled_behavior", &self.on_disabled.is_some())
            .finish()
    }
}
