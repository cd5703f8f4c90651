//! # Engine Session Driver
//!
//! Owns the world, the queue and every consumer, and runs the per-tick
//! pipeline.
//!
//! ## Tick Order
//!
//! ```text
//! 1. Scheduler::run        enabled systems update components
//! 2. Scheduler::dispatch   systems take their messages, then the router drains `entities`
//! 3. Spawner               `spawner` partition
//! 4. Commands              `system` partition
//! 5. Outboxes              external partitions sent to other threads
//! 6. MessageQueue::prune   stale timed messages dropped
//! ```

use crate::commands::{Commands, COMMAND_SUBSYSTEM};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, SchedulerError};
use crate::outbox::Outbox;
use crate::scheduler::Scheduler;
use crate::spawner::{Spawner, SPAWNER_SUBSYSTEM};
use crate::system::System;
use crate::tick_loop::TickLoop;
use crossbeam_channel::Receiver;
use std::path::Path;
use tickwork_core::{Message, MessageQueue, Tick, World};

/// What one call to [`Engine::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// The tick that was processed.
    pub tick: Tick,
    /// Messages delivered to entity dispatchers.
    pub routed: usize,
    /// Entities created by the spawner.
    pub spawned: usize,
    /// System commands handled.
    pub commands: usize,
    /// Messages sent to outboxes.
    pub forwarded: usize,
    /// Stale timed messages discarded.
    pub pruned: usize,
}

/// A simulation session: store, queue, systems and message consumers.
///
/// # Example
///
/// ```rust
/// use tickwork_runtime::{Engine, EngineConfig, LogicSystem};
///
/// let mut engine = Engine::new(EngineConfig::default()).unwrap();
/// engine.add_system(LogicSystem::new()).unwrap();
/// engine.start_session(None).unwrap();
///
/// let report = engine.step();
/// assert_eq!(report.tick, 0);
/// assert_eq!(engine.tick(), 1);
/// ```
pub struct Engine {
    config: EngineConfig,
    world: World,
    queue: MessageQueue,
    scheduler: Scheduler,
    spawner: Spawner,
    commands: Commands,
    outboxes: Vec<Outbox>,
    tick: Tick,
}

impl Engine {
    /// Builds an engine with no systems.
    ///
    /// Every configured external subsystem starts with a detached outbox;
    /// call [`subscribe`](Self::subscribe) to receive its messages.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let outboxes = config
            .external_subsystems
            .iter()
            .map(|name| Outbox::detached(name))
            .collect();

        Ok(Self {
            world: World::with_max_entities(config.max_entities),
            queue: MessageQueue::new(),
            scheduler: Scheduler::new(),
            spawner: Spawner::new(),
            commands: Commands::new(),
            outboxes,
            tick: 0,
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a system.
    ///
    /// The names of the engine's own consumers (`spawner`, `system` and every
    /// outbox subsystem) are reserved, since a system with such a name would
    /// take their messages during dispatch.
    ///
    /// # Errors
    ///
    /// Fails during a session or on a duplicate or reserved name.
    pub fn add_system(&mut self, system: impl System + 'static) -> EngineResult<()> {
        let name = system.name();
        if self.is_consumer_name(name) {
            return Err(SchedulerError::ReservedName {
                name: name.to_owned(),
            }
            .into());
        }
        self.scheduler.add(system)?;
        Ok(())
    }

    /// Attaches a receiver to an external subsystem.
    ///
    /// A subsystem not listed in the configuration gets a new outbox.
    /// Subscribing again replaces the previous receiver. A registered system
    /// with the same name keeps receiving the messages first, so the outbox
    /// sees none of them.
    pub fn subscribe(&mut self, subsystem: &str) -> Receiver<Message> {
        let (outbox, receiver) = Outbox::channel(subsystem);
        match self.outboxes.iter_mut().find(|o| o.subsystem() == subsystem) {
            Some(slot) => *slot = outbox,
            None => self.outboxes.push(outbox),
        }
        tracing::debug!(subsystem, "outbox subscribed");
        receiver
    }

    /// Starts a session.
    ///
    /// Clears the world and the queue, resets the tick to 0, merges `script`
    /// relative to tick 0, then locks the system registry.
    ///
    /// # Errors
    ///
    /// Fails if no system is registered, a session is already running, or
    /// the script cannot be loaded.
    pub fn start_session(&mut self, script: Option<&Path>) -> EngineResult<()> {
        if self.scheduler.is_empty() {
            return Err(EngineError::NoSystems);
        }
        if self.scheduler.is_finalized() {
            return Err(EngineError::SessionActive);
        }

        self.world.clear();
        self.queue.clear();
        self.tick = 0;
        if let Some(path) = script {
            self.queue.load_script(path, self.tick)?;
        }
        self.scheduler.finalize();
        tracing::info!(systems = ?self.scheduler.names(), "session started");
        Ok(())
    }

    /// Ends the session.
    ///
    /// Clears the world, the queue and the system registry so a new set of
    /// systems can be added. Spawn templates and commands are kept.
    pub fn end_session(&mut self) {
        self.world.clear();
        self.queue.clear();
        self.scheduler.clear();
        tracing::info!(ticks = self.tick, "session ended");
    }

    /// Checks if a session is running.
    #[must_use]
    pub const fn in_session(&self) -> bool {
        self.scheduler.is_finalized()
    }

    /// Runs one tick at the current tick number, then advances it.
    pub fn step(&mut self) -> StepReport {
        let tick = self.tick;

        self.scheduler.run(&mut self.world, &mut self.queue, tick);
        let routed = self.scheduler.dispatch(&mut self.world, &mut self.queue, tick);

        let spawns = self.queue.get(SPAWNER_SUBSYSTEM, tick);
        let spawned = self
            .spawner
            .process(spawns, &mut self.world, &mut self.queue, tick);

        let commands = self.queue.get(COMMAND_SUBSYSTEM, tick);
        let commands = self.commands.process(commands);

        let forwarded: usize = self
            .outboxes
            .iter_mut()
            .map(|outbox| outbox.forward(&mut self.queue, tick))
            .sum();

        let pruned = if self.config.prune_messages {
            self.queue.prune(tick)
        } else {
            0
        };

        self.tick += 1;
        StepReport {
            tick,
            routed,
            spawned,
            commands,
            forwarded,
            pruned,
        }
    }

    /// Steps in real time at the configured rate until `keep_going` returns false.
    ///
    /// Returns the number of ticks run.
    pub fn run_realtime(&mut self, mut keep_going: impl FnMut(&Self, &StepReport) -> bool) -> u64 {
        let mut tick_loop = TickLoop::new(self.config.ticks_per_second);
        loop {
            while tick_loop.should_tick() {
                let start = tick_loop.begin_tick();
                let report = self.step();
                tick_loop.end_tick(start);
                if !keep_going(self, &report) {
                    let stats = tick_loop.stats();
                    tracing::debug!(
                        ticks = tick_loop.tick_count(),
                        avg = ?stats.avg_tick,
                        late = stats.late_ticks,
                        dropped = stats.dropped_ticks,
                        "realtime loop stopped"
                    );
                    return tick_loop.tick_count();
                }
            }
            tick_loop.wait_for_next_tick();
        }
    }

    /// Writes every pending message with its absolute timer.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save_pending(&self, path: impl AsRef<Path>) -> EngineResult<usize> {
        Ok(self.queue.save_file(path)?)
    }

    /// Replaces the pending messages with those in a saved file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds no complete record.
    pub fn load_pending(&mut self, path: impl AsRef<Path>) -> EngineResult<usize> {
        Ok(self.queue.load_file(path)?)
    }

    /// Queues a message.
    pub fn send(&mut self, message: Message) {
        self.queue.add(message);
    }

    /// Returns the next tick to be processed.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Returns the world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the pending messages.
    #[must_use]
    pub const fn messages(&self) -> &MessageQueue {
        &self.queue
    }

    /// Returns the pending messages mutably.
    pub fn messages_mut(&mut self) -> &mut MessageQueue {
        &mut self.queue
    }

    /// Returns the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Returns the spawner.
    pub fn spawner_mut(&mut self) -> &mut Spawner {
        &mut self.spawner
    }

    /// Returns the command registry.
    pub fn commands_mut(&mut self) -> &mut Commands {
        &mut self.commands
    }

    fn is_consumer_name(&self, name: &str) -> bool {
        name == SPAWNER_SUBSYSTEM
            || name == COMMAND_SUBSYSTEM
            || self.outboxes.iter().any(|outbox| outbox.subsystem() == name)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tick", &self.tick)
            .field("entities", &self.world.entity_count())
            .field("pending", &self.queue.len())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TickContext;
    use crate::LogicSystem;
    use tickwork_core::Health;

    struct Noop;

    impl System for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn run(&mut self, _ctx: &mut TickContext<'_>) {}
    }

    fn engine() -> Engine {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.add_system(Noop).unwrap();
        engine
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            ticks_per_second: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    struct Named(&'static str);

    impl System for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn run(&mut self, _ctx: &mut TickContext<'_>) {}
    }

    #[test]
    fn test_consumer_names_reserved() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        for name in [SPAWNER_SUBSYSTEM, COMMAND_SUBSYSTEM, "audio", "render"] {
            assert!(matches!(
                engine.add_system(Named(name)),
                Err(EngineError::Scheduler(SchedulerError::ReservedName { .. }))
            ));
        }
        let _hud = engine.subscribe("hud");
        assert!(engine.add_system(Named("hud")).is_err());
        assert!(engine.add_system(Named("physics")).is_ok());
    }

    #[test]
    fn test_spawner_messages_not_taken_by_systems() {
        let mut engine = engine();
        assert!(engine.add_system(Named(SPAWNER_SUBSYSTEM)).is_err());
        engine
            .spawner_mut()
            .add_spawn("rock", 0, |id, _, ctx| ctx.world.add_component(id, Health(1)))
            .unwrap();
        engine.start_session(None).unwrap();

        engine.send(Message::new(SPAWNER_SUBSYSTEM, "new", "rock"));
        assert_eq!(engine.step().spawned, 1);
    }

    #[test]
    fn test_session_requires_systems() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        assert!(matches!(engine.start_session(None), Err(EngineError::NoSystems)));
    }

    #[test]
    fn test_session_lifecycle() {
        let mut engine = engine();
        engine.start_session(None).unwrap();
        assert!(engine.in_session());
        assert!(matches!(
            engine.start_session(None),
            Err(EngineError::SessionActive)
        ));
        assert!(matches!(
            engine.add_system(LogicSystem::new()),
            Err(EngineError::Scheduler(_))
        ));

        engine.step();
        engine.end_session();
        assert!(!engine.in_session());
        assert!(engine.add_system(LogicSystem::new()).is_ok());
    }

    #[test]
    fn test_start_session_resets_state() {
        let mut engine = engine();
        let e = engine.world_mut().new_entity();
        engine.world_mut().add_component(e, Health(1));
        engine.send(Message::new("audio", "stale", ""));

        engine.start_session(None).unwrap();
        assert_eq!(engine.world().entity_count(), 0);
        assert!(engine.messages().is_empty());
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_step_pipeline() {
        let mut engine = engine();
        engine
            .spawner_mut()
            .add_spawn("rock", 0, |id, _, ctx| ctx.world.add_component(id, Health(9)))
            .unwrap();
        let exits = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = std::rc::Rc::clone(&exits);
        engine
            .commands_mut()
            .add("exit", move |_| counter.set(counter.get() + 1))
            .unwrap();
        let audio = engine.subscribe("audio");
        engine.start_session(None).unwrap();

        engine.send(Message::new(SPAWNER_SUBSYSTEM, "new", "rock"));
        engine.send(Message::new(COMMAND_SUBSYSTEM, "exit", ""));
        engine.send(Message::new("audio", "play", "boom"));
        engine.send(Message::timed(0, "nobody", "lost", ""));
        engine.send(Message::timed(1, "audio", "later", ""));

        let report = engine.step();
        assert_eq!(
            report,
            StepReport {
                tick: 0,
                routed: 0,
                spawned: 1,
                commands: 1,
                forwarded: 1,
                pruned: 1,
            }
        );
        assert_eq!(exits.get(), 1);
        assert_eq!(audio.try_recv().map(|m| m.command().to_owned()), Ok("play".to_owned()));

        let report = engine.step();
        assert_eq!(report.tick, 1);
        assert_eq!(report.forwarded, 1);
        assert!(engine.messages().is_empty());
    }

    #[test]
    fn test_unsubscribed_external_messages_are_drained() {
        let mut engine = engine();
        engine.start_session(None).unwrap();
        engine.send(Message::new("render", "draw", ""));
        assert_eq!(engine.step().forwarded, 0);
        assert!(engine.messages().is_empty());
    }

    #[test]
    fn test_pruning_can_be_disabled() {
        let config = EngineConfig {
            prune_messages: false,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config).unwrap();
        engine.add_system(Noop).unwrap();
        engine.start_session(None).unwrap();
        engine.send(Message::timed(0, "nobody", "lost", ""));

        assert_eq!(engine.step().pruned, 0);
        assert_eq!(engine.messages().len(), 1);
    }

    #[test]
    fn test_run_realtime_stops() {
        let config = EngineConfig {
            ticks_per_second: 1000,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config).unwrap();
        engine.add_system(Noop).unwrap();
        engine.start_session(None).unwrap();

        let ran = engine.run_realtime(|_, report| report.tick < 2);
        assert_eq!(ran, 3);
        assert_eq!(engine.tick(), 3);
    }
}
