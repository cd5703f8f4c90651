//! # Fixed-Rate Tick Loop
//!
//! Paces [`Engine::step`](crate::Engine::step) against wall-clock time.
//!
//! Elapsed time is credited to a backlog of owed ticks. The backlog is
//! capped: after a stall (a debugger pause, a blocked host) the surplus is
//! dropped and counted instead of replayed as a burst of catch-up ticks.

use std::time::{Duration, Instant};

/// Default cap on owed ticks.
pub const DEFAULT_MAX_BACKLOG: u32 = 8;

/// Fixed-timestep pacer.
#[derive(Debug)]
pub struct TickLoop {
    budget: Duration,
    max_backlog: u32,
    last_poll: Instant,
    owed: Duration,
    tick_count: u64,
    stats: TickStats,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Shortest tick observed, `Duration::MAX` before the first tick.
    pub min_tick: Duration,
    /// Longest tick observed.
    pub max_tick: Duration,
    /// Exponential moving average, seeded with the budget.
    pub avg_tick: Duration,
    /// Ticks that ran over the budget.
    pub late_ticks: u64,
    /// Owed ticks discarded by the backlog cap.
    pub dropped_ticks: u64,
    /// Ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn new(budget: Duration) -> Self {
        Self {
            min_tick: Duration::MAX,
            max_tick: Duration::ZERO,
            avg_tick: budget,
            late_ticks: 0,
            dropped_ticks: 0,
            total_ticks: 0,
        }
    }

    /// Records one tick. Returns true if it was late.
    fn record(&mut self, elapsed: Duration, budget: Duration) -> bool {
        self.total_ticks += 1;
        self.min_tick = self.min_tick.min(elapsed);
        self.max_tick = self.max_tick.max(elapsed);
        self.avg_tick = (self.avg_tick * 15 + elapsed) / 16;

        let late = elapsed > budget;
        if late {
            self.late_ticks += 1;
        }
        late
    }
}

impl TickLoop {
    /// Creates a loop running at `ticks_per_second`. Zero is treated as one.
    #[must_use]
    pub fn new(ticks_per_second: u32) -> Self {
        let rate = u64::from(ticks_per_second.max(1));
        let budget = Duration::from_micros(1_000_000 / rate);

        Self {
            budget,
            max_backlog: DEFAULT_MAX_BACKLOG,
            last_poll: Instant::now(),
            owed: Duration::ZERO,
            tick_count: 0,
            stats: TickStats::new(budget),
        }
    }

    /// Sets the cap on owed ticks. Zero is treated as one.
    #[must_use]
    pub fn with_max_backlog(mut self, ticks: u32) -> Self {
        self.max_backlog = ticks.max(1);
        self
    }

    /// Returns true if a tick is owed.
    ///
    /// Call this in a loop until it returns false.
    #[must_use]
    pub fn should_tick(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_poll);
        self.last_poll = now;
        self.credit(elapsed);
        self.owed >= self.budget
    }

    /// Marks the start of a tick and returns its start time.
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        self.owed = self.owed.saturating_sub(self.budget);
        self.tick_count += 1;
        Instant::now()
    }

    /// Marks the end of a tick started at `start`.
    pub fn end_tick(&mut self, start: Instant) {
        let elapsed = start.elapsed();
        if self.stats.record(elapsed, self.budget) {
            tracing::debug!(
                tick = self.tick_count,
                elapsed = ?elapsed,
                budget = ?self.budget,
                "late tick"
            );
        }
    }

    /// Returns how long until the next tick is owed.
    #[must_use]
    pub fn time_until_next_tick(&self) -> Duration {
        let credited = self.owed + self.last_poll.elapsed();
        self.budget.saturating_sub(credited)
    }

    /// Sleeps until the next tick is owed.
    pub fn wait_for_next_tick(&self) {
        let remaining = self.time_until_next_tick();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Returns the number of ticks begun.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.budget
    }

    /// Returns the cap on owed ticks.
    #[must_use]
    pub const fn max_backlog(&self) -> u32 {
        self.max_backlog
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::new(self.budget);
    }

    /// Adds `elapsed` to the owed time, dropping whole ticks over the cap.
    fn credit(&mut self, elapsed: Duration) {
        self.owed += elapsed;
        let cap = self.budget * self.max_backlog;
        if self.owed <= cap {
            return;
        }

        let surplus = self.owed - cap;
        let dropped = surplus.as_nanos() / self.budget.as_nanos().max(1);
        let dropped = u32::try_from(dropped).unwrap_or(u32::MAX);
        self.owed -= self.budget.saturating_mul(dropped).min(surplus);
        self.stats.dropped_ticks += u64::from(dropped);
        tracing::warn!(dropped, "tick backlog over cap, ticks dropped");
    }
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(crate::DEFAULT_TICK_RATE)
    }
}
