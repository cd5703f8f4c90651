//! # Messages
//!
//! Immutable event values routed through the [`MessageQueue`](super::MessageQueue).

use std::fmt;

/// Simulation tick number.
pub type Tick = i64;

/// Raw timer value meaning "deliver on the next dispatch".
pub const IMMEDIATE: i64 = -1;

/// When a message becomes deliverable.
///
/// `Immediate` orders before every `At(_)`. Timed ticks are never negative
/// once they pass through [`Timer::at`], [`Timer::shifted`] or the file
/// codec, so `At(_)` never aliases the raw immediate value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timer {
    /// Deliverable on any tick.
    Immediate,
    /// Deliverable only on this exact tick.
    At(Tick),
}

impl Timer {
    /// Builds a timed value, clamping negative ticks to 0.
    #[inline]
    #[must_use]
    pub const fn at(tick: Tick) -> Self {
        Self::At(if tick < 0 { 0 } else { tick })
    }

    /// Decodes a raw timer, where `-1` means immediate.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        if raw == IMMEDIATE {
            Self::Immediate
        } else {
            Self::At(raw)
        }
    }

    /// Encodes the timer as a raw value.
    ///
    /// A negative timed tick encodes as 0.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i64 {
        match self {
            Self::Immediate => IMMEDIATE,
            Self::At(tick) if tick < 0 => 0,
            Self::At(tick) => tick,
        }
    }

    /// Checks if the timer names a specific tick.
    #[inline]
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::At(_))
    }

    /// Checks if a message with this timer may be delivered on `tick`.
    #[inline]
    #[must_use]
    pub const fn is_due(self, tick: Tick) -> bool {
        match self {
            Self::Immediate => true,
            Self::At(at) => at == tick,
        }
    }

    /// Shifts a timed value by `offset`, saturating at tick 0.
    /// Immediate stays immediate.
    #[inline]
    #[must_use]
    pub const fn shifted(self, offset: Tick) -> Self {
        match self {
            Self::Immediate => Self::Immediate,
            Self::At(at) => Self::at(at.saturating_add(offset)),
        }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("now"),
            Self::At(tick) => write!(f, "{tick}"),
        }
    }
}

/// An event addressed to a subsystem, and optionally to an entity by name.
///
/// Arguments are carried as an ordered list. On the wire they are joined
/// with `;`, so an argument must not itself contain `;`.
///
/// # Example
///
/// ```rust
/// use tickwork_core::{Message, Timer};
///
/// let msg = Message::new("entities", "damage", "5").at(12).sent_to("player");
/// assert_eq!(msg.timer(), Timer::At(12));
/// assert_eq!(msg.get_arg(0), "5");
/// assert_eq!(msg.get_arg(3), "");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    timer: Timer,
    subsystem: String,
    to: String,
    from: String,
    command: String,
    args: Vec<String>,
}

impl Message {
    /// Builds an immediate message.
    ///
    /// `args` is split on `;`. An empty string yields one empty argument.
    #[must_use]
    pub fn new(subsystem: &str, command: &str, args: &str) -> Self {
        Self::from_parts(Timer::Immediate, subsystem, "", "", command, args)
    }

    /// Builds a message for a specific tick. Negative ticks clamp to 0.
    #[must_use]
    pub fn timed(tick: Tick, subsystem: &str, command: &str, args: &str) -> Self {
        Self::from_parts(Timer::at(tick), subsystem, "", "", command, args)
    }

    /// Builds an immediate message addressed to an entity.
    #[must_use]
    pub fn addressed(subsystem: &str, to: &str, from: &str, command: &str, args: &str) -> Self {
        Self::from_parts(Timer::Immediate, subsystem, to, from, command, args)
    }

    /// Builds a message from every field.
    #[must_use]
    pub fn from_parts(
        timer: Timer,
        subsystem: &str,
        to: &str,
        from: &str,
        command: &str,
        args: &str,
    ) -> Self {
        Self {
            timer,
            subsystem: subsystem.to_owned(),
            to: to.to_owned(),
            from: from.to_owned(),
            command: command.to_owned(),
            args: args.split(';').map(str::to_owned).collect(),
        }
    }

    /// Replaces the timer with `At(tick)`, clamping negative ticks to 0.
    #[must_use]
    pub fn at(mut self, tick: Tick) -> Self {
        self.timer = Timer::at(tick);
        self
    }

    /// Sets the addressee.
    #[must_use]
    pub fn sent_to(mut self, name: &str) -> Self {
        name.clone_into(&mut self.to);
        self
    }

    /// Sets the sender.
    #[must_use]
    pub fn sent_from(mut self, name: &str) -> Self {
        name.clone_into(&mut self.from);
        self
    }

    /// Returns the timer.
    #[inline]
    #[must_use]
    pub const fn timer(&self) -> Timer {
        self.timer
    }

    /// Checks if the message has a specific tick.
    #[inline]
    #[must_use]
    pub const fn is_timed(&self) -> bool {
        self.timer.is_timed()
    }

    /// Returns the destination subsystem.
    #[inline]
    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Returns the addressee name, empty if unused.
    #[inline]
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the sender name, empty if unused.
    #[inline]
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Returns the command.
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns every argument.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument at `pos`, or `""` if out of range.
    #[must_use]
    pub fn get_arg(&self, pos: usize) -> &str {
        self.args.get(pos).map_or("", String::as_str)
    }

    /// Returns the number of arguments.
    #[inline]
    #[must_use]
    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// Joins the arguments back with `;`.
    #[must_use]
    pub fn arg_string(&self) -> String {
        self.args.join(";")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} to='{}' from='{}' {} ({})",
            self.timer,
            self.subsystem,
            self.to,
            self.from,
            self.command,
            self.arg_string()
        )
    }
}
