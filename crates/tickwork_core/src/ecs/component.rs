//! # Component System
//!
//! Components are values attached to exactly one entity. Plain data and
//! behavior-carrying components are stored the same way: the type is the key.

/// Marker trait for ECS components.
///
/// Any `'static` type can be a component once it opts in. The store keeps
/// one table per concrete type, so an entity holds at most one value of each.
///
/// # Example
///
/// ```rust
/// use tickwork_core::Component;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: 'static {}

/// Position component for entities.
///
/// Two-dimensional world position used by movement-style systems.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
}

impl Component for Position {}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity component for entities.
///
/// World units per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// X velocity.
    pub x: f32,
    /// Y velocity.
    pub y: f32,
}

impl Component for Velocity {}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Health(pub i64);

impl Component for Health {}
