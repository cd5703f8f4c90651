//! # Entity Component System
//!
//! Addressable entities with arbitrary typed data attached.
//!
//! ## Design Philosophy
//!
//! - One homogeneous table per component type, indexed by `TypeId`
//! - Entity ids come from a strictly increasing counter
//! - Every entity has a unique name so messages can address it

mod component;
mod entity;
mod storage;
mod world;

pub use component::{Component, Health, Position, Velocity};
pub use entity::{EntityDirectory, EntityId};
pub use storage::{ComponentRegistry, ComponentTable};
pub use world::World;
