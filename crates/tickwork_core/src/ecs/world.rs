//! # ECS World
//!
//! The central container for all entities and components.

use super::component::Component;
use super::entity::{EntityDirectory, EntityId};
use super::storage::ComponentRegistry;

/// The ECS World - entity directory plus one table per component type.
///
/// Lookup misses never panic: they return `None`, `false`, an empty name
/// or [`EntityId::ERROR`].
///
/// # Example
///
/// ```rust
/// use tickwork_core::{Position, World};
///
/// let mut world = World::new();
/// let entity = world.new_entity();
/// assert!(world.add_component(entity, Position::new(1.0, 2.0)));
/// assert!(!world.add_component(entity, Position::new(5.0, 5.0)));
/// assert_eq!(world.get_component::<Position>(entity), Some(&Position::new(1.0, 2.0)));
/// ```
#[derive(Debug, Default)]
pub struct World {
    directory: EntityDirectory,
    components: ComponentRegistry,
}

impl World {
    /// Creates an empty world with the default id limit (`u32::MAX`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world that allocates ids in `0..max_entities`.
    #[must_use]
    pub fn with_max_entities(max_entities: u64) -> Self {
        Self {
            directory: EntityDirectory::with_limit(max_entities),
            components: ComponentRegistry::new(),
        }
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.directory.len()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity.
    ///
    /// # Returns
    ///
    /// The new id, or [`EntityId::ERROR`] if the id space is exhausted.
    pub fn new_entity(&mut self) -> EntityId {
        let id = self.directory.allocate();
        if id.is_error() {
            tracing::warn!(limit = self.directory.limit(), "entity id space exhausted");
        }
        id
    }

    /// Deletes an entity and every component attached to it.
    ///
    /// Returns false if the entity did not exist.
    pub fn delete_entity(&mut self, id: EntityId) -> bool {
        if !self.directory.remove(id) {
            return false;
        }
        let removed = self.components.remove_entity(id);
        tracing::trace!(entity = %id, components = removed, "entity deleted");
        true
    }

    /// Checks if an entity exists.
    #[inline]
    #[must_use]
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.directory.contains(id)
    }

    /// Returns the entity's name, or an empty string if it does not exist.
    #[must_use]
    pub fn get_name(&self, id: EntityId) -> String {
        self.directory.name(id).unwrap_or_default().to_owned()
    }

    /// Renames an entity. Fails if the name is empty or taken by another entity.
    pub fn set_name(&mut self, id: EntityId, name: &str) -> bool {
        self.directory.rename(id, name)
    }

    /// Looks up an entity by name, or returns [`EntityId::ERROR`].
    #[must_use]
    pub fn get_id(&self, name: &str) -> EntityId {
        self.directory.id(name).unwrap_or(EntityId::ERROR)
    }

    /// Returns every live entity as `(id, name)`, in id order.
    #[must_use]
    pub fn entities(&self) -> Vec<(EntityId, String)> {
        self.directory
            .iter()
            .map(|(id, name)| (id, name.to_owned()))
            .collect()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component.
    ///
    /// Returns false if the entity does not exist or already has a `T`.
    /// The existing value is left untouched in that case.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        if !self.directory.contains(id) {
            return false;
        }
        self.components
            .table_or_insert::<T>()
            .is_some_and(|table| table.insert(id, component))
    }

    /// Checks if the entity has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.components
            .table::<T>()
            .is_some_and(|table| table.contains(id))
    }

    /// Reads a component.
    #[must_use]
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.components.table::<T>()?.get(id)
    }

    /// Borrows a component for writing.
    pub fn set_component<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.components.table_mut::<T>()?.get_mut(id)
    }

    /// Detaches a component. Returns false if there was none.
    pub fn delete_component<T: Component>(&mut self, id: EntityId) -> bool {
        self.components
            .table_mut::<T>()
            .and_then(|table| table.remove(id))
            .is_some()
    }

    /// Iterates every `T` as `(id, &T)`, in id order.
    pub fn get_components<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.components
            .table::<T>()
            .into_iter()
            .flat_map(|table| table.iter())
    }

    /// Iterates every `T` as `(id, &mut T)`, in id order.
    pub fn set_components<T: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.components
            .table_mut::<T>()
            .into_iter()
            .flat_map(|table| table.iter_mut())
    }

    /// Copies the ids of every entity that has a `T`.
    ///
    /// Use this instead of [`get_components`](Self::get_components) when the
    /// loop body adds or removes entities or `T` components.
    #[must_use]
    pub fn component_ids<T: Component>(&self) -> Vec<EntityId> {
        self.components
            .table::<T>()
            .map(|table| table.ids())
            .unwrap_or_default()
    }

    /// Deletes every entity and component and resets the id counter.
    pub fn clear(&mut self) {
        self.directory.clear();
        self.components.clear();
    }
}
