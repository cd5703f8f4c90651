//! # Component Storage
//!
//! One homogeneous table per component type, keyed by entity id.
//!
//! The tables live in a registry indexed by [`TypeId`]:
//! - At most one value per (entity, type) pair, by construction
//! - Membership tests cost one map lookup regardless of how many types exist
//! - Iteration is in entity id order

use super::component::Component;
use super::entity::EntityId;
use std::any::{Any, TypeId};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use tickwork_core::{ComponentTable, EntityId, Position};
///
/// let mut table: ComponentTable<Position> = ComponentTable::new();
/// assert!(table.insert(EntityId::new(0), Position::new(1.0, 2.0)));
/// assert!(!table.insert(EntityId::new(0), Position::new(9.0, 9.0)));
/// ```
#[derive(Debug)]
pub struct ComponentTable<C: Component> {
    rows: BTreeMap<EntityId, C>,
}

impl<C: Component> ComponentTable<C> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks if the entity has a component in this table.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Gets a component by entity id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        self.rows.get(&id)
    }

    /// Gets a mutable component by entity id.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        self.rows.get_mut(&id)
    }

    /// Inserts a component.
    ///
    /// # Returns
    ///
    /// `false` if the entity already had one; the stored value is left untouched.
    pub fn insert(&mut self, id: EntityId, component: C) -> bool {
        match self.rows.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(component);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Removes and returns a component.
    pub fn remove(&mut self, id: EntityId) -> Option<C> {
        self.rows.remove(&id)
    }

    /// Iterates `(id, &component)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.rows.iter().map(|(id, c)| (*id, c))
    }

    /// Iterates `(id, &mut component)` in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.rows.iter_mut().map(|(id, c)| (*id, c))
    }

    /// Returns a copy of the ids that currently have this component.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.rows.keys().copied().collect()
    }

    /// Drops every component.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl<C: Component> Default for ComponentTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a table, used for whole-entity operations.
trait ErasedTable {
    fn remove_entity(&mut self, id: EntityId) -> bool;
    fn is_empty(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedTable for ComponentTable<C> {
    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.rows.remove(&id).is_some()
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All component tables of a world, indexed by component type.
#[derive(Default)]
pub struct ComponentRegistry {
    tables: HashMap<TypeId, Box<dyn ErasedTable>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `C`, if any component of that type was ever added.
    #[must_use]
    pub fn table<C: Component>(&self) -> Option<&ComponentTable<C>> {
        self.tables
            .get(&TypeId::of::<C>())
            .and_then(|table| table.as_any().downcast_ref())
    }

    /// Returns the table for `C` mutably, if it exists.
    pub fn table_mut<C: Component>(&mut self) -> Option<&mut ComponentTable<C>> {
        self.tables
            .get_mut(&TypeId::of::<C>())
            .and_then(|table| table.as_any_mut().downcast_mut())
    }

    /// Returns the table for `C`, creating it on first use.
    ///
    /// `None` only if the slot for `C` holds a table of another type,
    /// which the registry never produces.
    pub fn table_or_insert<C: Component>(&mut self) -> Option<&mut ComponentTable<C>> {
        self.tables
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Box::new(ComponentTable::<C>::new()))
            .as_any_mut()
            .downcast_mut()
    }

    /// Removes every component belonging to `id`.
    ///
    /// Returns the number of components removed.
    pub fn remove_entity(&mut self, id: EntityId) -> usize {
        let removed = self
            .tables
            .values_mut()
            .map(|table| usize::from(table.remove_entity(id)))
            .sum();
        self.tables.retain(|_, table| !table.is_empty());
        removed
    }

    /// Returns the number of component tables.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.tables.len()
    }

    /// Drops every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.tables.len())
            .finish()
    }
}
