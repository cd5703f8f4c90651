//! # Entity Management
//!
//! Entities are opaque identifiers drawn from a strictly increasing counter.
//! Each live entity also carries a unique display name.
//!
//! Ids are only recycled once the counter reaches the id limit: the directory
//! then hands out the lowest id that is not currently in use.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Unique identifier for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Reserved id returned when no entity could be allocated or found.
    pub const ERROR: Self = Self(u64::MAX);

    /// First id handed out by a fresh directory.
    pub const START: Self = Self(0);

    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is the reserved error id.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::ERROR
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            f.write_str("<error>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Allocates entity ids and keeps the name <-> id lookup.
///
/// The directory knows nothing about components; [`World`](super::World)
/// composes it with the component tables.
#[derive(Debug)]
pub struct EntityDirectory {
    /// Next id the counter will hand out.
    next_id: u64,
    /// Exclusive upper bound on ids.
    limit: u64,
    /// Live entities and their names, ordered by id.
    names: BTreeMap<EntityId, String>,
    /// Reverse lookup.
    ids_by_name: HashMap<String, EntityId>,
}

impl EntityDirectory {
    /// Creates a directory that may hand out ids in `0..limit`.
    ///
    /// `limit` is clamped so it never reaches [`EntityId::ERROR`].
    #[must_use]
    pub fn with_limit(limit: u64) -> Self {
        Self {
            next_id: EntityId::START.0,
            limit: limit.min(u64::MAX - 1),
            names: BTreeMap::new(),
            ids_by_name: HashMap::new(),
        }
    }

    /// Returns the exclusive id limit.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when no entity is alive.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Allocates a new entity with a default `Entity<id>` name.
    ///
    /// # Returns
    ///
    /// The new id, or [`EntityId::ERROR`] if every id below the limit is in use.
    pub fn allocate(&mut self) -> EntityId {
        let id = if self.next_id < self.limit {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            id
        } else {
            match self.lowest_free_id() {
                Some(id) => id,
                None => return EntityId::ERROR,
            }
        };

        let name = self.unique_default_name(id);
        self.ids_by_name.insert(name.clone(), id);
        self.names.insert(id, name);
        id
    }

    /// Removes an entity. Returns false if it did not exist.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.names.remove(&id) {
            Some(name) => {
                self.ids_by_name.remove(&name);
                true
            }
            None => false,
        }
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.names.contains_key(&id)
    }

    /// Returns the entity's name, if it exists.
    #[must_use]
    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<EntityId> {
        self.ids_by_name.get(name).copied()
    }

    /// Renames an entity.
    ///
    /// Fails if the entity is missing, the name is empty, or another entity
    /// already uses the name. Renaming an entity to its current name succeeds.
    pub fn rename(&mut self, id: EntityId, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self.ids_by_name.get(name) {
            Some(&owner) if owner == id => return true,
            Some(_) => return false,
            None => {}
        }
        let Some(slot) = self.names.get_mut(&id) else {
            return false;
        };
        let old = std::mem::replace(slot, name.to_owned());
        self.ids_by_name.remove(&old);
        self.ids_by_name.insert(name.to_owned(), id);
        true
    }

    /// Iterates `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Resets the counter and forgets every entity.
    pub fn clear(&mut self) {
        self.next_id = EntityId::START.0;
        self.names.clear();
        self.ids_by_name.clear();
    }

    /// Finds the first gap in the live id set.
    fn lowest_free_id(&self) -> Option<EntityId> {
        let mut expected = EntityId::START.0;
        for id in self.names.keys() {
            if id.0 != expected {
                break;
            }
            expected += 1;
        }
        (expected < self.limit).then_some(EntityId(expected))
    }

    fn unique_default_name(&self, id: EntityId) -> String {
        let base = format!("Entity{}", id.0);
        if !self.ids_by_name.contains_key(&base) {
            return base;
        }
        (0u64..)
            .map(|suffix| format!("{base}{suffix}"))
            .find(|candidate| !self.ids_by_name.contains_key(candidate))
            .unwrap_or(base)
    }
}

impl Default for EntityDirectory {
    fn default() -> Self {
        Self::with_limit(u64::from(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut dir = EntityDirectory::default();
        let a = dir.allocate();
        let b = dir.allocate();
        dir.remove(a);
        let c = dir.allocate();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_default_names() {
        let mut dir = EntityDirectory::default();
        let id = dir.allocate();
        assert_eq!(dir.name(id), Some("Entity0"));
        assert_eq!(dir.id("Entity0"), Some(id));
    }

    #[test]
    fn test_default_name_collision_gets_suffix() {
        let mut dir = EntityDirectory::default();
        let first = dir.allocate();
        assert!(dir.rename(first, "Entity1"));
        let second = dir.allocate();
        assert_eq!(second.raw(), 1);
        assert_eq!(dir.name(second), Some("Entity10"));
    }

    #[test]
    fn test_reuse_only_after_exhaustion() {
        let mut dir = EntityDirectory::with_limit(3);
        let ids: Vec<_> = (0..3).map(|_| dir.allocate()).collect();
        assert!(dir.allocate().is_error());

        dir.remove(ids[1]);
        assert_eq!(dir.allocate(), ids[1]);
        assert!(dir.allocate().is_error());
    }

    #[test]
    fn test_rename_rules() {
        let mut dir = EntityDirectory::default();
        let a = dir.allocate();
        let b = dir.allocate();

        assert!(dir.rename(a, "player"));
        assert!(!dir.rename(b, "player"));
        assert!(dir.rename(a, "player"));
        assert!(!dir.rename(a, ""));
        assert!(!dir.rename(EntityId::new(99), "ghost"));

        assert_eq!(dir.id("player"), Some(a));
        assert_eq!(dir.id("Entity0"), None);
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut dir = EntityDirectory::default();
        dir.allocate();
        dir.allocate();
        dir.clear();
        assert!(dir.is_empty());
        assert_eq!(dir.allocate(), EntityId::START);
    }
}
