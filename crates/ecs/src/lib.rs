//! Component contract.
//!
//! A component is a capability object owned by exactly one entity. The core
//! never dispatches to components; plugins or the owning entity's own
//! behaviour look them up by concrete type and drive them.
//!
//! # Invariants
//! - A component's owner is fixed at construction.
//! - A component list keeps insertion order and never de-duplicates.

use stagecraft_common::{AsAny, EntityId};
use tracing::warn;

/// A capability object attached to an entity.
///
/// Implementors only need to report their owner; everything else is up to
/// the concrete type.
pub trait Component: AsAny {
    /// The entity this component belongs to.
    fn owner(&self) -> EntityId;
}

/// The ordered components attached to one entity.
#[derive(Default)]
pub struct Components {
    items: Vec<Box<dyn Component>>,
}

impl std::fmt::Debug for Components {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Components")
            .field("len", &self.items.len())
            .finish()
    }
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append components for `owner`. A component reporting a different
    /// owner is still appended, with a warning.
    pub fn extend_for<I>(&mut self, owner: EntityId, components: I)
    where
        I: IntoIterator<Item = Box<dyn Component>>,
    {
        for component in components {
            if component.owner() != owner {
                warn!(
                    entity = %owner,
                    component_owner = %component.owner(),
                    "component attached to an entity that does not own it"
                );
            }
            self.items.push(component);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> + '_ {
        self.items.iter().map(|c| c.as_ref())
    }

    /// First component of type `T`.
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.items
            .iter()
            .find_map(|c| c.as_ref().as_any().downcast_ref::<T>())
    }

    /// First component of type `T`, mutably.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.items
            .iter_mut()
            .find_map(|c| c.as_mut().as_any_mut().downcast_mut::<T>())
    }

    /// Every component of type `T`, in attachment order.
    pub fn iter_of<T: Component>(&self) -> impl Iterator<Item = &T> + '_ {
        self.items
            .iter()
            .filter_map(|c| c.as_ref().as_any().downcast_ref::<T>())
    }

    /// Every component of type `T`, mutably, in attachment order.
    pub fn iter_of_mut<T: Component>(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items
            .iter_mut()
            .filter_map(|c| c.as_mut().as_any_mut().downcast_mut::<T>())
    }

    pub fn has<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health {
        owner: EntityId,
        hp: i32,
    }

    impl Component for Health {
        fn owner(&self) -> EntityId {
            self.owner
        }
    }

    struct Tag {
        owner: EntityId,
        label: &'static str,
    }

    impl Component for Tag {
        fn owner(&self) -> EntityId {
            self.owner
        }
    }

    fn boxed<C: Component>(c: C) -> Box<dyn Component> {
        Box::new(c)
    }

    #[test]
    fn typed_lookup() {
        let id = EntityId::new();
        let mut list = Components::new();
        list.extend_for(
            id,
            [
                boxed(Tag { owner: id, label: "enemy" }),
                boxed(Health { owner: id, hp: 10 }),
            ],
        );

        assert_eq!(list.len(), 2);
        assert_eq!(list.get::<Health>().unwrap().hp, 10);
        assert_eq!(list.get::<Tag>().unwrap().label, "enemy");
        assert!(list.has::<Health>());
    }

    #[test]
    fn mutable_lookup() {
        let id = EntityId::new();
        let mut list = Components::new();
        list.extend_for(id, [boxed(Health { owner: id, hp: 10 })]);

        list.get_mut::<Health>().unwrap().hp -= 3;
        assert_eq!(list.get::<Health>().unwrap().hp, 7);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let id = EntityId::new();
        let mut list = Components::new();
        list.extend_for(
            id,
            [
                boxed(Tag { owner: id, label: "a" }),
                boxed(Health { owner: id, hp: 1 }),
                boxed(Tag { owner: id, label: "b" }),
            ],
        );

        let labels: Vec<_> = list.iter_of::<Tag>().map(|t| t.label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        for tag in list.iter_of_mut::<Tag>() {
            tag.label = "z";
        }
        assert!(list.iter_of::<Tag>().all(|t| t.label == "z"));
    }

    #[test]
    fn foreign_owner_still_attached() {
        let id = EntityId::new();
        let other = EntityId::new();
        let mut list = Components::new();
        list.extend_for(id, [boxed(Health { owner: other, hp: 5 })]);

        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().owner(), other);
    }

    #[test]
    fn missing_type_is_none() {
        let list = Components::new();
        assert!(list.is_empty());
        assert!(list.get::<Health>().is_none());
    }
}
