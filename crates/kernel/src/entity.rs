use stagecraft_common::{AsAny, EntityId, NodeId, Transform};
use stagecraft_ecs::{Component, Components};
use stagecraft_scene::Node;

use crate::engine::Engine;
use crate::error::HookResult;

/// Lifecycle hooks for an entity. Every hook defaults to doing nothing.
///
/// Hooks run synchronously inside a tick. Work that spans several frames
/// has to be carried as state on the behaviour and advanced in `on_update`.
pub trait Behaviour: AsAny {
    /// Runs once, on the first tick the entity is enabled.
    fn on_start(&mut self, _ctx: &mut EntityCtx<'_>) -> HookResult {
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut EntityCtx<'_>) -> HookResult {
        Ok(())
    }

    /// Runs after every entity's `on_update` for the tick has completed.
    fn on_late_update(&mut self, _ctx: &mut EntityCtx<'_>) -> HookResult {
        Ok(())
    }

    /// Runs when the reap pass removes the entity.
    fn on_destroy(&mut self, _ctx: &mut EntityCtx<'_>) -> HookResult {
        Ok(())
    }
}

/// Behaviour for entities that only carry a node and components.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inert;

impl Behaviour for Inert {}

/// What a hook sees: the engine, the entity it runs for, and the tick's
/// time.
pub struct EntityCtx<'a> {
    pub engine: &'a mut Engine,
    pub entity: EntityId,
    pub delta: f32,
    pub paused: bool,
}

impl EntityCtx<'_> {
    /// Mark the running entity dead. Removal happens on the next reap pass.
    pub fn destroy_self(&mut self) -> bool {
        self.engine.destroy(self.entity)
    }

    pub fn node(&self) -> Option<&Node> {
        self.engine.entity_node(self.entity)
    }

    pub fn node_mut(&mut self) -> Option<&mut Node> {
        self.engine.entity_node_mut(self.entity)
    }

    pub fn components(&self) -> Option<&Components> {
        self.engine.components(self.entity)
    }

    pub fn components_mut(&mut self) -> Option<&mut Components> {
        self.engine.components_mut(self.entity)
    }
}

/// Snapshot of an entity's lifecycle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityState {
    pub enabled: bool,
    pub did_start: bool,
    pub is_dead: bool,
}

pub(crate) enum Child {
    Entity(Entity),
    Node(Node),
}

/// An entity under construction.
///
/// Building one registers nothing; it becomes live when passed to
/// [`Engine::instantiate`], which registers it and every nested entity.
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) node: Node,
    pub(crate) enabled: bool,
    pub(crate) behaviour: Box<dyn Behaviour>,
    pub(crate) components: Components,
    pub(crate) children: Vec<Child>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            node: Node::new(name),
            enabled: true,
            behaviour: Box::new(Inert),
            components: Components::new(),
            children: Vec::new(),
        }
    }

    /// The id this entity will be tracked under. Components take it at
    /// construction.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn with_behaviour(mut self, behaviour: impl Behaviour) -> Self {
        self.behaviour = Box::new(behaviour);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.node.transform = transform;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Append components. No de-duplication.
    pub fn add_components<I>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Component>>,
    {
        self.components.extend_for(self.id, components);
        self
    }

    pub fn add_component(self, component: impl Component) -> Self {
        let boxed: Box<dyn Component> = Box::new(component);
        self.add_components([boxed])
    }

    /// Nest another entity beneath this one.
    pub fn with_child(mut self, child: Entity) -> Self {
        self.children.push(Child::Entity(child));
        self
    }

    /// Nest a plain scene node (a mesh, a light) beneath this entity.
    pub fn with_node(mut self, node: Node) -> Self {
        self.children.push(Child::Node(node));
        self
    }

    /// Ids of this entity and every entity nested in it, in pre-order.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut out = vec![self.id];
        for child in &self.children {
            if let Child::Entity(e) = child {
                out.extend(e.ids());
            }
        }
        out
    }
}

/// Engine-side bookkeeping for a live entity.
pub(crate) struct EntityRecord {
    pub(crate) node: NodeId,
    pub(crate) enabled: bool,
    pub(crate) did_start: bool,
    pub(crate) dead: bool,
    /// `None` only while one of its own hooks is running.
    pub(crate) behaviour: Option<Box<dyn Behaviour>>,
    pub(crate) components: Components,
}

impl EntityRecord {
    pub(crate) fn state(&self) -> EntityState {
        EntityState {
            enabled: self.enabled,
            did_start: self.did_start,
            is_dead: self.dead,
        }
    }

    /// Eligible for update and late update.
    pub(crate) fn is_active(&self) -> bool {
        self.enabled && self.did_start && !self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(EntityId);

    impl Component for Marker {
        fn owner(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn builder_collects_nested_ids() {
        let child = Entity::new("child");
        let grandchild = Entity::new("grandchild");
        let (c, g) = (child.id(), grandchild.id());
        let root = Entity::new("root")
            .with_node(Node::new("mesh"))
            .with_child(child.with_child(grandchild));

        assert_eq!(root.ids(), vec![root.id(), c, g]);
        assert_eq!(root.name(), "root");
    }

    #[test]
    fn add_components_chains() {
        let e = Entity::new("e");
        let id = e.id();
        let e = e.add_component(Marker(id)).add_component(Marker(id));
        assert_eq!(e.components.len(), 2);
    }

    #[test]
    fn defaults() {
        let e = Entity::new("e");
        assert!(e.enabled);
        assert!(e.behaviour.as_ref().as_any().is::<Inert>());
        assert!(!Entity::new("x").with_enabled(false).enabled);
    }
}
