use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use stagecraft_common::{EntityId, NodeId};
use stagecraft_ecs::{Component, Components};
use stagecraft_render::{DebugTextRenderer, Renderer, Surface};
use stagecraft_scene::{Camera, Node, Scene};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::entity::{Behaviour, Child, Entity, EntityCtx, EntityRecord, EntityState};
use crate::error::EngineError;
use crate::event::{FrameReport, Hook, LifecycleEvent, Subject};
use crate::plugin::{Execution, Plugin, PluginCtx, PluginSlot};

#[derive(Debug, Clone, Copy)]
struct FrameTime {
    delta: f32,
    paused: bool,
}

/// The scheduler and the state it drives.
///
/// Owns the scene, the active camera and renderer, the clock, the live
/// entity table and the plugin table. Both tables iterate in insertion
/// order. The host calls [`Engine::frame`] once per display refresh; all
/// mutation happens synchronously inside that call or through the
/// registration APIs between calls.
pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    camera: Option<Camera>,
    renderer: Option<Box<dyn Renderer>>,
    clock: Clock,
    paused: bool,
    running: bool,
    in_tick: bool,
    frame: u64,
    entities: IndexMap<EntityId, EntityRecord>,
    plugins: IndexMap<&'static str, PluginSlot>,
    /// Ids marked dead since the last reap pass, in destroy order.
    pending_deaths: Vec<EntityId>,
    events: Vec<LifecycleEvent>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with no renderer or camera. Call
    /// [`Engine::initialize`] before the first tick.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            clock: Clock::from_config(&config),
            paused: config.start_paused,
            config,
            scene: Scene::new(),
            camera: None,
            renderer: None,
            running: false,
            in_tick: false,
            frame: 0,
            entities: IndexMap::new(),
            plugins: IndexMap::new(),
            pending_deaths: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Setup and teardown ---

    /// Install a renderer and camera, replacing (and disposing) any previous
    /// renderer. Omitted parts get defaults: a [`DebugTextRenderer`] on the
    /// configured surface and a [`Camera::default`] sized to that surface.
    pub fn initialize(
        &mut self,
        renderer: Option<Box<dyn Renderer>>,
        camera: Option<Camera>,
    ) -> Result<&Surface, EngineError> {
        if self.in_tick {
            return Err(EngineError::Reentrant);
        }
        if let Some(mut old) = self.renderer.take() {
            info!("replacing active renderer");
            old.dispose();
        }
        let renderer: Box<dyn Renderer> = match renderer {
            Some(renderer) => renderer,
            None => Box::new(DebugTextRenderer::with_surface(self.config.surface.clone())),
        };
        let camera = camera.unwrap_or_else(|| {
            let mut camera = Camera::default();
            let surface = renderer.surface();
            camera.set_viewport(surface.width, surface.height);
            camera
        });

        self.camera = Some(camera);
        self.renderer = Some(renderer);
        self.clock.reset();
        self.events.push(LifecycleEvent::Initialized);
        info!("engine initialized");

        self.renderer
            .as_deref()
            .map(|r| r.surface())
            .ok_or(EngineError::MissingRenderer)
    }

    /// True once both a renderer and a camera are installed.
    pub fn is_initialized(&self) -> bool {
        self.renderer.is_some() && self.camera.is_some()
    }

    /// Begin frame delivery. Redundant calls are logged and ignored.
    pub fn start(&mut self) {
        if self.running {
            warn!("Engine::start called while already running");
            return;
        }
        self.running = true;
        self.clock.reset();
        info!("engine started");
    }

    /// Halt frame delivery. Redundant calls are logged and ignored.
    pub fn stop(&mut self) {
        if !self.running {
            warn!("Engine::stop called while not running");
            return;
        }
        self.running = false;
        info!("engine stopped");
    }

    /// True between [`Engine::start`] and [`Engine::stop`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop, dispose every plugin, destroy every entity and drop the
    /// renderer and camera. The engine must be initialized again before it
    /// can render.
    pub fn dispose(&mut self) -> Result<(), EngineError> {
        if self.in_tick {
            return Err(EngineError::Reentrant);
        }
        self.in_tick = true;
        self.running = false;
        self.clear_plugins();

        let time = self.current_time();
        let mut report = FrameReport::new(self.frame, time.delta);
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for record in self.entities.values_mut() {
            record.dead = true;
        }
        for id in &ids {
            self.call_entity(Hook::Destroy, *id, time, &mut report);
        }
        // Destroy hooks may have registered plugins.
        self.clear_plugins();
        // Hooks may have instantiated more entities; they go too.
        for id in self.entities.keys() {
            self.events.push(LifecycleEvent::Reaped { id: *id });
        }
        self.entities.clear();
        self.pending_deaths.clear();
        self.scene.clear();

        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        self.camera = None;
        self.in_tick = false;
        self.events.push(LifecycleEvent::Disposed);
        info!(failures = report.failures.len(), "engine disposed");
        Ok(())
    }

    // --- Frame loop ---

    /// Host per-frame callback: runs one tick while the engine is started,
    /// otherwise does nothing and returns `Ok(None)`.
    pub fn frame(&mut self) -> Result<Option<FrameReport>, EngineError> {
        if !self.running {
            return Ok(None);
        }
        self.tick().map(Some)
    }

    /// Run one tick regardless of the running flag.
    ///
    /// A missing camera or renderer aborts the tick at the render pass with
    /// an error; earlier passes of that tick have already run. Hook failures
    /// never abort a tick; they are collected in the report.
    pub fn tick(&mut self) -> Result<FrameReport, EngineError> {
        if self.in_tick {
            return Err(EngineError::Reentrant);
        }
        self.in_tick = true;
        let result = self.run_tick();
        self.in_tick = false;
        result
    }

    fn run_tick(&mut self) -> Result<FrameReport, EngineError> {
        let time = FrameTime {
            delta: self.clock.sample(),
            paused: self.paused,
        };
        self.frame += 1;
        let mut report = FrameReport::new(self.frame, time.delta);

        self.initialize_plugins(time, &mut report);
        self.start_entities(time, &mut report);
        self.reap(time, &mut report);
        if let Err(err) = self.render() {
            error!(frame = self.frame, error = %err, "render pass failed");
            return Err(err);
        }
        self.run_plugins(Hook::Update, time, &mut report);
        self.run_entities(Hook::Update, time, &mut report);
        self.run_entities(Hook::LateUpdate, time, &mut report);
        self.run_plugins(Hook::LateUpdate, time, &mut report);

        debug!(
            frame = report.frame,
            delta = report.delta,
            started = report.started,
            reaped = report.reaped.len(),
            updated = report.updated,
            failures = report.failures.len(),
            "tick complete"
        );
        Ok(report)
    }

    fn current_time(&self) -> FrameTime {
        FrameTime {
            delta: self.clock.delta(),
            paused: self.paused,
        }
    }

    fn initialize_plugins(&mut self, time: FrameTime, report: &mut FrameReport) {
        let keys: Vec<&'static str> = self.plugins.keys().copied().collect();
        for key in keys {
            match self.plugins.get_mut(key) {
                Some(slot) if slot.enabled && !slot.initialized && slot.plugin.is_some() => {
                    slot.initialized = true;
                }
                _ => continue,
            }
            self.call_plugin(Hook::Initialize, key, time, report);
        }
    }

    fn start_entities(&mut self, time: FrameTime, report: &mut FrameReport) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            match self.entities.get_mut(&id) {
                Some(r) if r.enabled && !r.did_start && !r.dead => r.did_start = true,
                _ => continue,
            }
            report.started += 1;
            self.events.push(LifecycleEvent::Started { id });
            self.call_entity(Hook::Start, id, time, report);
        }
    }

    /// Drain the pending-death queue. Each dead entity is detached from the
    /// scene, then it and every entity nested under it get `on_destroy` and
    /// leave the live table in one batch.
    fn reap(&mut self, time: FrameTime, report: &mut FrameReport) {
        let pending = std::mem::take(&mut self.pending_deaths);
        for id in pending {
            // Already gone with an ancestor reaped earlier in this pass.
            let Some(node) = self.entities.get(&id).map(|r| r.node) else {
                continue;
            };
            if let Err(err) = self.scene.detach(node) {
                error!(entity = %id, error = %err, "failed to detach dead entity");
            }

            let mut doomed = self.scene.entities_in_subtree(node);
            if !doomed.contains(&id) {
                doomed.insert(0, id);
            }
            doomed.retain(|e| self.entities.contains_key(e));
            for e in &doomed {
                if let Some(record) = self.entities.get_mut(e) {
                    record.dead = true;
                }
            }
            for e in &doomed {
                self.call_entity(Hook::Destroy, *e, time, report);
            }

            // Destroy hooks may have nested new entities under the dead node.
            for late in self.scene.entities_in_subtree(node) {
                if !doomed.contains(&late) && self.entities.contains_key(&late) {
                    doomed.push(late);
                }
            }
            let batch: HashSet<EntityId> = doomed.iter().copied().collect();
            self.entities.retain(|e, _| !batch.contains(e));
            if let Err(err) = self.scene.remove_subtree(node) {
                error!(entity = %id, error = %err, "failed to remove dead entity subtree");
            }

            debug!(entity = %id, removed = doomed.len(), "reaped entity subtree");
            for e in &doomed {
                self.events.push(LifecycleEvent::Reaped { id: *e });
            }
            report.reaped.extend(doomed);
        }
    }

    fn render(&mut self) -> Result<(), EngineError> {
        let camera = self.camera.as_ref().ok_or(EngineError::MissingCamera)?;
        let renderer = self
            .renderer
            .as_deref_mut()
            .ok_or(EngineError::MissingRenderer)?;
        renderer.render(&self.scene, camera)?;
        Ok(())
    }

    fn run_plugins(&mut self, hook: Hook, time: FrameTime, report: &mut FrameReport) {
        let keys: Vec<&'static str> = self.plugins.keys().copied().collect();
        for key in keys {
            // Plugins registered or enabled mid-tick wait for the next init pass.
            if self.plugins.get(key).is_some_and(|s| s.enabled && s.initialized) {
                self.call_plugin(hook, key, time, report);
            }
        }
    }

    fn run_entities(&mut self, hook: Hook, time: FrameTime, report: &mut FrameReport) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            if !self.entities.get(&id).is_some_and(EntityRecord::is_active) {
                continue;
            }
            if hook == Hook::Update {
                report.updated += 1;
            }
            self.call_entity(hook, id, time, report);
        }
    }

    /// Run one entity hook. The behaviour is taken out of its record for the
    /// duration so the hook can borrow the engine mutably.
    fn call_entity(&mut self, hook: Hook, id: EntityId, time: FrameTime, report: &mut FrameReport) {
        let Some(mut behaviour) = self.entities.get_mut(&id).and_then(|r| r.behaviour.take())
        else {
            return;
        };
        let result = {
            let mut ctx = EntityCtx {
                engine: &mut *self,
                entity: id,
                delta: time.delta,
                paused: time.paused,
            };
            match hook {
                Hook::Start => behaviour.on_start(&mut ctx),
                Hook::Update => behaviour.on_update(&mut ctx),
                Hook::LateUpdate => behaviour.on_late_update(&mut ctx),
                Hook::Destroy => behaviour.on_destroy(&mut ctx),
                Hook::Initialize => Ok(()),
            }
        };
        if let Some(record) = self.entities.get_mut(&id) {
            record.behaviour = Some(behaviour);
        }
        if let Err(err) = result {
            report.record(Subject::Entity(id), hook, err);
        }
    }

    /// Run one plugin hook, taking the plugin out of its slot meanwhile.
    fn call_plugin(
        &mut self,
        hook: Hook,
        key: &'static str,
        time: FrameTime,
        report: &mut FrameReport,
    ) {
        let Some(mut plugin) = self.plugins.get_mut(key).and_then(|s| s.plugin.take()) else {
            return;
        };
        let result = {
            let mut ctx = PluginCtx {
                engine: &mut *self,
                delta: time.delta,
                paused: time.paused,
            };
            match hook {
                Hook::Initialize => plugin.initialize(&mut ctx),
                Hook::Update => plugin.update(&mut ctx),
                Hook::LateUpdate => plugin.late_update(&mut ctx),
                Hook::Start | Hook::Destroy => Ok(()),
            }
        };
        self.restore_plugin(key, plugin);
        if let Err(err) = result {
            report.record(Subject::Plugin(key), hook, err);
        }
    }

    /// Put a plugin back after its hook. If the hook replaced or cleared its
    /// own slot, the returning instance is disposed instead.
    fn restore_plugin(&mut self, key: &'static str, mut plugin: Box<dyn Plugin>) {
        match self.plugins.get_mut(key) {
            Some(slot) if slot.plugin.is_none() => slot.plugin = Some(plugin),
            _ => {
                plugin.dispose();
                self.events.push(LifecycleEvent::PluginDisposed { key });
            }
        }
    }

    // --- Pause and time ---

    /// Advisory flag handed to every hook. It never stops frame delivery.
    /// A change made inside a tick is seen from the next tick on.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Current value of the advisory pause flag.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The frame clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Ticks run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // --- Entities ---

    /// Register `entity` and every entity nested in it, attaching the
    /// subtree under `parent` (the scene root when `None`). The entities are
    /// started on the next tick.
    pub fn instantiate(
        &mut self,
        entity: Entity,
        parent: Option<NodeId>,
    ) -> Result<EntityId, EngineError> {
        let parent = parent.unwrap_or_else(|| self.scene.root());
        if !self.scene.contains(parent) {
            return Err(stagecraft_scene::SceneError::ParentNotFound(parent).into());
        }
        let id = self.register(entity, parent)?;
        debug!(entity = %id, "instantiated");
        Ok(id)
    }

    fn register(&mut self, entity: Entity, parent: NodeId) -> Result<EntityId, EngineError> {
        let Entity {
            id,
            node,
            enabled,
            behaviour,
            components,
            children,
        } = entity;
        let node_id = self.scene.add(parent, node.with_entity(id))?;
        self.entities.insert(
            id,
            EntityRecord {
                node: node_id,
                enabled,
                did_start: false,
                dead: false,
                behaviour: Some(behaviour),
                components,
            },
        );
        self.events.push(LifecycleEvent::Instantiated { id, node: node_id });

        for child in children {
            match child {
                Child::Entity(e) => {
                    self.register(e, node_id)?;
                }
                Child::Node(n) => {
                    self.scene.add(node_id, n)?;
                }
            }
        }
        Ok(id)
    }

    /// Mark an entity dead. It stops receiving updates at once and is
    /// removed, with everything nested under it, on the next reap pass.
    /// Returns `false` if the entity is unknown or already dead.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(record) if !record.dead => {
                record.dead = true;
                self.pending_deaths.push(id);
                self.events.push(LifecycleEvent::DestroyRequested { id });
                debug!(entity = %id, "destroy requested");
                true
            }
            _ => false,
        }
    }

    /// True while the entity is in the live table, dead-but-unreaped
    /// included.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Lifecycle flags of a tracked entity.
    pub fn entity_state(&self, id: EntityId) -> Option<EntityState> {
        self.entities.get(&id).map(EntityRecord::state)
    }

    /// Enable or disable delivery of start/update/late update. Returns
    /// `false` for an unknown entity.
    pub fn set_entity_enabled(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.entities.get_mut(&id) {
            Some(record) => {
                record.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Tracked entities, dead-but-unreaped included.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entity ids in registration order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Ids waiting for the next reap pass.
    pub fn pending_deaths(&self) -> &[EntityId] {
        &self.pending_deaths
    }

    /// Scene node an entity is attached to.
    pub fn entity_node_id(&self, id: EntityId) -> Option<NodeId> {
        self.entities.get(&id).map(|r| r.node)
    }

    /// The entity's scene node.
    pub fn entity_node(&self, id: EntityId) -> Option<&Node> {
        self.entity_node_id(id).and_then(|n| self.scene.get(n))
    }

    /// The entity's scene node, mutably.
    pub fn entity_node_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        let node = self.entity_node_id(id)?;
        self.scene.get_mut(node)
    }

    /// The behaviour of an entity as its concrete type. `None` while that
    /// entity's own hook is running.
    pub fn behaviour<T: Behaviour>(&self, id: EntityId) -> Option<&T> {
        self.entities
            .get(&id)?
            .behaviour
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutable counterpart of [`Engine::behaviour`].
    pub fn behaviour_mut<T: Behaviour>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(&id)?
            .behaviour
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    // --- Components ---

    /// Append components to a live entity. No de-duplication.
    pub fn add_components<I>(&mut self, id: EntityId, components: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = Box<dyn Component>>,
    {
        let record = self
            .entities
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        record.components.extend_for(id, components);
        Ok(())
    }

    /// Components attached to an entity.
    pub fn components(&self, id: EntityId) -> Option<&Components> {
        self.entities.get(&id).map(|r| &r.components)
    }

    /// Components attached to an entity, mutably.
    pub fn components_mut(&mut self, id: EntityId) -> Option<&mut Components> {
        self.entities.get_mut(&id).map(|r| &mut r.components)
    }

    /// Every component of type `T` on entities that are not dead, in entity
    /// registration order.
    pub fn components_of_type<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.entities
            .iter()
            .filter(|(_, r)| !r.dead)
            .flat_map(|(id, r)| r.components.iter_of::<T>().map(move |c| (*id, c)))
    }

    /// Visit every component of type `T` on entities that are not dead.
    pub fn for_each_component_mut<T, F>(&mut self, mut f: F)
    where
        T: Component,
        F: FnMut(EntityId, &mut T),
    {
        for (id, record) in self.entities.iter_mut().filter(|(_, r)| !r.dead) {
            for component in record.components.iter_of_mut::<T>() {
                f(*id, component);
            }
        }
    }

    // --- Discovery ---

    /// First scene node with this name. Linear scan; cache the result.
    pub fn find_object_by_name(&self, name: &str) -> Option<NodeId> {
        self.scene.find_by_name(name)
    }

    /// Every scene node with this name. Linear scan; cache the result.
    pub fn find_objects_by_name(&self, name: &str) -> Vec<NodeId> {
        self.scene.find_all_by_name(name)
    }

    /// First live entity with this name, in registration order. Linear
    /// scan; cache the result.
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, r)| self.scene.get(r.node).is_some_and(|n| n.name == name))
            .map(|(id, _)| *id)
    }

    /// Every live entity with this name. Linear scan; cache the result.
    pub fn find_entities_by_name(&self, name: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, r)| self.scene.get(r.node).is_some_and(|n| n.name == name))
            .map(|(id, _)| *id)
            .collect()
    }

    // --- Scene, camera, renderer ---

    /// Read-only scene access. Structure changes go through
    /// [`Engine::instantiate`], [`Engine::destroy`], [`Engine::attach_node`]
    /// and [`Engine::detach_node`].
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Edit a node's name, transform or visibility.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.scene.get_mut(id)
    }

    /// Attach a plain node under an existing non-root node. The scene root
    /// is managed: adding to it directly is rejected; use
    /// [`Engine::instantiate`].
    pub fn attach_node(&mut self, parent: NodeId, node: Node) -> Result<NodeId, EngineError> {
        if parent == self.scene.root() {
            error!(
                node = %node.name,
                "refusing to add a node to the scene root; use Engine::instantiate"
            );
            return Err(EngineError::ManagedRoot);
        }
        if node.entity().is_some() {
            error!(node = %node.name, "refusing to attach an entity-tagged node");
            return Err(EngineError::EntityNode);
        }
        Ok(self.scene.add(parent, node)?)
    }

    /// Remove a plain node and its subtree. Subtrees holding live entities
    /// are rejected; destroy those entities instead.
    pub fn detach_node(&mut self, node: NodeId) -> Result<Vec<Node>, EngineError> {
        let owned = self.scene.entities_in_subtree(node);
        if owned.iter().any(|e| self.entities.contains_key(e)) {
            return Err(EngineError::OwnsEntities(node));
        }
        Ok(self.scene.remove_subtree(node)?)
    }

    /// The active camera.
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// The active camera, mutably.
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Replace the active camera, returning the previous one.
    pub fn set_camera(&mut self, camera: Camera) -> Option<Camera> {
        self.camera.replace(camera)
    }

    /// The active renderer.
    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    /// The active renderer as its concrete type.
    pub fn renderer_as<R: Renderer>(&self) -> Option<&R> {
        self.renderer.as_deref()?.as_any().downcast_ref::<R>()
    }

    // --- Plugins ---

    /// Register plugins. Once plugins run their `update` immediately with
    /// the clock's last delta and are dropped. Always plugins enter the
    /// table under their key; a previous plugin with the same key is
    /// disposed and replaced.
    pub fn add_plugins<I>(&mut self, plugins: I)
    where
        I: IntoIterator<Item = Box<dyn Plugin>>,
    {
        for mut plugin in plugins {
            let key = plugin.key();
            match plugin.execution() {
                Execution::Once => {
                    let time = self.current_time();
                    let result = {
                        let mut ctx = PluginCtx {
                            engine: &mut *self,
                            delta: time.delta,
                            paused: time.paused,
                        };
                        plugin.update(&mut ctx)
                    };
                    if let Err(err) = result {
                        error!(plugin = key, error = %err, "once plugin failed");
                    }
                    self.events.push(LifecycleEvent::PluginRan { key });
                    debug!(plugin = key, "once plugin ran");
                }
                Execution::Always => {
                    if let Some(mut previous) = self.plugins.insert(key, PluginSlot::new(plugin)) {
                        warn!(plugin = key, "plugin key already registered; replacing");
                        if let Some(mut old) = previous.plugin.take() {
                            old.dispose();
                        }
                        self.events.push(LifecycleEvent::PluginReplaced { key });
                    }
                    self.events.push(LifecycleEvent::PluginRegistered { key });
                    debug!(plugin = key, "plugin registered");
                }
            }
        }
    }

    /// Register a single plugin. See [`Engine::add_plugins`].
    pub fn add_plugin(&mut self, plugin: impl Plugin) {
        let boxed: Box<dyn Plugin> = Box::new(plugin);
        self.add_plugins([boxed]);
    }

    /// Plugin registered under `key`. `None` when absent or while that
    /// plugin's own hook is running.
    pub fn get_plugin_by_type_name(&self, key: &str) -> Option<&dyn Plugin> {
        self.plugins.get(key)?.plugin.as_deref()
    }

    /// Registered plugin of type `T`. Looks up the default key first, then
    /// falls back to scanning for plugins with a custom key.
    pub fn plugin<T: Plugin>(&self) -> Option<&T> {
        let direct = self
            .get_plugin_by_type_name(std::any::type_name::<T>())
            .and_then(|p| p.as_any().downcast_ref::<T>());
        direct.or_else(|| {
            self.plugins
                .values()
                .find_map(|s| s.plugin.as_deref()?.as_any().downcast_ref::<T>())
        })
    }

    /// Mutable counterpart of [`Engine::plugin`].
    pub fn plugin_mut<T: Plugin>(&mut self) -> Option<&mut T> {
        let key = std::any::type_name::<T>();
        let direct = self
            .plugins
            .get(key)
            .and_then(|s| s.plugin.as_deref())
            .is_some_and(|p| p.as_any().is::<T>());
        if direct {
            return self
                .plugins
                .get_mut(key)?
                .plugin
                .as_deref_mut()?
                .as_any_mut()
                .downcast_mut::<T>();
        }
        self.plugins
            .values_mut()
            .find_map(|s| s.plugin.as_deref_mut()?.as_any_mut().downcast_mut::<T>())
    }

    /// Enable or disable a plugin. Disabled plugins keep their slot but are
    /// skipped by every pass. Returns `false` for an unknown key.
    pub fn set_plugin_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.plugins.get_mut(key) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether the plugin under `key` has run `initialize`. `None` for an unknown key.
    pub fn is_plugin_initialized(&self, key: &str) -> Option<bool> {
        self.plugins.get(key).map(|s| s.initialized)
    }

    /// Registered plugin keys in registration order.
    pub fn plugin_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }

    /// Always plugins in the table.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Dispose every Always plugin and empty the table.
    pub fn clear_plugins(&mut self) {
        let slots = std::mem::take(&mut self.plugins);
        for (key, mut slot) in slots {
            if let Some(mut plugin) = slot.plugin.take() {
                plugin.dispose();
            }
            self.events.push(LifecycleEvent::PluginDisposed { key });
        }
        debug!("plugins cleared");
    }

    // --- Event log ---

    /// Lifecycle events logged since the last drain.
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Take the lifecycle event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }
}
