use serde::Serialize;
use stagecraft_common::EntityId;
use stagecraft_kernel::Engine;

/// Engine inspector for developer tooling.
///
/// Provides read-only queries against engine state for debugging and
/// command-line output.
pub struct EngineInspector;

impl EngineInspector {
    /// Produce a summary of the engine state.
    pub fn summary(engine: &Engine) -> EngineSummary {
        EngineSummary {
            frame: engine.frame_count(),
            elapsed: engine.clock().elapsed(),
            running: engine.is_running(),
            paused: engine.is_paused(),
            entity_count: engine.entity_count(),
            pending_deaths: engine.pending_deaths().len(),
            scene_nodes: engine.scene().len().saturating_sub(1),
            plugins: engine.plugin_keys().map(str::to_owned).collect(),
            logged_events: engine.events().len(),
        }
    }

    /// Lifecycle flags and placement of a single entity.
    pub fn inspect_entity(engine: &Engine, id: EntityId) -> Option<EntityInfo> {
        let state = engine.entity_state(id)?;
        let node = engine.entity_node(id)?;
        let depth = engine
            .entity_node_id(id)
            .and_then(|n| engine.scene().depth(n))
            .unwrap_or(0);
        let p = node.transform.position;
        let s = node.transform.scale;
        Some(EntityInfo {
            id,
            name: node.name.clone(),
            enabled: state.enabled,
            did_start: state.did_start,
            is_dead: state.is_dead,
            components: engine.components(id).map_or(0, |c| c.len()),
            depth,
            position: [p.x, p.y, p.z],
            scale: [s.x, s.y, s.z],
        })
    }

    /// Every live entity in registration order.
    pub fn list_entities(engine: &Engine) -> Vec<EntityInfo> {
        engine
            .entity_ids()
            .filter_map(|id| Self::inspect_entity(engine, id))
            .collect()
    }
}

/// Summary of engine state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub frame: u64,
    pub elapsed: f64,
    pub running: bool,
    pub paused: bool,
    pub entity_count: usize,
    pub pending_deaths: usize,
    /// Nodes below the scene root.
    pub scene_nodes: usize,
    pub plugins: Vec<String>,
    pub logged_events: usize,
}

impl std::fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Engine: frame={} elapsed={:.3}s running={} paused={} ",
            self.frame, self.elapsed, self.running, self.paused,
        )?;
        write!(
            f,
            "entities={} pending_deaths={} nodes={} plugins={} events={}",
            self.entity_count,
            self.pending_deaths,
            self.scene_nodes,
            self.plugins.len(),
            self.logged_events,
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub enabled: bool,
    pub did_start: bool,
    pub is_dead: bool,
    pub components: usize,
    /// Depth of the entity's node below the scene root.
    pub depth: usize,
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match (self.is_dead, self.did_start, self.enabled) {
            (true, _, _) => "dead",
            (_, _, false) => "disabled",
            (_, false, _) => "pending",
            _ => "live",
        };
        write!(
            f,
            "{:indent$}{} [{}] {} pos=({:.2}, {:.2}, {:.2}) components={}",
            "",
            self.name,
            self.id.short(),
            status,
            self.position[0],
            self.position[1],
            self.position[2],
            self.components,
            indent = self.depth.saturating_sub(1) * 2,
        )
    }
}
