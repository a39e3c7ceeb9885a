use stagecraft_common::{EntityId, NodeId};
use stagecraft_render::RenderError;
use stagecraft_scene::SceneError;

/// Result type returned by entity and plugin hooks.
///
/// Hook bodies are application code with heterogeneous failure types, so
/// any error converts into it with `?`.
pub type HookResult = anyhow::Result<()>;

/// Errors raised by the engine itself.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no active camera; call Engine::initialize before rendering")]
    MissingCamera,
    #[error("no active renderer; call Engine::initialize before rendering")]
    MissingRenderer,
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("entity {0} is not tracked")]
    EntityNotFound(EntityId),
    #[error("nodes cannot be attached to the scene root directly; use Engine::instantiate")]
    ManagedRoot,
    #[error("entity-tagged nodes can only be created by Engine::instantiate")]
    EntityNode,
    #[error("node {0:?} holds live entities; destroy them instead")]
    OwnsEntities(NodeId),
    #[error("engine re-entered from inside a tick")]
    Reentrant,
}
