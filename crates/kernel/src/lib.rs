//! Engine kernel: the per-frame scheduler that owns the scene, camera,
//! renderer, clock, live entities and plugins.
//!
//! # Invariants
//! - One clock sample per tick; every pass of that tick sees the same delta.
//! - Pass order: plugin init, entity start, reap, render, plugin update,
//!   entity update, entity late update, plugin late update.
//! - `on_start` fires at most once per entity, and only while enabled.
//! - A destroyed entity is reaped on the next reap pass together with every
//!   entity nested beneath it; it receives no update after being marked dead.
//! - A failing hook is logged and recorded; the rest of the tick still runs.

pub mod clock;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod plugin;

pub use clock::Clock;
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use entity::{Behaviour, Entity, EntityCtx, EntityState, Inert};
pub use error::{EngineError, HookResult};
pub use event::{FrameReport, Hook, HookFailure, LifecycleEvent, Subject};
pub use plugin::{Execution, Plugin, PluginCtx};

pub use stagecraft_common::{EntityId, NodeId, Transform};
pub use stagecraft_ecs::{Component, Components};
pub use stagecraft_render::{DebugTextRenderer, Renderer, Surface};
pub use stagecraft_scene::{Camera, Node, Scene};
