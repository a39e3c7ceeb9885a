use std::fmt;

use stagecraft_common::{EntityId, NodeId};
use tracing::error;

/// A lifecycle transition recorded by the engine.
///
/// The log is append-only until drained; tooling and tests read it to see
/// what happened in which order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Initialized,
    Instantiated { id: EntityId, node: NodeId },
    Started { id: EntityId },
    DestroyRequested { id: EntityId },
    Reaped { id: EntityId },
    PluginRegistered { key: &'static str },
    /// An Always plugin with the same key was already registered and has
    /// been disposed in favour of the new one.
    PluginReplaced { key: &'static str },
    /// A Once plugin ran at registration and was dropped.
    PluginRan { key: &'static str },
    PluginDisposed { key: &'static str },
    Disposed,
}

/// The hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Initialize,
    Start,
    Update,
    LateUpdate,
    Destroy,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "initialize",
            Self::Start => "on_start",
            Self::Update => "update",
            Self::LateUpdate => "late_update",
            Self::Destroy => "on_destroy",
        };
        f.write_str(name)
    }
}

/// Who owned a failing hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Entity(EntityId),
    Plugin(&'static str),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity {id}"),
            Self::Plugin(key) => write!(f, "plugin {key}"),
        }
    }
}

/// A hook that returned an error during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub subject: Subject,
    pub hook: Hook,
    pub message: String,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub delta: f32,
    /// Entities whose `on_start` fired this tick.
    pub started: usize,
    /// Entities removed by the reap pass, nested ones included.
    pub reaped: Vec<EntityId>,
    /// Entities that received `on_update` this tick.
    pub updated: usize,
    pub failures: Vec<HookFailure>,
}

impl FrameReport {
    pub(crate) fn new(frame: u64, delta: f32) -> Self {
        Self {
            frame,
            delta,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, subject: Subject, hook: Hook, err: anyhow::Error) {
        error!(%subject, %hook, error = %err, "hook failed; continuing tick");
        self.failures.push(HookFailure {
            subject,
            hook,
            message: format!("{err:#}"),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
