use stagecraft_kernel::{Engine, HookResult, Plugin, PluginCtx};
use tracing::debug;

use crate::state::{InputEvent, InputState};

/// Buffers host input events and exposes them as per-frame [`InputState`].
///
/// The host pushes events between ticks. The plugin folds them in during its
/// update, so register it before any plugin that reads input.
#[derive(Debug, Default)]
pub struct InputPlugin {
    queue: Vec<InputEvent>,
    state: InputState,
}

impl InputPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next tick.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.queue.extend(events);
    }

    /// Queue an event on the engine's input plugin. Returns `false` if no
    /// input plugin is registered.
    pub fn send(engine: &mut Engine, event: InputEvent) -> bool {
        match engine.plugin_mut::<InputPlugin>() {
            Some(input) => {
                input.push(event);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Plugin for InputPlugin {
    fn update(&mut self, _ctx: &mut PluginCtx<'_>) -> HookResult {
        if !self.queue.is_empty() {
            debug!(events = self.queue.len(), "folding input events");
        }
        for event in self.queue.drain(..) {
            self.state.apply(event);
        }
        Ok(())
    }

    fn late_update(&mut self, _ctx: &mut PluginCtx<'_>) -> HookResult {
        self.state.end_frame();
        Ok(())
    }
}
