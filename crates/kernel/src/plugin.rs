use stagecraft_common::AsAny;

use crate::engine::Engine;
use crate::error::HookResult;

/// How often a plugin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// `update` runs once, synchronously, when the plugin is added. The
    /// plugin is then dropped and never initialized or disposed.
    Once,
    /// Kept in the plugin table and driven every tick.
    #[default]
    Always,
}

/// An engine-wide extension driven by the scheduler.
///
/// Plugins add cross-cutting systems (input, component processing) without
/// the engine knowing their types. Other code finds a registered plugin
/// through [`Engine::plugin`] or [`Engine::get_plugin_by_type_name`].
pub trait Plugin: AsAny {
    /// Stable key the plugin is registered under. Registering a second
    /// Always plugin with the same key replaces the first.
    fn key(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn execution(&self) -> Execution {
        Execution::Always
    }

    /// Runs once, on the first tick the plugin is enabled.
    fn initialize(&mut self, _ctx: &mut PluginCtx<'_>) -> HookResult {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut PluginCtx<'_>) -> HookResult {
        Ok(())
    }

    fn late_update(&mut self, _ctx: &mut PluginCtx<'_>) -> HookResult {
        Ok(())
    }

    /// Runs when the plugin leaves the table.
    fn dispose(&mut self) {}
}

/// What a plugin hook sees.
pub struct PluginCtx<'a> {
    pub engine: &'a mut Engine,
    pub delta: f32,
    pub paused: bool,
}

pub(crate) struct PluginSlot {
    /// `None` only while one of the plugin's own hooks is running.
    pub(crate) plugin: Option<Box<dyn Plugin>>,
    pub(crate) enabled: bool,
    pub(crate) initialized: bool,
}

impl PluginSlot {
    pub(crate) fn new(plugin: Box<dyn Plugin>) -> Self {
        Self {
            plugin: Some(plugin),
            enabled: true,
            initialized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Radar;
    impl Plugin for Radar {}

    struct Named;
    impl Plugin for Named {
        fn key(&self) -> &'static str {
            "named"
        }
        fn execution(&self) -> Execution {
            Execution::Once
        }
    }

    #[test]
    fn default_key_is_type_name() {
        let boxed: Box<dyn Plugin> = Box::new(Radar);
        assert!(boxed.key().ends_with("Radar"));
        assert_eq!(boxed.execution(), Execution::Always);
    }

    #[test]
    fn key_and_execution_can_be_overridden() {
        let boxed: Box<dyn Plugin> = Box::new(Named);
        assert_eq!(boxed.key(), "named");
        assert_eq!(boxed.execution(), Execution::Once);
    }
}
