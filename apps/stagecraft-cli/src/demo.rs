//! Demo scene: a spinning turntable with a bobbing beacon, and a spark that
//! burns out after half a second.

use glam::{Quat, Vec3};
use stagecraft_kernel::{
    Behaviour, Component, Entity, EntityCtx, EntityId, Execution, HookResult, Node, Plugin,
    PluginCtx, Transform,
};
use tracing::info;

/// Spin rate about local Y, applied by [`SpinSystem`].
pub struct Spin {
    owner: EntityId,
    pub radians_per_second: f32,
}

impl Spin {
    pub fn new(owner: EntityId, radians_per_second: f32) -> Self {
        Self {
            owner,
            radians_per_second,
        }
    }
}

impl Component for Spin {
    fn owner(&self) -> EntityId {
        self.owner
    }
}

/// Rotates every entity carrying a [`Spin`] component.
#[derive(Debug, Default)]
pub struct SpinSystem;

impl Plugin for SpinSystem {
    fn update(&mut self, ctx: &mut PluginCtx<'_>) -> HookResult {
        if ctx.paused {
            return Ok(());
        }
        let delta = ctx.delta;
        let spins: Vec<(EntityId, f32)> = ctx
            .engine
            .components_of_type::<Spin>()
            .map(|(id, spin)| (id, spin.radians_per_second))
            .collect();
        for (id, rate) in spins {
            if let Some(node) = ctx.engine.entity_node_mut(id) {
                let turn = Quat::from_rotation_y(rate * delta);
                node.transform.rotation = turn * node.transform.rotation;
            }
        }
        Ok(())
    }
}

/// Bobs its node up and down around where it started.
pub struct Bob {
    amplitude: f32,
    hertz: f32,
    phase: f32,
    base: Vec3,
}

impl Bob {
    pub fn new(amplitude: f32, hertz: f32) -> Self {
        Self {
            amplitude,
            hertz,
            phase: 0.0,
            base: Vec3::ZERO,
        }
    }
}

impl Behaviour for Bob {
    fn on_start(&mut self, ctx: &mut EntityCtx<'_>) -> HookResult {
        if let Some(node) = ctx.node() {
            self.base = node.transform.position;
        }
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut EntityCtx<'_>) -> HookResult {
        if ctx.paused {
            return Ok(());
        }
        self.phase += ctx.delta * self.hertz * std::f32::consts::TAU;
        let y = self.amplitude * self.phase.sin();
        let base = self.base;
        if let Some(node) = ctx.node_mut() {
            node.transform.position = base + Vec3::Y * y;
        }
        Ok(())
    }
}

/// Destroys its entity after a fixed lifetime.
pub struct Fuse {
    remaining: f32,
}

impl Fuse {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

impl Behaviour for Fuse {
    fn on_update(&mut self, ctx: &mut EntityCtx<'_>) -> HookResult {
        self.remaining -= ctx.delta;
        if self.remaining <= 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &mut EntityCtx<'_>) -> HookResult {
        info!(entity = %ctx.entity, "fuse burned out");
        Ok(())
    }
}

/// Builds the demo scene once, at registration.
#[derive(Debug, Default)]
pub struct DemoSetup;

impl Plugin for DemoSetup {
    fn execution(&self) -> Execution {
        Execution::Once
    }

    fn update(&mut self, ctx: &mut PluginCtx<'_>) -> HookResult {
        let turntable = Entity::new("turntable");
        let spin = Spin::new(turntable.id(), std::f32::consts::FRAC_PI_2);
        let turntable = turntable
            .add_component(spin)
            .with_node(Node::new("platter"))
            .with_child(
                Entity::new("beacon")
                    .with_transform(Transform::from_position(Vec3::new(0.0, 1.5, 0.0)))
                    .with_behaviour(Bob::new(0.25, 0.5)),
            );
        ctx.engine.instantiate(turntable, None)?;

        let spark = Entity::new("spark")
            .with_transform(Transform::from_position(Vec3::new(3.0, 0.5, 0.0)))
            .with_behaviour(Fuse::new(0.5));
        ctx.engine.instantiate(spark, None)?;
        Ok(())
    }
}
