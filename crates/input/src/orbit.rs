use glam::{Vec2, Vec3};
use stagecraft_kernel::{Camera, HookResult, Plugin, PluginCtx};
use tracing::debug;

use crate::plugin::InputPlugin;
use crate::state::Button;

/// Orbits the active camera around a target point.
///
/// Dragging with the primary button rotates, the wheel dollies (positive
/// wheel moves away). Reads [`InputPlugin`] state, so register it after the
/// input plugin. Does nothing while the engine is paused.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    /// Exponential dolly rate per wheel unit.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits, measured from +Y.
    pub min_polar: f32,
    pub max_polar: f32,
    /// Fraction of rotation velocity lost per frame after release. `None`
    /// stops rotation as soon as the drag stops.
    pub damping: Option<f32>,
    target: Vec3,
    distance: f32,
    azimuth: f32,
    polar: f32,
    velocity: Vec2,
    synced: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 1.0,
            max_distance: 500.0,
            min_polar: 0.01,
            max_polar: std::f32::consts::PI - 0.01,
            damping: None,
            target: Vec3::ZERO,
            distance: 10.0,
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            velocity: Vec2::ZERO,
            synced: false,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = Some(damping.clamp(0.0, 1.0));
        self
    }

    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Orbit around a new point from the next update on.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Take the orbit parameters from where the camera currently is.
    pub fn sync_from(&mut self, camera: &Camera) {
        let offset = camera.position - camera.target;
        self.target = camera.target;
        self.distance = offset.length().clamp(self.min_distance, self.max_distance);
        self.polar = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(self.min_polar, self.max_polar);
        self.azimuth = offset.x.atan2(offset.z);
        self.synced = true;
    }

    fn offset(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.distance * Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth)
    }

    fn apply_to(&self, camera: &mut Camera) {
        camera.target = self.target;
        camera.position = self.target + self.offset();
    }
}

impl Plugin for OrbitControls {
    fn initialize(&mut self, ctx: &mut PluginCtx<'_>) -> HookResult {
        if let Some(camera) = ctx.engine.camera() {
            self.sync_from(camera);
            debug!(distance = self.distance, "orbit controls synced to camera");
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginCtx<'_>) -> HookResult {
        if ctx.paused {
            return Ok(());
        }
        let Some((dragging, drag, wheel)) = ctx.engine.plugin::<InputPlugin>().map(|input| {
            let state = input.state();
            (
                state.is_button_down(Button::Primary),
                state.pointer_delta(),
                state.wheel_delta(),
            )
        }) else {
            return Ok(());
        };
        if !self.synced {
            match ctx.engine.camera() {
                Some(camera) => self.sync_from(camera),
                None => return Ok(()),
            }
        }

        if dragging {
            self.velocity = -drag * self.rotate_speed;
        }
        self.azimuth += self.velocity.x;
        self.polar = (self.polar + self.velocity.y).clamp(self.min_polar, self.max_polar);
        match self.damping {
            Some(damping) => self.velocity *= 1.0 - damping,
            None => self.velocity = Vec2::ZERO,
        }
        if wheel != 0.0 {
            self.distance = (self.distance * (wheel * self.zoom_speed).exp())
                .clamp(self.min_distance, self.max_distance);
        }

        if let Some(camera) = ctx.engine.camera_mut() {
            self.apply_to(camera);
        }
        Ok(())
    }
}
