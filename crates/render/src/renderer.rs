use serde::{Deserialize, Serialize};
use stagecraft_common::AsAny;
use stagecraft_scene::{Camera, Scene};
use tracing::debug;

/// Errors a backend can raise while rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("renderer has been disposed")]
    Disposed,
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Output surface owned by a renderer (the canvas, in a browser host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            label: "stagecraft".into(),
        }
    }
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// The renderer reads the scene and the active camera, then produces
/// output. It never mutates the scene. The `AsAny` supertrait lets callers
/// reach a concrete backend through `&dyn Renderer`.
pub trait Renderer: AsAny {
    /// The surface frames are presented to.
    fn surface(&self) -> &Surface;

    /// Render one frame of `scene` through `camera`.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;

    /// Release backend resources. Called when the renderer is replaced or
    /// the engine is disposed.
    fn dispose(&mut self) {}
}

/// Headless renderer that writes each frame as text.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    surface: Surface,
    last_frame: String,
    frames: u64,
    disposed: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(surface: Surface) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    /// Text of the most recently rendered frame.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Renderer for DebugTextRenderer {
    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.frames += 1;

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{} {}) ===\n",
            self.frames, self.surface.width, self.surface.height, self.surface.label
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov.to_degrees()
        ));
        out.push_str(&format!("Nodes: {}\n", scene.len() - 1));

        for (id, node) in scene.iter().skip(1) {
            if !node.visible {
                continue;
            }
            let depth = scene.depth(id).unwrap_or(1);
            let p = node.transform.position;
            let tag = node
                .entity()
                .map(|e| format!(" [{}]", e.short()))
                .unwrap_or_default();
            out.push_str(&format!(
                "{:indent$}{}{} pos=({:.2}, {:.2}, {:.2})\n",
                "",
                node.name,
                tag,
                p.x,
                p.y,
                p.z,
                indent = depth * 2
            ));
        }

        debug!(frame = self.frames, bytes = out.len(), "debug text frame rendered");
        self.last_frame = out;
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.last_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use stagecraft_common::{EntityId, Transform};
    use stagecraft_scene::Node;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &Camera::default()).unwrap();

        assert!(renderer.last_frame().contains("Frame 1"));
        assert!(renderer.last_frame().contains("Nodes: 0"));
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn debug_renderer_with_nodes() {
        let mut scene = Scene::new();
        let id = EntityId::new();
        let parent = scene
            .add(
                scene.root(),
                Node::new("ship")
                    .with_entity(id)
                    .with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))),
            )
            .unwrap();
        scene.add(parent, Node::new("hull")).unwrap();

        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &Camera::default()).unwrap();
        let frame = renderer.last_frame();

        assert!(frame.contains("Nodes: 2"));
        assert!(frame.contains(&format!("ship [{}] pos=(1.00, 2.00, 3.00)", id.short())));
        assert!(frame.contains("    hull"));
    }

    #[test]
    fn debug_frame_is_one_line_per_entry() {
        let mut scene = Scene::new();
        scene.add(scene.root(), Node::new("ship")).unwrap();

        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &Camera::default()).unwrap();
        let lines: Vec<&str> = renderer.last_frame().lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("=== Frame 1 ("));
        assert!(lines[1].starts_with("Camera: eye=("));
        assert_eq!(lines[2], "Nodes: 1");
        assert!(lines[3].starts_with("  ship pos="));
        assert!(renderer.last_frame().ends_with('\n'));
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut scene = Scene::new();
        let id = scene.add(scene.root(), Node::new("ghost")).unwrap();
        scene.get_mut(id).unwrap().visible = false;

        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &Camera::default()).unwrap();
        assert!(!renderer.last_frame().contains("ghost"));
    }

    #[test]
    fn disposed_renderer_refuses_frames() {
        let mut renderer = DebugTextRenderer::new();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert_eq!(
            renderer.render(&Scene::new(), &Camera::default()),
            Err(RenderError::Disposed)
        );
    }

    #[test]
    fn surface_default() {
        let renderer = DebugTextRenderer::new();
        assert_eq!(renderer.surface().width, 1280);
        assert_eq!(renderer.surface().height, 720);
    }
}
