//! Scene graph and camera.
//!
//! # Invariants
//! - Every node except the root has exactly one parent while attached.
//! - Node ids are never reused within one scene.
//! - Children iterate in attachment order.

pub mod camera;
pub mod graph;

pub use camera::Camera;
pub use graph::{Node, Scene, SceneError};
