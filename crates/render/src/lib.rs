//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - A renderer reads the scene and camera; it never mutates either.
//! - A disposed renderer refuses to render.
//!
//! The kernel talks to backends only through [`Renderer`]. The headless
//! [`DebugTextRenderer`] is the default backend and is what tests and the
//! CLI drive.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderError, Renderer, Surface};
