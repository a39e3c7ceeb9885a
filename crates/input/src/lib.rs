//! Input plugins: host events buffered into per-frame state, and an orbit
//! camera controller driven by that state.
//!
//! # Invariants
//! - Events pushed between ticks are folded into [`InputState`] during the
//!   plugin update pass, so every entity update of a tick sees the same state.
//! - Per-frame deltas (pointer motion, wheel, keys pressed this frame) are
//!   cleared in the plugin late update pass.

pub mod orbit;
pub mod plugin;
pub mod state;

pub use orbit::OrbitControls;
pub use plugin::InputPlugin;
pub use state::{Button, InputEvent, InputState, Key};
