//! Shared identifiers, transforms and small helpers used by every stagecraft crate.

mod any;
mod types;

pub use any::AsAny;
pub use types::{EntityId, NodeId, Transform};
