//! In-memory document and scroll engine
//!
//! Backs the tests and the CLI scene runner. The engine jumps instantly and
//! the document keeps a plain node tree, which is all the geometry code needs.

mod document;
mod engine;
mod scene;

pub use document::{InMemoryDocument, NodeSpec};
pub use engine::{InMemoryEngine, ScrollCall, ScrollHandle};
pub use scene::{BuiltScene, Scene, SceneElement};
