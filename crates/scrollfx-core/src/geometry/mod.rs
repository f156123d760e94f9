//! Element classification and static geometry

pub mod attributes;
pub mod registry;
pub mod scanner;

pub use attributes::{Anchor, CallbackSpec, Direction, ElementConfig, Way};
pub use registry::{ParallaxElement, Registry, TriggerElement};
pub use scanner::GeometryScanner;
