//! Translation state and the parallax pass

pub mod applicator;
pub mod parallax;

pub use applicator::{Origin, TransformApplicator, TransformState, TransformStore};
pub use parallax::{compute_distance, ParallaxTransformer, PassReport};
