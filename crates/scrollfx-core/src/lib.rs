pub mod config;
pub mod controller;
pub mod debounce;
pub mod dom;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod navigator;
pub mod signal;
pub mod snapshot;
pub mod transform;
pub mod trigger;

pub use config::ScrollFxConfig;
pub use controller::{Phase, SmoothScroll};
pub use dom::{Bounds, Document, ElementId, Translate};
pub use engine::{ScrollEngine, ScrollStatus, Vec2};
pub use error::{Error, Result};
pub use navigator::{ScrollTicket, ScrollToRequest};
pub use signal::{CallbackEvent, ScrollEvent, ScrollSignal};
pub use snapshot::ScrollSnapshot;
