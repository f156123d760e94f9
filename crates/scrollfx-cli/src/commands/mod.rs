pub mod config;
pub mod goto;
pub mod scan;
pub mod scene;
pub mod sweep;
