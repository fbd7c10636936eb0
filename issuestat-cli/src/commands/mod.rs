//! CLI command implementations

pub mod config;
pub mod export;

pub use config::ConfigArgs;
pub use export::ExportArgs;
