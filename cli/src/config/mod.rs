//! CLI configuration

pub mod loader;

pub use loader::{expand_path, CliConfigLoader, LoadedConfig};
