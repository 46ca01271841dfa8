#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, ImportArgs, WorkspaceArgs};
pub use toml_config::{ImportConfig, LoggingConfig, ToolConfig, WorkspaceConfig};
