pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::ToolConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::backup::BackupStage;
pub use core::merger::{AppendMerger, BlockMerger, CATEGORY_TABLE};
pub use core::orchestrator::MergeOrchestrator;
pub use core::workspace::Workspace;
pub use utils::error::{PatchError, Result};
