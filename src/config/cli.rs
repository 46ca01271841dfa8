use super::toml_config::ToolConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "report-patch")]
#[command(about = "Import and merge report configurations from a patch folder")]
pub struct CliConfig {
    /// Path to TOML configuration file (default: ./report-patch.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Back up standard files, import designs and merge the selected patches
    Import(ImportArgs),
    /// List available patch folders
    List(WorkspaceArgs),
}

#[derive(Debug, Clone, Args)]
pub struct WorkspaceArgs {
    /// Report data directory (holds config.json, patch/ and backup/)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Patch folder to apply; repeat for several. Prompts when omitted.
    #[arg(short, long = "patch", value_name = "NAME")]
    pub patches: Vec<String>,

    /// Apply every patch folder in name order
    #[arg(long, conflicts_with = "patches")]
    pub all: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliConfig {
    /// Command-line values take precedence over the configuration file.
    pub fn apply_overrides(&self, config: &mut ToolConfig) {
        let workspace = match &self.command {
            Command::Import(args) => &args.workspace,
            Command::List(args) => args,
        };
        if let Some(data_dir) = &workspace.data_dir {
            config.workspace.data_dir = data_dir.clone();
        }
    }
}
