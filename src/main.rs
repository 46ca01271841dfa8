use anyhow::Context;
use clap::Parser;
use report_patch::adapters::{
    AllSelector, ImportClient, InteractiveSelector, NamedSelector, TracingObserver,
};
use report_patch::config::{Command, ImportArgs};
use report_patch::core::PatchSelector;
use report_patch::domain::model::{CategoryStatus, RunReport, UploadOutcome};
use report_patch::utils::error::ErrorSeverity;
use report_patch::utils::{logger, validation::Validate};
use report_patch::{CliConfig, MergeOrchestrator, PatchError, ToolConfig, Workspace};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match ToolConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    logger::init_cli_logger(cli.verbose, config.logging.log_dir.as_deref())
        .context("failed to open log files")?;

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if cli.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    let result = match &cli.command {
        Command::List(_) => list(&config),
        Command::Import(args) => import(&config, args).await,
    };

    if let Err(e) = result {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn list(config: &ToolConfig) -> Result<(), PatchError> {
    let workspace = Workspace::load(&config.workspace.data_dir)?;
    println!("📂 Patch folders in {}:", workspace.data_dir.join("patch").display());
    for patch in &workspace.patches {
        let parts: Vec<&str> = ["design", "datasets", "filters", "wrappers", "globalsql"]
            .into_iter()
            .filter(|sub| patch.path.join(sub).is_dir())
            .collect();
        println!("  ├─ {} [{}]", patch.name, parts.join(", "));
    }
    Ok(())
}

async fn import(config: &ToolConfig, args: &ImportArgs) -> Result<(), PatchError> {
    tracing::info!("Import command started.");
    let workspace = Workspace::load(&config.workspace.data_dir)?;

    let selector: Box<dyn PatchSelector> = if args.all {
        Box::new(AllSelector)
    } else if !args.patches.is_empty() {
        Box::new(NamedSelector::new(args.patches.clone()))
    } else {
        Box::new(InteractiveSelector)
    };
    let selected = selector.select(&workspace.patches)?;
    if selected.is_empty() {
        tracing::warn!("No patches selected. Exiting.");
        println!("\nNo patch folders selected. Exiting.");
        return Ok(());
    }
    tracing::info!(
        "Selected patches: {}",
        selected.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
    );

    let uploader = ImportClient::new(&config.import)?;
    let orchestrator = MergeOrchestrator::new(workspace, uploader, TracingObserver);
    let report = orchestrator.run_patches(&selected).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    for patch in &report.patches {
        println!("\n--- Patch: {} ---", patch.patch);
        println!(
            "  📦 Backed up {} files to {}",
            patch.backup.files_copied,
            patch.backup.dir.display()
        );
        if patch.uploads.is_empty() {
            println!("  └─ No .zip files imported.");
        }
        for upload in &patch.uploads {
            match &upload.outcome {
                UploadOutcome::Success => println!("  📤 Imported: {}", upload.bundle),
                UploadOutcome::AlreadyExists => {
                    println!("  ⚠️  Skipped (already exists): {}", upload.bundle)
                }
                UploadOutcome::Failed(reason) => {
                    println!("  ❌ Failed {}: {}", upload.bundle, reason)
                }
                UploadOutcome::NetworkError(reason) => {
                    println!("  ❌ Network error for {}: {}", upload.bundle, reason)
                }
            }
        }
        for category in &patch.categories {
            let icon = match category.status {
                CategoryStatus::Merged if category.failures.is_empty() => "✅",
                CategoryStatus::Merged => "❌",
                _ => "ℹ️ ",
            };
            println!("  {} {}", icon, category.summary());
            for failure in &category.failures {
                println!("     └─ {}: {}", failure.file, failure.message);
            }
        }
    }

    if report.failure_count() == 0 {
        println!("\n✨ All selected patches processed successfully!");
    } else {
        println!(
            "\n⚠️  Patches processed with {} failed fragment(s).",
            report.failure_count()
        );
    }
}
