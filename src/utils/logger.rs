use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const ACTIVITY_LOG: &str = "activity.log";
pub const ERROR_LOG: &str = "error.log";

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("report_patch=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("report_patch=info"))
    }
}

/// Console logging, plus JSON `activity.log`/`error.log` files when `log_dir` is given.
pub fn init_cli_logger(verbose: bool, log_dir: Option<&Path>) -> std::io::Result<()> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let files = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let open = |name: &str| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join(name))
            };
            let activity = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(open(ACTIVITY_LOG)?));
            let errors = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(open(ERROR_LOG)?))
                .with_filter(LevelFilter::ERROR);
            Some(activity.and_then(errors))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(console)
        .with(files)
        .init();
    Ok(())
}
