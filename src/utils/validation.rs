use crate::core::workspace::{BACKUP_DIR, PATCH_DIR};
use crate::utils::error::{PatchError, Result};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Upper bound for `import.timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> PatchError {
    PatchError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// The import endpoint gets its own `m`, `v`, `event`, `filename` and `sessionid`
/// query pairs appended, so it must be a bare http(s) URL.
pub fn validate_import_endpoint(field: &str, endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("Invalid URL format: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            endpoint,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, endpoint, "URL has no host"));
    }
    if url.query().is_some() {
        return Err(invalid(
            field,
            endpoint,
            "Query parameters are added per upload; remove the query string",
        ));
    }
    if url.fragment().is_some() {
        return Err(invalid(field, endpoint, "URL must not carry a #fragment"));
    }
    Ok(url)
}

/// Values sent as import query or form names: non-blank, no whitespace.
pub fn validate_import_parameter(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, value, "Value must not contain whitespace"));
    }
    Ok(())
}

pub fn validate_timeout(field: &str, seconds: u64) -> Result<()> {
    if !(1..=MAX_TIMEOUT_SECONDS).contains(&seconds) {
        return Err(invalid(
            field,
            seconds.to_string(),
            format!("Timeout must be between 1 and {MAX_TIMEOUT_SECONDS} seconds"),
        ));
    }
    Ok(())
}

pub fn validate_data_dir(field: &str, data_dir: &Path) -> Result<()> {
    if data_dir.as_os_str().is_empty() {
        return Err(invalid(field, "", "Data directory cannot be empty"));
    }
    Ok(())
}

/// Rejects a log directory inside `<data_dir>/patch` or `<data_dir>/backup`.
///
/// Under `patch/` it would be listed as a patch folder; under `backup/` it
/// would mix with the timestamped snapshots.
pub fn validate_log_dir(field: &str, log_dir: &Path, data_dir: &Path) -> Result<()> {
    if log_dir.as_os_str().is_empty() {
        return Err(invalid(field, "", "Log directory cannot be empty"));
    }

    let log_dir = lexical(log_dir);
    let data_dir = lexical(data_dir);
    for reserved in [PATCH_DIR, BACKUP_DIR] {
        if log_dir.starts_with(data_dir.join(reserved)) {
            return Err(invalid(
                field,
                log_dir.display().to_string(),
                format!("Log directory must not be inside {}", data_dir.join(reserved).display()),
            ));
        }
    }
    Ok(())
}

/// Drops `.` components so `./data/report` and `data/report` compare equal.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
