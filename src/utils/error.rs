use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Configuration not found: {path}")]
    ConfigMissing { path: PathBuf },

    #[error("No patch folders found in {root}")]
    NoPatchFolders { root: PathBuf },

    #[error("Patch folder '{name}' does not exist")]
    UnknownPatch { name: String },

    #[error("Cannot insert '{key}' from {fragment} into {target} ({category}): closing pattern not found")]
    MergeTargetMalformed {
        category: String,
        target: PathBuf,
        fragment: String,
        key: String,
    },

    #[error("Import of {bundle} failed: {reason}")]
    UploadFailed { bundle: String, reason: String },

    #[error("Network error while importing {bundle}: {reason}")]
    UploadNetworkError { bundle: String, reason: String },

    #[error("{context}: {source}")]
    UnexpectedIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read the patch selection: {source}")]
    SelectionPrompt {
        #[source]
        source: std::io::Error,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PatchError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::UnexpectedIo {
            context: context.into(),
            source,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UploadFailed { .. } | Self::UploadNetworkError { .. } => ErrorSeverity::Low,
            Self::HttpError(_) => ErrorSeverity::Medium,
            Self::MergeTargetMalformed { .. } | Self::ZipError(_) | Self::SerializationError(_) => {
                ErrorSeverity::High
            }
            Self::ConfigMissing { .. }
            | Self::NoPatchFolders { .. }
            | Self::UnknownPatch { .. }
            | Self::SelectionPrompt { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::UnexpectedIo { .. } | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigMissing { path } => format!("{} not found.", path.display()),
            Self::NoPatchFolders { root } => {
                format!("No patch folders found in {}", root.display())
            }
            Self::MergeTargetMalformed {
                category,
                target,
                fragment,
                key,
            } => format!(
                "{category}: could not insert '{key}' ({fragment}); {} does not end with the expected closing pattern",
                target.display()
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigMissing { .. } => {
                "Create config.json with a \"paths\" object and a patch/ folder in the data directory"
            }
            Self::NoPatchFolders { .. } => {
                "Add at least one patch folder under the patch/ directory"
            }
            Self::UnknownPatch { .. } => "Run the list command to see the available patch folders",
            Self::SelectionPrompt { .. } => {
                "Run from an interactive terminal, or pass --patch NAME or --all"
            }
            Self::MergeTargetMalformed { .. } => {
                "Check that the standard file ends with its closing '}' or '});'"
            }
            Self::UploadFailed { .. } | Self::UploadNetworkError { .. } | Self::HttpError(_) => {
                "Check that the reporting server is running and the import endpoint is correct"
            }
            Self::ZipError(_) => "Re-export the design bundle from the reporting product",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file and try again",
            Self::SerializationError(_) => "Check that config.json is valid JSON",
            Self::UnexpectedIo { .. } | Self::IoError(_) => {
                "Check file permissions and free disk space, then restore from the latest backup if needed"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;
