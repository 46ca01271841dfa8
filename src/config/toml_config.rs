use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{
    validate_data_dir, validate_import_endpoint, validate_import_parameter, validate_log_dir,
    validate_timeout, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_CONFIG_FILE: &str = "report-patch.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub workspace: WorkspaceConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding `config.json`, `patch/` and `backup/`.
    pub data_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/report"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub endpoint: String,
    pub session_id: String,
    pub module: String,
    pub view: String,
    pub event: String,
    pub form_field: String,
    pub timeout_seconds: u64,
    /// The reporting server usually runs with a self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://127.0.0.1/REPORTING/Framewrk/Event.jsp".to_string(),
            session_id: "idealonline".to_string(),
            module: "V218".to_string(),
            view: "V218".to_string(),
            event: "iRM.importReportConfig".to_string(),
            form_field: "txtRptimport".to_string(),
            timeout_seconds: 10,
            accept_invalid_certs: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, `activity.log` and `error.log` are written here.
    pub log_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// Reads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            PatchError::io(format!("reading {}", path.as_ref().display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if given, otherwise the default file if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        static VAR: OnceLock<Regex> = OnceLock::new();
        let re = VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static env pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validate_import_endpoint("import.endpoint", &self.import.endpoint)?;
        validate_import_parameter("import.session_id", &self.import.session_id)?;
        validate_import_parameter("import.module", &self.import.module)?;
        validate_import_parameter("import.view", &self.import.view)?;
        validate_import_parameter("import.event", &self.import.event)?;
        validate_import_parameter("import.form_field", &self.import.form_field)?;
        validate_timeout("import.timeout_seconds", self.import.timeout_seconds)?;
        validate_data_dir("workspace.data_dir", &self.workspace.data_dir)?;
        if let Some(log_dir) = &self.logging.log_dir {
            validate_log_dir("logging.log_dir", log_dir, &self.workspace.data_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[workspace]
data_dir = "/opt/reporting/data"

[import]
endpoint = "https://reports.local/REPORTING/Framewrk/Event.jsp"
session_id = "ops"
timeout_seconds = 30
accept_invalid_certs = false

[logging]
log_dir = "/var/log/report-patch"
"#;

        let config = ToolConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.workspace.data_dir, PathBuf::from("/opt/reporting/data"));
        assert_eq!(config.import.session_id, "ops");
        assert_eq!(config.import.timeout_seconds, 30);
        assert!(!config.import.accept_invalid_certs);
        // unspecified fields keep their defaults
        assert_eq!(config.import.module, "V218");
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/var/log/report-patch")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolConfig::from_toml_str("").unwrap();
        assert_eq!(config.workspace.data_dir, PathBuf::from("data/report"));
        assert!(config.import.accept_invalid_certs);
        assert_eq!(config.import.timeout_seconds, 10);
        assert!(config.logging.log_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REPORT_PATCH_TEST_ENDPOINT", "https://env.example.com/Event.jsp");

        let config = ToolConfig::from_toml_str(
            r#"
[import]
endpoint = "${REPORT_PATCH_TEST_ENDPOINT}"
"#,
        )
        .unwrap();
        assert_eq!(config.import.endpoint, "https://env.example.com/Event.jsp");

        std::env::remove_var("REPORT_PATCH_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let config = ToolConfig::from_toml_str(
            r#"
[import]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = ToolConfig::from_toml_str("[import]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_endpoint_query_and_log_dir_in_patch_folder() {
        let config = ToolConfig::from_toml_str(
            r#"
[import]
endpoint = "https://reports.local/Event.jsp?sessionid=abc"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            PatchError::InvalidConfigValueError { ref field, .. } if field == "import.endpoint"
        ));

        let config = ToolConfig::from_toml_str(
            r#"
[workspace]
data_dir = "data/report"

[logging]
log_dir = "data/report/patch/logs"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            PatchError::InvalidConfigValueError { ref field, .. } if field == "logging.log_dir"
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = ToolConfig::from_toml_str("[import\nendpoint = 1").unwrap_err();
        assert!(matches!(err, PatchError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[workspace]\ndata_dir = \"./patches\"\n")
            .unwrap();

        let config = ToolConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.workspace.data_dir, PathBuf::from("./patches"));
    }
}
