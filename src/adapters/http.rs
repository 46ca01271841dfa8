use crate::config::toml_config::ImportConfig;
use crate::domain::model::UploadOutcome;
use crate::domain::ports::ReportUploader;
use crate::utils::error::Result;
use crate::utils::validation::validate_import_endpoint;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Uploads design bundles to the reporting product's import endpoint.
#[derive(Debug, Clone)]
pub struct ImportClient {
    client: Client,
    endpoint: Url,
    session_id: String,
    module: String,
    view: String,
    event: String,
    form_field: String,
    timeout: Duration,
}

impl ImportClient {
    pub fn new(config: &ImportConfig) -> Result<Self> {
        let endpoint = validate_import_endpoint("import.endpoint", &config.endpoint)?;
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            session_id: config.session_id.clone(),
            module: config.module.clone(),
            view: config.view.clone(),
            event: config.event.clone(),
            form_field: config.form_field.clone(),
            timeout,
        })
    }

    /// Endpoint URL with the query parameters the import event expects.
    pub fn import_url(&self, file_name: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("m", &self.module)
            .append_pair("v", &self.view)
            .append_pair("event", &self.event)
            .append_pair("filename", file_name)
            .append_pair("sessionid", &self.session_id);
        url
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        }
    }
}

/// Number of entries in the archive, or an error if `bytes` is not a zip file.
pub fn inspect_bundle(bytes: &[u8]) -> Result<usize> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    Ok(archive.len())
}

/// Classifies the import endpoint's reply.
pub fn classify_response(body: &str) -> UploadOutcome {
    let message = body.trim();
    if message.is_empty() {
        return UploadOutcome::Failed("empty response".to_string());
    }
    let lower = message.to_lowercase();
    if lower.contains("success") && !lower.contains("unsuccess") {
        UploadOutcome::Success
    } else if lower.contains("exist") {
        UploadOutcome::AlreadyExists
    } else {
        UploadOutcome::Failed(message.to_string())
    }
}

#[async_trait]
impl ReportUploader for ImportClient {
    async fn upload(&self, bundle: &Path) -> UploadOutcome {
        let file_name = bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let bytes = match tokio::fs::read(bundle).await {
            Ok(bytes) => bytes,
            Err(e) => return UploadOutcome::Failed(format!("cannot read bundle: {e}")),
        };
        match inspect_bundle(&bytes) {
            Ok(entries) => tracing::debug!("{} contains {} entries", file_name, entries),
            Err(e) => return UploadOutcome::Failed(format!("not a valid zip archive: {e}")),
        }

        let form = Form::new().part(
            self.form_field.clone(),
            Part::bytes(bytes).file_name(file_name.clone()),
        );
        let url = self.import_url(&file_name);
        tracing::debug!("POST {}", url);

        let response = match self.client.post(url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => return UploadOutcome::NetworkError(self.describe(&e)),
        };
        let status = response.status();
        if !status.is_success() {
            return UploadOutcome::NetworkError(format!("API request failed (Status: {status})"));
        }
        match response.text().await {
            Ok(body) => classify_response(&body),
            Err(e) => UploadOutcome::NetworkError(self.describe(&e)),
        }
    }
}
