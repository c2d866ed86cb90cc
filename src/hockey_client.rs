use crate::api_contracts::{AppVersion, ErrorResponse};
use crate::config_utils::ServiceConfig;
use crate::debug_logger::DebugLogger;
use crate::error::UploadError;
use crate::types::UploadRequest;
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-HockeyAppToken";

/// Something that can deliver a resolved upload to the distribution service.
#[async_trait]
pub trait UploadClient: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<AppVersion, UploadError>;
}

/// API client for the distribution service
pub struct HockeyClient {
    base_url: String,
    client: reqwest::Client,
    logger: Option<Arc<DebugLogger>>,
}

impl HockeyClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_logger(config, None)
    }

    /// Create a client with an optional logger
    pub fn with_logger(config: &ServiceConfig, logger: Option<Arc<DebugLogger>>) -> Self {
        // Large binaries over slow uplinks take a while; the timeout is configurable.
        let user_agent = format!("hockey-upload/{}", env!("CARGO_PKG_VERSION"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.base_url().to_string(),
            client,
            logger,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/api/2/apps/upload", self.base_url)
    }

    fn log_debug(&self, message: String) {
        if let Some(ref logger) = self.logger {
            logger.debug(message);
        }
    }

    fn file_part(path: &Path) -> Result<reqwest::multipart::Part, UploadError> {
        let contents = fs::read(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::Config(format!("Invalid filename: {}", path.display())))?
            .to_string();

        reqwest::multipart::Part::bytes(contents)
            .file_name(filename)
            .mime_str("application/octet-stream")
            .map_err(|e| UploadError::Config(format!("Invalid mime type: {}", e)))
    }

    /// Multipart body: text fields, the binary unless symbols-only, and the symbols if present.
    fn build_form(request: &UploadRequest) -> Result<reqwest::multipart::Form, UploadError> {
        let mut form = reqwest::multipart::Form::new();

        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }

        if !request.upload_dsym_only {
            form = form.part("ipa", Self::file_part(Path::new(&request.ipa_path))?);
        }

        if let Some(dsym) = &request.dsym_path {
            form = form.part("dsym", Self::file_part(Path::new(dsym))?);
        }

        Ok(form)
    }
}

#[async_trait]
impl UploadClient for HockeyClient {
    async fn upload(&self, request: &UploadRequest) -> Result<AppVersion, UploadError> {
        let url = self.upload_url();
        let form = Self::build_form(request)?;

        self.log_debug(format!("Sending upload request to: {}", url));

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, request.api_token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let body = match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(parsed) if !parsed.errors.is_null() => parsed.errors.to_string(),
                _ => error_text,
            };
            return Err(UploadError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let version: AppVersion = serde_json::from_str(&text)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        self.log_debug(format!(
            "Service accepted build {} ({})",
            version.shortversion.as_deref().unwrap_or("?"),
            version.version.as_deref().unwrap_or("?")
        ));

        Ok(version)
    }
}
