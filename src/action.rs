//! The upload step of a build lane.
//!
//! Reads the changelog from the lane context, resolves the options into an
//! [`UploadRequest`] and hands it to an [`UploadClient`]. Any failure aborts
//! the step; nothing is retried.

use crate::api_contracts::AppVersion;
use crate::debug_logger::DebugLogger;
use crate::error::UploadError;
use crate::hockey_client::UploadClient;
use crate::lane_context::LaneContext;
use crate::options::UploadOptions;
use crate::resolver;
use crate::types::UploadRequest;
use std::sync::Arc;
use tracing::Level;

/// Result of a completed upload
#[derive(Debug)]
pub struct UploadOutcome {
    /// The parameters that were sent
    pub request: UploadRequest,
    /// The version the service created
    pub app_version: AppVersion,
}

pub struct HockeyAction<C: UploadClient> {
    client: C,
    logger: Arc<DebugLogger>,
}

impl<C: UploadClient> HockeyAction<C> {
    pub fn new(client: C, logger: Arc<DebugLogger>) -> Self {
        Self { client, logger }
    }

    /// Resolve and validate the options without uploading anything.
    pub fn prepare(
        &self,
        options: &UploadOptions,
        lane_context: &LaneContext,
    ) -> Result<UploadRequest, UploadError> {
        let changelog = lane_context.changelog();
        if changelog.is_some() {
            self.logger.debug("Using changelog from lane context as release notes".to_string());
        }

        let request = match resolver::resolve(options, changelog.as_deref()) {
            Ok(request) => request,
            Err(e) => {
                self.logger.error(e.to_string());
                return Err(e);
            }
        };

        // Token stays out of the log; params() never includes it.
        self.logger.log(
            Level::INFO,
            "Resolved upload parameters".to_string(),
            serde_json::to_value(request.params()).ok(),
        );

        Ok(request)
    }

    /// Resolve the options and upload the build.
    pub async fn run(
        &self,
        options: &UploadOptions,
        lane_context: &LaneContext,
    ) -> Result<UploadOutcome, UploadError> {
        let request = self.prepare(options, lane_context)?;

        match (request.upload_dsym_only, request.dsym_path.as_deref()) {
            (true, Some(dsym)) => self.logger.info(format!("Uploading symbols only ({})...", dsym)),
            (true, None) => self
                .logger
                .warn("Symbols-only upload requested but no dSYM given; sending parameters only".to_string()),
            (false, _) => self.logger.info(format!("Uploading {}...", request.ipa_path)),
        }

        let app_version = match self.client.upload(&request).await {
            Ok(version) => version,
            Err(e) => {
                self.logger.error(format!("Upload failed: {}", e));
                return Err(e);
            }
        };

        match app_version.download_link() {
            Some(link) => self.logger.info(format!("Build uploaded successfully, download at {}", link)),
            None => self.logger.info("Build uploaded successfully".to_string()),
        }

        Ok(UploadOutcome {
            request,
            app_version,
        })
    }
}
