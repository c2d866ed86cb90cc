/**
 * API contract types for the distribution service.
 *
 * These mirror the JSON returned by `POST /api/2/apps/upload`. The service
 * adds fields over time, so everything the uploader does not strictly
 * need is optional and unknown fields are ignored.
 */

use serde::{Deserialize, Serialize};

// =============================================================================
// Upload Endpoint
// =============================================================================

/// App version created (or updated) by an upload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppVersion {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub bundle_identifier: Option<String>,
    pub public_identifier: Option<String>,
    pub version: Option<String>,       // Build number
    pub shortversion: Option<String>,  // Marketing version
    pub public_url: Option<String>,    // Download page
    pub build_url: Option<String>,
    pub config_url: Option<String>,    // Management page of the version
    pub timestamp: Option<i64>,
}

impl AppVersion {
    /// Link testers should be pointed at, preferring the public page.
    pub fn download_link(&self) -> Option<&str> {
        self.public_url
            .as_deref()
            .or(self.build_url.as_deref())
    }
}

/// Error payload returned with non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: serde_json::Value,
}
