//! Integration test harness for a mock distribution service
//!
//! Runs the upload client and the action against a local mockito server
//! instead of the real service.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const UPLOAD_PATH: &str = "/api/2/apps/upload";

/// A test harness that sets up a mock distribution service
pub struct TestHarness {
    pub server: ServerGuard,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Service config pointing at the mock server
    pub fn service_config(&self) -> crate::config_utils::ServiceConfig {
        crate::config_utils::ServiceConfig {
            base_url: self.url(),
            timeout_secs: 10,
        }
    }

    fn version_body(public_identifier: &str) -> String {
        json!({
            "id": 208,
            "title": "Demo",
            "bundle_identifier": "com.example.demo",
            "public_identifier": public_identifier,
            "version": "42",
            "shortversion": "1.2.0",
            "public_url": format!("https://rink.hockeyapp.net/apps/{}", public_identifier),
            "config_url": "https://rink.hockeyapp.net/manage/apps/1/app_versions/208",
            "timestamp": 1700000000
        })
        .to_string()
    }

    /// Mock a successful upload made with `token`
    pub fn mock_upload_success(&mut self, token: &str, public_identifier: &str) -> Mock {
        self.server
            .mock("POST", UPLOAD_PATH)
            .match_header("x-hockeyapptoken", token)
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(Self::version_body(public_identifier))
            .create()
    }

    /// Mock a successful upload and keep the raw request body for inspection
    pub fn mock_upload_capturing(&mut self) -> (Mock, Arc<Mutex<Vec<u8>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let body = Self::version_body("abc");

        let mock = self
            .server
            .mock("POST", UPLOAD_PATH)
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |request| {
                if let Ok(bytes) = request.body() {
                    *sink.lock().unwrap() = bytes.clone();
                }
                body.clone().into_bytes()
            })
            .create();

        (mock, captured)
    }

    /// Mock a failed upload
    pub fn mock_upload_failure(&mut self, status: usize, errors: serde_json::Value) -> Mock {
        self.server
            .mock("POST", UPLOAD_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({ "errors": errors }).to_string())
            .create()
    }

    /// Mock a 2xx response whose body is not an app version
    pub fn mock_upload_garbage(&mut self) -> Mock {
        self.server
            .mock("POST", UPLOAD_PATH)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>maintenance</html>")
            .create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::HockeyAction;
    use crate::debug_logger::DebugLogger;
    use crate::error::UploadError;
    use crate::hockey_client::{HockeyClient, UploadClient};
    use crate::lane_context::{LaneContext, SharedValue};
    use crate::options::UploadOptions;
    use crate::resolver;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, contents: &[u8]) -> String {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().to_string()
    }

    fn options(token: &str, ipa: &str) -> UploadOptions {
        UploadOptions {
            api_token: Some(token.to_string()),
            ipa: Some(ipa.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upload_with_mock_server() {
        let mut harness = TestHarness::new().await;
        let mock = harness.mock_upload_success("xxx", "abc123");

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"fake ipa content");
        let request = resolver::resolve(&options("xxx", &ipa), None).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        let version = client.upload(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(version.public_identifier.as_deref(), Some("abc123"));
        assert_eq!(version.download_link(), Some("https://rink.hockeyapp.net/apps/abc123"));
    }

    #[tokio::test]
    async fn test_upload_sends_fields_and_files() {
        let mut harness = TestHarness::new().await;
        let (mock, captured) = harness.mock_upload_capturing();

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"IPA-BYTES");
        let dsym = create_test_file(temp_dir.path(), "App.dSYM.zip", b"DSYM-BYTES");
        let options = UploadOptions {
            dsym: Some(dsym),
            tags: Some("123,123".to_string()),
            release_type: Some("2".to_string()),
            ..options("xxx", &ipa)
        };
        let request = resolver::resolve(&options, Some("autogenerated changelog")).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        client.upload(&request).await.unwrap();
        mock.assert_async().await;

        let body = String::from_utf8_lossy(&captured.lock().unwrap()).to_string();
        assert!(body.contains(r#"name="notes""#));
        assert!(body.contains("autogenerated changelog"));
        assert!(body.contains(r#"name="release_type""#));
        assert!(body.contains(r#"name="tags""#));
        assert!(body.contains("123,123"));
        assert!(!body.contains(r#"name="teams""#));
        assert!(body.contains(r#"name="ipa"; filename="App.ipa""#));
        assert!(body.contains("IPA-BYTES"));
        assert!(body.contains(r#"name="dsym"; filename="App.dSYM.zip""#));
        assert!(body.contains("DSYM-BYTES"));
    }

    #[tokio::test]
    async fn test_symbols_only_upload_omits_binary() {
        let mut harness = TestHarness::new().await;
        let (mock, captured) = harness.mock_upload_capturing();

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"IPA-BYTES");
        let dsym = create_test_file(temp_dir.path(), "App.dSYM.zip", b"DSYM-BYTES");
        let options = UploadOptions {
            dsym: Some(dsym),
            upload_dsym_only: Some("true".to_string()),
            ..options("xxx", &ipa)
        };
        let request = resolver::resolve(&options, None).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        client.upload(&request).await.unwrap();
        mock.assert_async().await;

        let body = String::from_utf8_lossy(&captured.lock().unwrap()).to_string();
        assert!(!body.contains(r#"name="ipa""#));
        assert!(!body.contains("IPA-BYTES"));
        assert!(body.contains("DSYM-BYTES"));
    }

    #[tokio::test]
    async fn test_upload_unauthorized() {
        let mut harness = TestHarness::new().await;
        let _mock = harness.mock_upload_failure(401, json!({"credentials": ["invalid token"]}));

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"content");
        let request = resolver::resolve(&options("invalid-token", &ipa), None).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        let err = client.upload(&request).await.unwrap_err();

        match err {
            UploadError::Server { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_server_error() {
        let mut harness = TestHarness::new().await;
        let _mock = harness.mock_upload_failure(500, json!("Internal server error"));

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"content");
        let request = resolver::resolve(&options("xxx", &ipa), None).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        let err = client.upload(&request).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_upload_unparsable_response() {
        let mut harness = TestHarness::new().await;
        let _mock = harness.mock_upload_garbage();

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"content");
        let request = resolver::resolve(&options("xxx", &ipa), None).unwrap();

        let client = HockeyClient::new(&harness.service_config());
        let err = client.upload(&request).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_network_error() {
        let config = crate::config_utils::ServiceConfig {
            // Nothing listens on the discard port.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
        };

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"content");
        let request = resolver::resolve(&options("xxx", &ipa), None).unwrap();

        let err = HockeyClient::new(&config).upload(&request).await.unwrap_err();
        assert!(matches!(err, UploadError::Network(_)));
    }

    #[tokio::test]
    async fn test_action_end_to_end() {
        let mut harness = TestHarness::new().await;
        let mock = harness.mock_upload_success("xxx", "abc123");

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"fake ipa content");

        let logger = Arc::new(DebugLogger::new());
        let client = HockeyClient::with_logger(&harness.service_config(), Some(Arc::clone(&logger)));
        let action = HockeyAction::new(client, Arc::clone(&logger));

        let lane_context = LaneContext::new();
        lane_context.set(SharedValue::Changelog, "autogenerated changelog");

        let outcome = action.run(&options("xxx", &ipa), &lane_context).await.unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.request.notes, "autogenerated changelog");
        assert_eq!(outcome.app_version.shortversion.as_deref(), Some("1.2.0"));
        assert_eq!(logger.get_error_count(), 0);
    }

    #[tokio::test]
    async fn test_action_missing_symbols_never_hits_server() {
        let mut harness = TestHarness::new().await;
        let mock = harness.server.mock("POST", UPLOAD_PATH).expect(0).create();

        let temp_dir = TempDir::new().unwrap();
        let ipa = create_test_file(temp_dir.path(), "App.ipa", b"fake ipa content");
        let options = UploadOptions {
            dsym: Some("./notHere.dSYM.zip".to_string()),
            ..options("xxx", &ipa)
        };

        let action = HockeyAction::new(
            HockeyClient::new(&harness.service_config()),
            Arc::new(DebugLogger::new()),
        );
        let err = action.run(&options, &LaneContext::new()).await.unwrap_err();

        assert!(matches!(err, UploadError::MissingSymbolsFile(_)));
        mock.assert_async().await;
    }
}
