//! The configuration bag handed to the upload action by the calling lane.
//!
//! Values are kept as raw strings here. Parsing into typed options happens
//! in the resolver so every source (JSON document, string map, environment,
//! command line) goes through the same validation.

use crate::error::UploadError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Raw upload options. `None` means the caller did not supply the option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadOptions {
    #[serde(deserialize_with = "string_or_scalar")]
    pub api_token: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub ipa: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub dsym: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub notify: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub status: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub notes_type: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub release_type: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub mandatory: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub tags: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub teams: Option<String>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub upload_dsym_only: Option<String>,
}

/// Environment variable consulted for each option the caller left out.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("api_token", "FL_HOCKEY_API_TOKEN"),
    ("ipa", "FL_HOCKEY_IPA"),
    ("dsym", "FL_HOCKEY_DSYM"),
    ("notify", "FL_HOCKEY_NOTIFY"),
    ("status", "FL_HOCKEY_STATUS"),
    ("notes", "FL_HOCKEY_NOTES"),
    ("notes_type", "FL_HOCKEY_NOTES_TYPE"),
    ("release_type", "FL_HOCKEY_RELEASE_TYPE"),
    ("mandatory", "FL_HOCKEY_MANDATORY"),
    ("tags", "FL_HOCKEY_TAGS"),
    ("teams", "FL_HOCKEY_TEAMS"),
    ("upload_dsym_only", "FL_HOCKEY_UPLOAD_DSYM_ONLY"),
];

/// Accept strings, numbers and booleans; lanes write `notify: 1` as often as `notify: '1'`.
fn string_or_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, number or boolean, got {}",
            other
        ))),
    }
}

impl UploadOptions {
    /// Parse options from a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, UploadError> {
        serde_json::from_str(json)
            .map_err(|e| UploadError::Config(format!("Failed to parse options: {}", e)))
    }

    /// Load options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, UploadError> {
        let contents = fs::read_to_string(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Build options from a plain string map. Unknown keys are rejected.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, UploadError> {
        let value = serde_json::to_value(map)
            .map_err(|e| UploadError::Config(format!("Failed to convert options: {}", e)))?;
        serde_json::from_value(value)
            .map_err(|e| UploadError::Config(format!("Failed to parse options: {}", e)))
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "api_token" => &mut self.api_token,
            "ipa" => &mut self.ipa,
            "dsym" => &mut self.dsym,
            "notify" => &mut self.notify,
            "status" => &mut self.status,
            "notes" => &mut self.notes,
            "notes_type" => &mut self.notes_type,
            "release_type" => &mut self.release_type,
            "mandatory" => &mut self.mandatory,
            "tags" => &mut self.tags,
            "teams" => &mut self.teams,
            "upload_dsym_only" => &mut self.upload_dsym_only,
            _ => return None,
        };
        Some(slot)
    }

    /// Fill options the caller left out from `lookup` (normally `std::env::var`).
    pub fn with_env_fallbacks<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(key, var) in ENV_FALLBACKS {
            if let Some(slot) = self.slot_mut(key) {
                if slot.is_none() {
                    *slot = lookup(var);
                }
            }
        }
        self
    }

    /// Layer `overrides` on top of `self`; any option set in `overrides` wins.
    pub fn merge(mut self, overrides: UploadOptions) -> Self {
        let UploadOptions {
            api_token,
            ipa,
            dsym,
            notify,
            status,
            notes,
            notes_type,
            release_type,
            mandatory,
            tags,
            teams,
            upload_dsym_only,
        } = overrides;

        let pairs = [
            ("api_token", api_token),
            ("ipa", ipa),
            ("dsym", dsym),
            ("notify", notify),
            ("status", status),
            ("notes", notes),
            ("notes_type", notes_type),
            ("release_type", release_type),
            ("mandatory", mandatory),
            ("tags", tags),
            ("teams", teams),
            ("upload_dsym_only", upload_dsym_only),
        ];
        for (key, value) in pairs {
            if let (Some(value), Some(slot)) = (value, self.slot_mut(key)) {
                *slot = Some(value);
            }
        }
        self
    }
}
