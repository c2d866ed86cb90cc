//! Core types for a resolved upload.
//!
//! The distribution service takes its release options as small integer
//! codes. Each option gets its own enum so an out-of-range value is
//! rejected when the request is resolved, not by the server.

use crate::error::UploadError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Release notes used when neither the caller nor an earlier lane step provides any.
pub const DEFAULT_NOTES: &str = "No changelog given";

macro_rules! coded_option {
    (
        $(#[$meta:meta])*
        $name:ident ($option:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Option name as accepted in the configuration bag.
            pub const OPTION: &'static str = $option;

            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code sent to the service.
            pub fn code(self) -> i8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.code().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl FromStr for $name {
            type Err = UploadError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let invalid = || UploadError::InvalidOption {
                    option: Self::OPTION,
                    value: s.to_string(),
                    expected: Self::expected(),
                };
                let code: i8 = s.trim().parse().map_err(|_| invalid())?;
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.code() == code)
                    .ok_or_else(invalid)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

coded_option! {
    /// Who gets notified about the new build.
    Notify("notify") {
        DontNotify = 0,
        /// Testers allowed to install this build
        NotifyTesters = 1,
        NotifyAll = 2,
    }
    default = NotifyTesters
}

coded_option! {
    /// Whether the build can be downloaded once uploaded.
    ReleaseStatus("status") {
        Restricted = 1,
        Available = 2,
    }
    default = Available
}

coded_option! {
    /// Markup of the release notes.
    NotesType("notes_type") {
        Textile = 0,
        Markdown = 1,
    }
    default = Markdown
}

coded_option! {
    /// Release track of the build.
    ReleaseType("release_type") {
        /// Leave the release type chosen on the service untouched
        Unspecified = -1,
        Beta = 0,
        Store = 1,
        Alpha = 2,
    }
    default = Beta
}

coded_option! {
    /// Whether testers must install this build.
    Mandatory("mandatory") {
        Optional = 0,
        Required = 1,
    }
    default = Optional
}

/// The resolved, validated parameters for one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRequest {
    #[serde(skip_serializing)]
    pub api_token: String,
    /// Binary path exactly as supplied
    pub ipa_path: String,
    /// Absolute path of the symbols archive
    pub dsym_path: Option<String>,
    pub notify: Notify,
    pub status: ReleaseStatus,
    pub notes: String,
    pub notes_type: NotesType,
    pub release_type: ReleaseType,
    pub mandatory: Mandatory,
    pub tags: Option<String>,
    pub teams: Option<String>,
    pub upload_dsym_only: bool,
}

impl UploadRequest {
    /// Normalized parameter mapping, keyed by option name. The token is left out.
    pub fn params(&self) -> BTreeMap<&'static str, Option<String>> {
        BTreeMap::from([
            ("ipa", Some(self.ipa_path.clone())),
            ("dsym", self.dsym_path.clone()),
            (Notify::OPTION, Some(self.notify.to_string())),
            (ReleaseStatus::OPTION, Some(self.status.to_string())),
            ("notes", Some(self.notes.clone())),
            (NotesType::OPTION, Some(self.notes_type.to_string())),
            (ReleaseType::OPTION, Some(self.release_type.to_string())),
            (Mandatory::OPTION, Some(self.mandatory.to_string())),
            ("tags", self.tags.clone()),
            ("teams", self.teams.clone()),
            ("upload_dsym_only", Some(self.upload_dsym_only.to_string())),
        ])
    }

    /// Text fields of the multipart upload. Absent tags and teams are omitted.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("notes", self.notes.clone()),
            (NotesType::OPTION, self.notes_type.to_string()),
            (Notify::OPTION, self.notify.to_string()),
            (ReleaseStatus::OPTION, self.status.to_string()),
            (ReleaseType::OPTION, self.release_type.to_string()),
            (Mandatory::OPTION, self.mandatory.to_string()),
        ];
        if let Some(tags) = &self.tags {
            fields.push(("tags", tags.clone()));
        }
        if let Some(teams) = &self.teams {
            fields.push(("teams", teams.clone()));
        }
        fields
    }
}
