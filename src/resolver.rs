//! Turns a raw option bag into a validated [`UploadRequest`].

use crate::error::UploadError;
use crate::options::UploadOptions;
use crate::types::{
    Mandatory, NotesType, Notify, ReleaseStatus, ReleaseType, UploadRequest, DEFAULT_NOTES,
};
use std::env;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Resolve `options` into an upload request.
///
/// `changelog` is the value an earlier lane step published, if any. It is
/// used as release notes unless the caller passed `notes` explicitly.
///
/// File checks run first, so a missing binary is always reported as such
/// regardless of what else is wrong with the options.
pub fn resolve(options: &UploadOptions, changelog: Option<&str>) -> Result<UploadRequest, UploadError> {
    let ipa_path = options.ipa.clone().unwrap_or_default();
    if ipa_path.is_empty() || !Path::new(&ipa_path).is_file() {
        return Err(UploadError::MissingIpaFile(ipa_path));
    }

    let dsym_path = match options.dsym.as_deref() {
        Some(raw) => {
            let expanded = expand_path(raw)?;
            let display = expanded.to_string_lossy().to_string();
            // An empty value expands to the working directory; it still names no file.
            if raw.is_empty() || !expanded.is_file() {
                return Err(UploadError::MissingSymbolsFile(display));
            }
            Some(display)
        }
        None => None,
    };

    let api_token = options
        .api_token
        .clone()
        .filter(|token| !token.trim().is_empty())
        .ok_or(UploadError::MissingOption("api_token"))?;

    let notes = options
        .notes
        .clone()
        .or_else(|| changelog.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_NOTES.to_string());

    Ok(UploadRequest {
        api_token,
        ipa_path,
        dsym_path,
        notify: parse_or_default::<Notify>(options.notify.as_deref())?,
        status: parse_or_default::<ReleaseStatus>(options.status.as_deref())?,
        notes,
        notes_type: parse_or_default::<NotesType>(options.notes_type.as_deref())?,
        release_type: parse_or_default::<ReleaseType>(options.release_type.as_deref())?,
        mandatory: parse_or_default::<Mandatory>(options.mandatory.as_deref())?,
        tags: options.tags.clone(),
        teams: options.teams.clone(),
        upload_dsym_only: parse_flag("upload_dsym_only", options.upload_dsym_only.as_deref())?,
    })
}

fn parse_or_default<T>(raw: Option<&str>) -> Result<T, UploadError>
where
    T: FromStr<Err = UploadError> + Default,
{
    raw.map_or_else(|| Ok(T::default()), |value| value.parse())
}

fn parse_flag(option: &'static str, raw: Option<&str>) -> Result<bool, UploadError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(UploadError::InvalidOption {
            option,
            value: raw.to_string(),
            expected: "true, false".to_string(),
        }),
    }
}

/// Expand `raw` into an absolute path.
///
/// A leading `~` becomes the home directory, relative paths are joined to
/// the current directory, and `.`/`..` are folded lexically. Symlinks are
/// not followed and the path does not need to exist.
pub fn expand_path(raw: &str) -> Result<PathBuf, UploadError> {
    let path = if raw == "~" || raw.starts_with("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| UploadError::Config("Could not find home directory".to_string()))?;
        home.join(raw.trim_start_matches('~').trim_start_matches('/'))
    } else {
        PathBuf::from(raw)
    };

    let absolute = if path.is_absolute() {
        path
    } else {
        let cwd = env::current_dir().map_err(|source| UploadError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        cwd.join(path)
    };

    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
