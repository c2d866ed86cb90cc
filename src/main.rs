use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hockey_upload_lib::config_utils::get_logs_dir;
use hockey_upload_lib::{
    logging, DebugLogger, HockeyAction, HockeyClient, LaneContext, ServiceConfig, SharedValue,
    UploadError, UploadOptions,
};

/// Upload an .ipa (and optionally its dSYM archive) to HockeyApp.
#[derive(Debug, Parser)]
#[command(name = "hockey-upload", version, about)]
struct Cli {
    /// API token (falls back to FL_HOCKEY_API_TOKEN)
    #[arg(long)]
    api_token: Option<String>,

    /// Path to the .ipa
    #[arg(long)]
    ipa: Option<String>,

    /// Path to the zipped dSYM
    #[arg(long)]
    dsym: Option<String>,

    /// Release notes; defaults to the lane changelog
    #[arg(long)]
    notes: Option<String>,

    /// 0 = don't notify, 1 = notify testers, 2 = notify all
    #[arg(long)]
    notify: Option<String>,

    /// 1 = download not allowed, 2 = available
    #[arg(long)]
    status: Option<String>,

    /// 0 = Textile, 1 = Markdown
    #[arg(long)]
    notes_type: Option<String>,

    /// -1 = unspecified, 0 = beta, 1 = store, 2 = alpha
    #[arg(long, allow_hyphen_values = true)]
    release_type: Option<String>,

    /// 0 = optional, 1 = mandatory
    #[arg(long)]
    mandatory: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,

    /// Comma-separated team IDs
    #[arg(long)]
    teams: Option<String>,

    /// Upload only the dSYM; `--upload-dsym-only false` turns off a value set elsewhere
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    upload_dsym_only: Option<bool>,

    /// JSON file with upload options; flags win over its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Changelog published by an earlier step (falls back to FL_CHANGELOG)
    #[arg(long, conflicts_with = "changelog_file")]
    changelog: Option<String>,

    /// Read the changelog from a file
    #[arg(long)]
    changelog_file: Option<PathBuf>,

    /// Service base URL (overrides config file and HOCKEY_API_HOST)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Resolve and print the parameters without uploading
    #[arg(long)]
    dry_run: bool,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to ~/.hockey-upload/logs
    #[arg(long)]
    log_file: bool,

    /// Save a JSON debug report to ~/.hockey-upload/logs when done
    #[arg(long)]
    debug_report: bool,
}

impl Cli {
    fn flag_options(&self) -> UploadOptions {
        UploadOptions {
            api_token: self.api_token.clone(),
            ipa: self.ipa.clone(),
            dsym: self.dsym.clone(),
            notify: self.notify.clone(),
            status: self.status.clone(),
            notes: self.notes.clone(),
            notes_type: self.notes_type.clone(),
            release_type: self.release_type.clone(),
            mandatory: self.mandatory.clone(),
            tags: self.tags.clone(),
            teams: self.teams.clone(),
            upload_dsym_only: self.upload_dsym_only.map(|flag| flag.to_string()),
        }
    }

    fn upload_options(&self) -> Result<UploadOptions, UploadError> {
        let base = match &self.options {
            Some(path) => UploadOptions::from_json_file(path)?,
            None => UploadOptions::default(),
        };
        Ok(base
            .merge(self.flag_options())
            .with_env_fallbacks(|var| env::var(var).ok()))
    }

    fn lane_context(&self) -> Result<LaneContext, UploadError> {
        let lane_context = LaneContext::new();
        let changelog = match (&self.changelog, &self.changelog_file) {
            (Some(text), _) => Some(text.clone()),
            (None, Some(path)) => Some(fs::read_to_string(path).map_err(|source| UploadError::Io {
                path: path.clone(),
                source,
            })?),
            (None, None) => env::var(SharedValue::Changelog.as_key()).ok(),
        };
        if let Some(changelog) = changelog {
            lane_context.set(SharedValue::Changelog, changelog);
        }
        Ok(lane_context)
    }

    fn service_config(&self) -> Result<ServiceConfig, UploadError> {
        let mut config = ServiceConfig::load()?;
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }
}

async fn run(cli: &Cli, logger: Arc<DebugLogger>) -> Result<(), UploadError> {
    let options = cli.upload_options()?;
    let lane_context = cli.lane_context()?;
    let config = cli.service_config()?;

    let client = HockeyClient::with_logger(&config, Some(Arc::clone(&logger)));
    let action = HockeyAction::new(client, logger);

    if cli.dry_run {
        let request = action.prepare(&options, &lane_context)?;
        let json = serde_json::to_string_pretty(&request.params())
            .map_err(|e| UploadError::Config(format!("Failed to serialize parameters: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let outcome = action.run(&options, &lane_context).await?;
    if let Some(link) = outcome.app_version.download_link() {
        println!("{}", link);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = if cli.log_file { get_logs_dir().ok() } else { None };
    let _guard = match logging::init(&cli.log_level, log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger = Arc::new(DebugLogger::new());
    let result = run(&cli, Arc::clone(&logger)).await;

    if cli.debug_report {
        match get_logs_dir().and_then(|dir| logger.save_report_to_file(&dir)) {
            Ok(path) => tracing::info!("Debug report written to {}", path.display()),
            Err(e) => tracing::warn!("Could not write debug report: {}", e),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
