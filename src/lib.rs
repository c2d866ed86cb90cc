//! Upload iOS builds and their symbol archives to a HockeyApp-style
//! distribution service as one step of a build lane.

pub mod action;
pub mod api_contracts;
pub mod config_utils;
pub mod debug_logger;
pub mod error;
pub mod hockey_client;
pub mod lane_context;
pub mod logging;
pub mod options;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod test_harness;

pub use action::{HockeyAction, UploadOutcome};
pub use api_contracts::AppVersion;
pub use config_utils::ServiceConfig;
pub use debug_logger::DebugLogger;
pub use error::UploadError;
pub use hockey_client::{HockeyClient, UploadClient};
pub use lane_context::{LaneContext, SharedValue};
pub use options::UploadOptions;
pub use resolver::resolve;
pub use types::{
    Mandatory, NotesType, Notify, ReleaseStatus, ReleaseType, UploadRequest, DEFAULT_NOTES,
};
