pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RecapConfig;

pub use adapters::{
    headless::{HeadlessAnalyzePage, HeadlessHomePage},
    http::HttpBackend,
    storage::LocalStorage,
};
pub use core::{
    analyze::{AnalyzeController, ExportStatus, FlowOutcome, SubmissionState},
    navigation::CardNavigator,
    object_url::ObjectUrlStore,
};
pub use utils::error::{RecapError, Result};
