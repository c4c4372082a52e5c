pub mod analyze;
pub mod downloads;
pub mod navigation;
pub mod object_url;

pub use crate::domain::model::{ExportFormat, Requirements, Submission};
pub use crate::domain::ports::{AnalysisBackend, AnalyzePage, ConfigProvider, HomePage, Storage};
pub use crate::utils::error::Result;
