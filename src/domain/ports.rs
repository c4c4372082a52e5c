use crate::domain::model::{
    ButtonState, DownloadedFile, EndpointPaths, ExportFormat, FileUpload, Requirements, Submission,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;

pub trait Storage: Send + Sync {
    /// Writes `data` under `path` and returns where it landed.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn endpoints(&self) -> &EndpointPaths;
    fn output_path(&self) -> &str;
}

/// The server side: requirement extraction and document generation.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, submission: &Submission) -> Result<Requirements>;
    async fn export(
        &self,
        format: ExportFormat,
        requirements: &Requirements,
    ) -> Result<DownloadedFile>;
    async fn download_version(&self, version_id: &str) -> Result<DownloadedFile>;
}

/// Controls of the analysis page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    AnalyzeButton,
    TextInput,
    FileInput,
    ResultSummary,
    DownloadLinks,
    DownloadWord,
    DownloadExcel,
}

impl ElementId {
    pub const REQUIRED: [ElementId; 7] = [
        ElementId::AnalyzeButton,
        ElementId::TextInput,
        ElementId::FileInput,
        ElementId::ResultSummary,
        ElementId::DownloadLinks,
        ElementId::DownloadWord,
        ElementId::DownloadExcel,
    ];

    pub fn dom_id(&self) -> &'static str {
        match self {
            ElementId::AnalyzeButton => "analyze-btn",
            ElementId::TextInput => "text-input",
            ElementId::FileInput => "file-input",
            ElementId::ResultSummary => "result-summary",
            ElementId::DownloadLinks => "download-links",
            ElementId::DownloadWord => "download-word",
            ElementId::DownloadExcel => "download-excel",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}

/// The analysis page as seen by [`crate::core::analyze::AnalyzeController`].
///
/// Setters take `&self`: both export sub-flows write to the page while
/// running concurrently, so implementations keep their state behind a lock.
pub trait AnalyzePage: Send + Sync {
    fn has_element(&self, id: ElementId) -> bool;
    fn text_input(&self) -> String;
    fn selected_file(&self) -> Option<FileUpload>;
    fn set_analyze_button(&self, state: &ButtonState);
    fn set_result_text(&self, text: &str);
    fn set_download_links_visible(&self, visible: bool);
    /// `Some(href)` assigns the href and reveals the anchor, `None` hides it.
    fn set_download_anchor(&self, format: ExportFormat, href: Option<&str>);
    fn alert(&self, message: &str);
}

/// The landing page with its card controls.
pub trait HomePage: Send + Sync {
    fn card_count(&self) -> usize;
    fn set_location(&self, route: &str) -> Result<()>;
    fn alert(&self, message: &str);
}

impl<T: AnalyzePage + ?Sized> AnalyzePage for std::sync::Arc<T> {
    fn has_element(&self, id: ElementId) -> bool {
        (**self).has_element(id)
    }

    fn text_input(&self) -> String {
        (**self).text_input()
    }

    fn selected_file(&self) -> Option<FileUpload> {
        (**self).selected_file()
    }

    fn set_analyze_button(&self, state: &ButtonState) {
        (**self).set_analyze_button(state)
    }

    fn set_result_text(&self, text: &str) {
        (**self).set_result_text(text)
    }

    fn set_download_links_visible(&self, visible: bool) {
        (**self).set_download_links_visible(visible)
    }

    fn set_download_anchor(&self, format: ExportFormat, href: Option<&str>) {
        (**self).set_download_anchor(format, href)
    }

    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}

impl<T: HomePage + ?Sized> HomePage for std::sync::Arc<T> {
    fn card_count(&self) -> usize {
        (**self).card_count()
    }

    fn set_location(&self, route: &str) -> Result<()> {
        (**self).set_location(route)
    }

    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}
