use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 使用者選擇的上傳檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    /// Builds an upload with a content type guessed from the file name.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            data,
        }
    }
}

/// What one click of the analyze control sends to the backend.
///
/// At least one of `text` and `file` is always present; [`Submission::from_inputs`]
/// is the only constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    text: Option<String>,
    file: Option<FileUpload>,
}

impl Submission {
    /// Trims the raw text input and pairs it with the first selected file.
    /// Returns `None` when both are empty.
    pub fn from_inputs(raw_text: &str, file: Option<FileUpload>) -> Option<Self> {
        let trimmed = raw_text.trim();
        let text = (!trimmed.is_empty()).then(|| trimmed.to_string());

        if text.is_none() && file.is_none() {
            return None;
        }

        Some(Self { text, file })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn file(&self) -> Option<&FileUpload> {
        self.file.as_ref()
    }
}

/// Structured analysis result owned by the backend.
///
/// Unknown fields are kept in `extra` so the object can be forwarded to the
/// export endpoints exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub functional: Vec<String>,
    pub non_functional: Vec<String>,
    /// MoSCoW label -> score, in the order the backend sent them
    pub priority: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifications: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `/process-input`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
}

/// Body of both export requests.
#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
    pub requirements: &'a Requirements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Word,
    Excel,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Word => "Word document",
            ExportFormat::Excel => "Excel file",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// 後端產生檔名的前綴
    pub fn file_stem(&self) -> &'static str {
        match self {
            ExportFormat::Word => "requirements",
            ExportFormat::Excel => "user_stories",
        }
    }

    /// Filename the backend would have chosen at `now`.
    pub fn default_file_name(&self, now: chrono::NaiveDateTime) -> String {
        format!(
            "{}_{}.{}",
            self.file_stem(),
            now.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A binary response body plus what the server said about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub data: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Backend routes, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub process_input: String,
    pub download_word: String,
    pub download_excel: String,
    pub download_version: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            process_input: "/process-input".to_string(),
            download_word: "/download-word".to_string(),
            download_excel: "/download-excel".to_string(),
            download_version: "/download-version".to_string(),
        }
    }
}

impl EndpointPaths {
    pub fn export(&self, format: ExportFormat) -> &str {
        match format {
            ExportFormat::Word => &self.download_word,
            ExportFormat::Excel => &self.download_excel,
        }
    }
}

/// Enabled flag and label of the analyze control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    pub label: String,
}

impl ButtonState {
    pub const IDLE_LABEL: &'static str = "Analyze with AI";
    pub const BUSY_LABEL: &'static str = "Analyzing...";

    pub fn idle() -> Self {
        Self {
            enabled: true,
            label: Self::IDLE_LABEL.to_string(),
        }
    }

    pub fn busy() -> Self {
        Self {
            enabled: false,
            label: Self::BUSY_LABEL.to_string(),
        }
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::idle()
    }
}
