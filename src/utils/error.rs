use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecapError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// 後端回應中的 error 欄位，原文顯示
    #[error("{message}")]
    BackendError { message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatusError {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("No text or document provided")]
    EmptySubmission,

    #[error("Required page elements are missing: {}", .missing.join(", "))]
    MissingElements { missing: Vec<String> },

    #[error("No card controls found on the page")]
    NoCardControls,

    #[error("Navigation to {route} failed: {message}")]
    NavigationError { route: String, message: String },

    #[error("Unknown object URL: {url}")]
    UnknownObjectUrl { url: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Input,
    Page,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RecapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecapError::ApiError(_) | RecapError::HttpStatusError { .. } => ErrorCategory::Network,
            RecapError::BackendError { .. }
            | RecapError::MalformedResponse { .. }
            | RecapError::SerializationError(_) => ErrorCategory::Backend,
            RecapError::EmptySubmission => ErrorCategory::Input,
            RecapError::MissingElements { .. }
            | RecapError::NoCardControls
            | RecapError::NavigationError { .. }
            | RecapError::UnknownObjectUrl { .. } => ErrorCategory::Page,
            RecapError::UrlError(_)
            | RecapError::ConfigError { .. }
            | RecapError::ConfigValidationError { .. }
            | RecapError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RecapError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Network | ErrorCategory::Backend => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Page | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the analysis server is running and reachable",
            ErrorCategory::Backend => "Try again with a different document or plain text input",
            ErrorCategory::Input => "Provide --text or --file",
            ErrorCategory::Page => "Make sure the page exposes every required control",
            ErrorCategory::Configuration => "Check the base URL, endpoint paths and output path",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RecapError::BackendError { message } => {
                format!("The server rejected the input: {}", message)
            }
            RecapError::ApiError(e) if e.is_connect() => {
                "Could not connect to the analysis server".to_string()
            }
            RecapError::HttpStatusError { status, endpoint, .. } => {
                format!("The server answered {} for {}", status, endpoint)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecapError>;
