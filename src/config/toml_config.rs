use crate::domain::model::EndpointPaths;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RecapError, Result};
use crate::utils::validation::{validate_endpoint_path, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoints: EndpointPaths,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./downloads".to_string(),
        }
    }
}

impl RecapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RecapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RecapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RECAP_SERVER})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| RecapError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for RecapConfig {
    fn base_url(&self) -> &str {
        &self.server.base_url
    }

    fn endpoints(&self) -> &EndpointPaths {
        &self.endpoints
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for RecapConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;
        validate_path("output.path", &self.output.path)?;

        validate_endpoint_path("endpoints.process_input", &self.endpoints.process_input)?;
        validate_endpoint_path("endpoints.download_word", &self.endpoints.download_word)?;
        validate_endpoint_path("endpoints.download_excel", &self.endpoints.download_excel)?;
        validate_endpoint_path(
            "endpoints.download_version",
            &self.endpoints.download_version,
        )?;

        Ok(())
    }
}
