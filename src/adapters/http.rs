use crate::domain::model::{
    AnalysisResponse, DownloadedFile, EndpointPaths, ExportFormat, ExportRequest, Requirements,
    Submission,
};
use crate::domain::ports::{AnalysisBackend, ConfigProvider};
use crate::utils::error::{RecapError, Result};
use crate::utils::validation::{validate_file_extension, validate_non_empty_string};
use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use url::Url;

/// 伺服器能抽取文字的檔案類型
pub const SUPPORTED_UPLOADS: [&str; 3] = ["pdf", "docx", "txt"];

/// [`AnalysisBackend`] over the server's HTTP endpoints.
///
/// No timeouts or retries: each call is a single request.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    endpoints: EndpointPaths,
}

impl HttpBackend {
    pub fn new(base_url: &str, endpoints: EndpointPaths) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url)?,
            endpoints,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.base_url(), config.endpoints().clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn multipart_form(submission: &Submission) -> Result<Form> {
        let mut form = Form::new();

        if let Some(text) = submission.text() {
            form = form.text("text", text.to_string());
        }

        if let Some(file) = submission.file() {
            if let Err(e) = validate_file_extension("file", &file.file_name, &SUPPORTED_UPLOADS) {
                tracing::warn!("{}; the server may not extract any text from it", e);
            }
            let part = Part::bytes(file.data.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            form = form.part("file", part);
        }

        Ok(form)
    }

    /// Reads a binary response, treating any non-2xx status as a failure.
    async fn read_file(
        endpoint: &str,
        response: Response,
        fallback_type: &str,
    ) -> Result<DownloadedFile> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecapError::HttpStatusError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(fallback_type)
            .to_string();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_file_name);

        let data = response.bytes().await?.to_vec();
        tracing::debug!("{} returned {} bytes ({})", endpoint, data.len(), content_type);

        Ok(DownloadedFile {
            data,
            content_type,
            file_name,
        })
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, submission: &Submission) -> Result<Requirements> {
        let endpoint = &self.endpoints.process_input;
        let url = self.endpoint_url(endpoint)?;
        let form = Self::multipart_form(submission)?;

        tracing::debug!("POST {}", url);
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        tracing::debug!("Analysis response status: {}", status);

        // 錯誤狀態碼也帶 JSON，所以一律解析 body
        let body = response.text().await?;
        let parsed: AnalysisResponse =
            serde_json::from_str(&body).map_err(|e| RecapError::MalformedResponse {
                endpoint: endpoint.clone(),
                message: format!("invalid JSON (HTTP {}): {}", status, e),
            })?;

        if let Some(message) = parsed.error.filter(|m| !m.is_empty()) {
            return Err(RecapError::BackendError { message });
        }

        parsed
            .requirements
            .ok_or_else(|| RecapError::MalformedResponse {
                endpoint: endpoint.clone(),
                message: format!("no requirements in response (HTTP {})", status),
            })
    }

    async fn export(
        &self,
        format: ExportFormat,
        requirements: &Requirements,
    ) -> Result<DownloadedFile> {
        let endpoint = self.endpoints.export(format);
        let url = self.endpoint_url(endpoint)?;

        tracing::debug!("POST {} ({})", url, format);
        let response = self
            .client
            .post(url)
            .json(&ExportRequest { requirements })
            .send()
            .await?;

        Self::read_file(endpoint, response, format.content_type()).await
    }

    async fn download_version(&self, version_id: &str) -> Result<DownloadedFile> {
        validate_non_empty_string("version_id", version_id)?;

        let endpoint = &self.endpoints.download_version;
        let mut url = self.endpoint_url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| RecapError::ConfigError {
                message: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(version_id);

        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        Self::read_file(endpoint, response, "application/octet-stream").await
    }
}

/// Pulls the filename out of a `Content-Disposition` header value.
///
/// Parameter names are case-insensitive; `filename*` (RFC 5987) wins over
/// `filename` and is percent-decoded.
pub fn attachment_file_name(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("filename*") {
            // charset'lang'value
            let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
            if let Ok(decoded) = urlencoding::decode(encoded.trim_matches('"')) {
                extended = Some(decoded.into_owned());
            }
        } else if name.eq_ignore_ascii_case("filename") {
            plain = Some(unquote(value));
        }
    }

    extended
        .filter(|v| !v.is_empty())
        .or_else(|| plain.filter(|v| !v.is_empty()))
}

/// Splits on `;` outside double quotes.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(header[start..].trim());
    params
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}
