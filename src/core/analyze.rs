use crate::core::object_url::ObjectUrlStore;
use crate::domain::model::{ButtonState, ExportFormat, Requirements, Submission};
use crate::domain::ports::{AnalysisBackend, AnalyzePage, ElementId};
use crate::domain::summary::format_summary;
use crate::utils::error::{RecapError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const NO_INPUT_ALERT: &str = "Please provide text or upload a document to analyze.";
pub const ANALYSIS_ERROR_PREFIX: &str = "Error during analysis: ";

/// Where the current click is in the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Ready { url: String },
    Failed { message: String },
    /// A newer submission rendered before this export finished; its result was dropped.
    Superseded,
}

impl ExportStatus {
    pub fn url(&self) -> Option<&str> {
        match self {
            ExportStatus::Ready { url } => Some(url),
            ExportStatus::Failed { .. } | ExportStatus::Superseded => None,
        }
    }
}

/// What one click of the analyze control ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Neither text nor a file was provided; nothing was sent.
    Rejected,
    /// A previous submission is still outstanding.
    Busy,
    Failed {
        message: String,
    },
    Completed {
        summary: String,
        word: ExportStatus,
        excel: ExportStatus,
    },
}

pub struct AnalyzeController<P: AnalyzePage, B: AnalysisBackend> {
    page: P,
    backend: B,
    object_urls: ObjectUrlStore,
    state: Mutex<SubmissionState>,
    in_flight: AtomicBool,
    /// Bumped by every render; exports tagged with an older value are stale.
    generation: AtomicU64,
    anchors: Mutex<HashMap<ExportFormat, String>>,
}

impl<P: AnalyzePage, B: AnalysisBackend> AnalyzeController<P, B> {
    /// Binds the controller to a page, failing if any required control is absent.
    pub fn attach(page: P, backend: B, object_urls: ObjectUrlStore) -> Result<Self> {
        let missing: Vec<String> = ElementId::REQUIRED
            .iter()
            .filter(|id| !page.has_element(**id))
            .map(|id| id.dom_id().to_string())
            .collect();

        if !missing.is_empty() {
            tracing::error!("One or more required page elements are missing: {:?}", missing);
            return Err(RecapError::MissingElements { missing });
        }

        tracing::debug!("Analyze controller attached");
        Ok(Self {
            page,
            backend,
            object_urls,
            state: Mutex::new(SubmissionState::Idle),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            anchors: Mutex::new(HashMap::new()),
        })
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn object_urls(&self) -> &ObjectUrlStore {
        &self.object_urls
    }

    pub fn state(&self) -> SubmissionState {
        *lock(&self.state)
    }

    /// Current href of a download anchor, if it is revealed.
    pub fn download_href(&self, format: ExportFormat) -> Option<String> {
        lock(&self.anchors).get(&format).cloned()
    }

    fn set_state(&self, next: SubmissionState) {
        let mut state = lock(&self.state);
        tracing::debug!("Submission state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Handles one click of the analyze control.
    ///
    /// The control is restored before the exports run; each export only
    /// affects its own anchor, and only while no newer submission has rendered.
    pub async fn on_analyze_click(&self) -> FlowOutcome {
        let Some(mut guard) = SubmitGuard::acquire(self) else {
            tracing::debug!("Analyze clicked while a submission is outstanding, ignoring");
            return FlowOutcome::Busy;
        };

        self.set_state(SubmissionState::Validating);
        let submission =
            match Submission::from_inputs(&self.page.text_input(), self.page.selected_file()) {
                Some(submission) => submission,
                None => {
                    tracing::warn!("Analyze clicked with no text and no file");
                    self.page.alert(NO_INPUT_ALERT);
                    return FlowOutcome::Rejected;
                }
            };

        guard.engage_button();
        self.set_state(SubmissionState::Submitting);
        tracing::info!(
            "Submitting for analysis (text: {}, file: {})",
            submission.text().map(str::len).unwrap_or(0),
            submission
                .file()
                .map(|f| f.file_name.as_str())
                .unwrap_or("none")
        );

        let requirements = match self.backend.analyze(&submission).await {
            Ok(requirements) => requirements,
            Err(e) => {
                tracing::error!("Error during analysis: {}", e);
                let message = e.to_string();
                self.page
                    .set_result_text(&format!("{}{}", ANALYSIS_ERROR_PREFIX, message));
                self.set_state(SubmissionState::Failed);
                return FlowOutcome::Failed { message };
            }
        };

        let (summary, generation) = self.render(&requirements);
        self.set_state(SubmissionState::Succeeded);
        drop(guard);

        let (word, excel) = tokio::join!(
            self.export(ExportFormat::Word, &requirements, generation),
            self.export(ExportFormat::Excel, &requirements, generation)
        );

        FlowOutcome::Completed {
            summary,
            word,
            excel,
        }
    }

    fn render(&self, requirements: &Requirements) -> (String, u64) {
        // 先收回上一輪的連結，避免殘留
        let (previous, generation) = {
            let mut anchors = lock(&self.anchors);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let previous: Vec<(ExportFormat, String)> = anchors.drain().collect();
            (previous, generation)
        };
        for (format, url) in previous {
            self.object_urls.revoke(&url);
            self.page.set_download_anchor(format, None);
        }

        let summary = format_summary(requirements);
        self.page.set_result_text(&summary);
        self.page.set_download_links_visible(true);
        tracing::info!(
            "Analysis complete: {} functional, {} non-functional",
            requirements.functional.len(),
            requirements.non_functional.len()
        );
        (summary, generation)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn export(
        &self,
        format: ExportFormat,
        requirements: &Requirements,
        generation: u64,
    ) -> ExportStatus {
        match self.backend.export(format, requirements).await {
            Ok(mut file) => {
                if file.file_name.is_none() {
                    file.file_name =
                        Some(format.default_file_name(chrono::Local::now().naive_local()));
                }

                // render 也持有同一把鎖，世代檢查與寫入連結不會被插隊
                let mut anchors = lock(&self.anchors);
                if !self.is_current(generation) {
                    tracing::debug!("Dropping {} from an earlier submission", format);
                    return ExportStatus::Superseded;
                }

                let url = self.object_urls.create(file);
                if let Some(stale) = anchors.insert(format, url.clone()) {
                    self.object_urls.revoke(&stale);
                }
                self.page.set_download_anchor(format, Some(&url));
                tracing::info!("{} ready at {}", format, url);
                ExportStatus::Ready { url }
            }
            Err(e) if !self.is_current(generation) => {
                tracing::debug!("Ignoring {} failure from an earlier submission: {}", format, e);
                ExportStatus::Superseded
            }
            Err(e) => {
                tracing::error!("Error downloading {}: {}", format, e);
                let message = e.to_string();
                self.page
                    .alert(&format!("Error downloading {}: {}", format.label(), message));
                ExportStatus::Failed { message }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a submission as outstanding; on drop restores the analyze control
/// (if it was changed) and returns the flow to `Idle`.
struct SubmitGuard<'a, P: AnalyzePage, B: AnalysisBackend> {
    controller: &'a AnalyzeController<P, B>,
    button_engaged: bool,
}

impl<'a, P: AnalyzePage, B: AnalysisBackend> SubmitGuard<'a, P, B> {
    fn acquire(controller: &'a AnalyzeController<P, B>) -> Option<Self> {
        if controller.in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self {
            controller,
            button_engaged: false,
        })
    }

    fn engage_button(&mut self) {
        self.controller.page.set_analyze_button(&ButtonState::busy());
        self.button_engaged = true;
    }
}

impl<P: AnalyzePage, B: AnalysisBackend> Drop for SubmitGuard<'_, P, B> {
    fn drop(&mut self) {
        if self.button_engaged {
            self.controller
                .page
                .set_analyze_button(&ButtonState::idle());
        }
        self.controller.set_state(SubmissionState::Idle);
        self.controller.in_flight.store(false, Ordering::SeqCst);
    }
}
