use crate::domain::model::{ButtonState, ExportFormat, FileUpload};
use crate::domain::ports::{AnalyzePage, ElementId, HomePage};
use crate::utils::error::{RecapError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Visible state of the analysis page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub text_input: String,
    pub selected_file: Option<String>,
    pub button: ButtonState,
    pub result_text: String,
    pub download_links_visible: bool,
    /// Revealed anchors and their hrefs
    pub anchors: HashMap<ExportFormat, String>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Default)]
struct PageState {
    snapshot: PageSnapshot,
    file: Option<FileUpload>,
}

/// Analysis page without a browser: inputs are set programmatically and
/// everything the controller writes is kept for inspection.
#[derive(Debug, Default)]
pub struct HeadlessAnalyzePage {
    missing: HashSet<ElementId>,
    state: Mutex<PageState>,
}

impl HeadlessAnalyzePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page lacking the given controls.
    pub fn without(missing: &[ElementId]) -> Self {
        Self {
            missing: missing.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn type_text(&self, text: &str) {
        self.state().snapshot.text_input = text.to_string();
    }

    pub fn choose_file(&self, file: FileUpload) {
        let mut state = self.state();
        state.snapshot.selected_file = Some(file.file_name.clone());
        state.file = Some(file);
    }

    pub fn clear_file(&self) {
        let mut state = self.state();
        state.snapshot.selected_file = None;
        state.file = None;
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.state().snapshot.clone()
    }
}

impl AnalyzePage for HeadlessAnalyzePage {
    fn has_element(&self, id: ElementId) -> bool {
        !self.missing.contains(&id)
    }

    fn text_input(&self) -> String {
        self.state().snapshot.text_input.clone()
    }

    fn selected_file(&self) -> Option<FileUpload> {
        self.state().file.clone()
    }

    fn set_analyze_button(&self, state: &ButtonState) {
        tracing::debug!(
            "analyze-btn: enabled={}, label={:?}",
            state.enabled,
            state.label
        );
        self.state().snapshot.button = state.clone();
    }

    fn set_result_text(&self, text: &str) {
        self.state().snapshot.result_text = text.to_string();
    }

    fn set_download_links_visible(&self, visible: bool) {
        self.state().snapshot.download_links_visible = visible;
    }

    fn set_download_anchor(&self, format: ExportFormat, href: Option<&str>) {
        let mut state = self.state();
        match href {
            Some(href) => {
                state.snapshot.anchors.insert(format, href.to_string());
            }
            None => {
                state.snapshot.anchors.remove(&format);
            }
        }
    }

    fn alert(&self, message: &str) {
        tracing::warn!("alert: {}", message);
        self.state().snapshot.alerts.push(message.to_string());
    }
}

/// Landing page without a browser. Navigation resolves routes against the
/// site origin and records the resulting location.
#[derive(Debug)]
pub struct HeadlessHomePage {
    origin: Url,
    cards: usize,
    location: Mutex<Option<Url>>,
    alerts: Mutex<Vec<String>>,
}

impl HeadlessHomePage {
    pub fn new(origin: &str, cards: usize) -> Result<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
            cards,
            location: Mutex::new(None),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub fn location(&self) -> Option<String> {
        self.location
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(Url::to_string)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl HomePage for HeadlessHomePage {
    fn card_count(&self) -> usize {
        self.cards
    }

    fn set_location(&self, route: &str) -> Result<()> {
        let target = self
            .origin
            .join(route)
            .map_err(|e| RecapError::NavigationError {
                route: route.to_string(),
                message: e.to_string(),
            })?;
        if target.origin() != self.origin.origin() {
            return Err(RecapError::NavigationError {
                route: route.to_string(),
                message: format!("{} leaves {}", target, self.origin),
            });
        }

        *self
            .location
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(target);
        Ok(())
    }

    fn alert(&self, message: &str) {
        tracing::warn!("alert: {}", message);
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_reveal_and_hide() {
        let page = HeadlessAnalyzePage::new();
        page.set_download_anchor(ExportFormat::Word, Some("blob:http://x/1"));
        assert_eq!(
            page.snapshot().anchors.get(&ExportFormat::Word).map(String::as_str),
            Some("blob:http://x/1")
        );

        page.set_download_anchor(ExportFormat::Word, None);
        assert!(page.snapshot().anchors.is_empty());
    }

    #[test]
    fn test_file_selection() {
        let page = HeadlessAnalyzePage::new();
        page.choose_file(FileUpload::new("cv.pdf", vec![1, 2, 3]));
        assert_eq!(page.snapshot().selected_file.as_deref(), Some("cv.pdf"));
        assert_eq!(page.selected_file().unwrap().data, vec![1, 2, 3]);

        page.clear_file();
        assert!(page.selected_file().is_none());
    }

    #[test]
    fn test_home_location_is_resolved_against_origin() {
        let home = HeadlessHomePage::new("http://127.0.0.1:5000/index", 2).unwrap();
        home.set_location("/analyze").unwrap();
        assert_eq!(home.location().as_deref(), Some("http://127.0.0.1:5000/analyze"));
    }

    #[test]
    fn test_home_rejects_foreign_origin() {
        let home = HeadlessHomePage::new("http://127.0.0.1:5000/", 1).unwrap();
        assert!(home.set_location("https://elsewhere.example/analyze").is_err());
        assert!(home.location().is_none());
    }
}
