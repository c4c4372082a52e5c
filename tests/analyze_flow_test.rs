use anyhow::Result;
use httpmock::prelude::*;
use recap_client::core::analyze::{ANALYSIS_ERROR_PREFIX, NO_INPUT_ALERT};
use recap_client::core::downloads::save_download;
use recap_client::domain::model::{ButtonState, EndpointPaths, ExportFormat};
use recap_client::domain::ports::ElementId;
use recap_client::{
    AnalyzeController, ExportStatus, FlowOutcome, HeadlessAnalyzePage, HttpBackend, LocalStorage,
    ObjectUrlStore, RecapError, SubmissionState,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

const EXPECTED_SUMMARY: &str = "Analysis Complete!\nFunctional Requirements:\nA\nNon-Functional Requirements:\nNone identified.\nPriority (MoSCoW Method):\nMust: 5\nShould: 2\n\nClarifications Needed:\nIs X required?";

fn requirements_json() -> serde_json::Value {
    json!({
        "functional": ["A"],
        "non_functional": [],
        "priority": {"Must": 5, "Should": 2},
        "clarifications": ["Is X required?"]
    })
}

fn controller(
    server: &MockServer,
    page: Arc<HeadlessAnalyzePage>,
) -> AnalyzeController<Arc<HeadlessAnalyzePage>, HttpBackend> {
    let backend = HttpBackend::new(&server.base_url(), EndpointPaths::default()).unwrap();
    AnalyzeController::attach(page, backend, ObjectUrlStore::new(server.base_url())).unwrap()
}

fn mock_exports(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/download-word")
            .json_body(json!({ "requirements": requirements_json() }));
        then.status(200)
            .header(
                "Content-Disposition",
                "attachment; filename=requirements_20240309_140507.docx",
            )
            .body(b"word-bytes");
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/download-excel")
            .json_body(json!({ "requirements": requirements_json() }));
        then.status(200)
            .header(
                "Content-Disposition",
                "attachment; filename=user_stories_20240309_140507.xlsx",
            )
            .body(b"excel-bytes");
    });
}

#[tokio::test]
async fn test_end_to_end_analysis_and_downloads() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let analysis = server.mock(|when, then| {
        when.method(POST)
            .path("/process-input")
            .body_contains("Build a login page");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({ "requirements": requirements_json() }));
    });
    mock_exports(&server);

    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("Build a login page");
    let controller = controller(&server, page.clone());

    let outcome = controller.on_analyze_click().await;

    analysis.assert();
    let FlowOutcome::Completed {
        summary,
        word,
        excel,
    } = outcome
    else {
        panic!("expected Completed, got {:?}", outcome);
    };
    assert_eq!(summary, EXPECTED_SUMMARY);

    let snapshot = page.snapshot();
    assert_eq!(snapshot.result_text, EXPECTED_SUMMARY);
    assert!(snapshot.download_links_visible);
    assert_eq!(snapshot.anchors.len(), 2);
    assert_eq!(snapshot.button, ButtonState::idle());
    assert!(snapshot.alerts.is_empty());

    let storage = LocalStorage::new(temp_dir.path());
    let word_path = save_download(controller.object_urls(), word.url().unwrap(), &storage).await?;
    let excel_path =
        save_download(controller.object_urls(), excel.url().unwrap(), &storage).await?;

    assert!(word_path.ends_with("requirements_20240309_140507.docx"));
    assert!(excel_path.ends_with("user_stories_20240309_140507.xlsx"));
    assert_eq!(std::fs::read(word_path)?, b"word-bytes");
    assert_eq!(std::fs::read(excel_path)?, b"excel-bytes");
    Ok(())
}

#[tokio::test]
async fn test_empty_submission_issues_no_request() {
    let server = MockServer::start();
    let analysis = server.mock(|when, then| {
        when.method(POST).path("/process-input");
        then.status(200)
            .json_body(json!({ "requirements": requirements_json() }));
    });

    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("   ");
    let controller = controller(&server, page.clone());

    assert_eq!(controller.on_analyze_click().await, FlowOutcome::Rejected);
    assert_eq!(analysis.hits(), 0);
    assert_eq!(page.snapshot().alerts, vec![NO_INPUT_ALERT.to_string()]);
    assert_eq!(page.snapshot().button, ButtonState::idle());
}

#[tokio::test]
async fn test_backend_error_is_displayed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/process-input");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({ "error": "bad file" }));
    });
    let exports = server.mock(|when, then| {
        when.method(POST).path("/download-word");
        then.status(200).body(b"unused");
    });

    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("Build a login page");
    let controller = controller(&server, page.clone());

    let outcome = controller.on_analyze_click().await;

    assert!(matches!(outcome, FlowOutcome::Failed { .. }));
    let snapshot = page.snapshot();
    assert_eq!(snapshot.result_text, "Error during analysis: bad file");
    assert_eq!(snapshot.button, ButtonState::idle());
    assert!(snapshot.anchors.is_empty());
    assert_eq!(exports.hits(), 0);
    assert_eq!(controller.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_unreachable_backend_is_displayed() {
    // 沒有伺服器在聽的埠
    let backend = HttpBackend::new("http://127.0.0.1:9", EndpointPaths::default()).unwrap();
    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("Build a login page");
    let controller =
        AnalyzeController::attach(page.clone(), backend, ObjectUrlStore::new("http://127.0.0.1:9"))
            .unwrap();

    let outcome = controller.on_analyze_click().await;

    assert!(matches!(outcome, FlowOutcome::Failed { .. }));
    assert!(page.snapshot().result_text.starts_with(ANALYSIS_ERROR_PREFIX));
    assert_eq!(page.snapshot().button, ButtonState::idle());
}

#[tokio::test]
async fn test_excel_failure_leaves_word_download() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/process-input");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({ "requirements": requirements_json() }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/download-word");
        then.status(200).body(b"word-bytes");
    });
    server.mock(|when, then| {
        when.method(POST).path("/download-excel");
        then.status(500).body("Error pushing to JIRA");
    });

    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("Build a login page");
    let controller = controller(&server, page.clone());

    let outcome = controller.on_analyze_click().await;

    let FlowOutcome::Completed { word, excel, .. } = outcome else {
        panic!("expected Completed");
    };
    assert!(matches!(word, ExportStatus::Ready { .. }));
    assert!(matches!(excel, ExportStatus::Failed { .. }));

    let snapshot = page.snapshot();
    assert_eq!(snapshot.result_text, EXPECTED_SUMMARY);
    assert!(snapshot.anchors.contains_key(&ExportFormat::Word));
    assert!(!snapshot.anchors.contains_key(&ExportFormat::Excel));
    assert_eq!(snapshot.alerts.len(), 1);
    assert!(snapshot.alerts[0].starts_with("Error downloading Excel file: "));

    // 沒有檔名時用本地時間產生
    let word_file = controller.object_urls().resolve(word.url().unwrap()).unwrap();
    let name = word_file.file_name.as_deref().unwrap();
    assert!(name.starts_with("requirements_") && name.ends_with(".docx"));
}

#[tokio::test]
async fn test_repeated_submission_overwrites_previous_render() {
    let server = MockServer::start();
    let analysis = server.mock(|when, then| {
        when.method(POST).path("/process-input");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({ "requirements": requirements_json() }));
    });
    mock_exports(&server);

    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text("Build a login page");
    let controller = controller(&server, page.clone());

    let first = controller.on_analyze_click().await;
    let after_first = page.snapshot();
    let second = controller.on_analyze_click().await;
    let after_second = page.snapshot();

    analysis.assert_hits(2);
    assert!(matches!(first, FlowOutcome::Completed { .. }));
    assert!(matches!(second, FlowOutcome::Completed { .. }));
    assert_eq!(after_first.result_text, after_second.result_text);
    assert_eq!(after_second.anchors.len(), 2);
    assert_ne!(
        after_first.anchors.get(&ExportFormat::Word),
        after_second.anchors.get(&ExportFormat::Word)
    );
    // 舊連結已回收，只剩這一輪的兩個
    assert_eq!(controller.object_urls().len(), 2);
    assert_eq!(after_second.button, ButtonState::idle());
}

#[test]
fn test_attach_fails_when_page_is_incomplete() {
    let backend = HttpBackend::new("http://127.0.0.1:5000", EndpointPaths::default()).unwrap();
    let page = HeadlessAnalyzePage::without(&[ElementId::AnalyzeButton]);

    let result = AnalyzeController::attach(page, backend, ObjectUrlStore::new("http://127.0.0.1:5000"));

    assert!(matches!(
        result,
        Err(RecapError::MissingElements { ref missing }) if missing == &vec!["analyze-btn".to_string()]
    ));
}
