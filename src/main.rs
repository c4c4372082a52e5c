use anyhow::Context;
use clap::Parser;
use recap_client::config::Command;
use recap_client::core::downloads::save_download;
use recap_client::domain::model::FileUpload;
use recap_client::domain::ports::{AnalysisBackend, ConfigProvider, Storage};
use recap_client::utils::error::ErrorSeverity;
use recap_client::utils::{logger, validation::Validate};
use recap_client::{
    AnalyzeController, CardNavigator, CliConfig, ExportStatus, FlowOutcome, HeadlessAnalyzePage,
    HeadlessHomePage, HttpBackend, LocalStorage, ObjectUrlStore, RecapConfig, RecapError,
};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting recap client");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let result = match cli.command.clone() {
        Command::Analyze {
            text,
            file,
            no_save,
        } => run_analyze(settings.as_ref(), text, file, no_save).await,
        Command::Open => run_open(settings.as_ref()),
        Command::Version { id } => run_version(settings.as_ref(), &id).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<RecapError>() {
            Some(err) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());

                // 依嚴重程度決定退出碼
                let exit_code = match err.severity() {
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                std::process::exit(exit_code);
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_settings(cli: &CliConfig) -> recap_client::Result<Box<dyn ConfigProvider>> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            let config = RecapConfig::from_file(path)?;
            config.validate()?;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

async fn run_analyze(
    settings: &dyn ConfigProvider,
    text: Option<String>,
    file: Option<PathBuf>,
    no_save: bool,
) -> anyhow::Result<()> {
    let page = Arc::new(HeadlessAnalyzePage::new());
    page.type_text(text.as_deref().unwrap_or_default());

    if let Some(path) = file {
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        page.choose_file(FileUpload::new(file_name, data));
    }

    let backend = HttpBackend::from_config(settings)?;
    let object_urls = ObjectUrlStore::new(backend.base_url().origin().ascii_serialization());
    let controller = AnalyzeController::attach(page.clone(), backend, object_urls)?;

    match controller.on_analyze_click().await {
        FlowOutcome::Rejected => Err(RecapError::EmptySubmission.into()),
        FlowOutcome::Busy => Ok(()),
        FlowOutcome::Failed { .. } => anyhow::bail!("{}", page.snapshot().result_text),
        FlowOutcome::Completed {
            summary,
            word,
            excel,
        } => {
            println!("{}", summary);
            if no_save {
                return Ok(());
            }

            let storage = LocalStorage::new(settings.output_path());
            for status in [word, excel] {
                if let ExportStatus::Ready { url } = status {
                    let saved = save_download(controller.object_urls(), &url, &storage).await?;
                    println!("📁 Saved {}", saved);
                }
            }
            Ok(())
        }
    }
}

fn run_open(settings: &dyn ConfigProvider) -> anyhow::Result<()> {
    let home = HeadlessHomePage::new(settings.base_url(), 1)?;
    let navigator = CardNavigator::attach(home)?;
    navigator.on_card_click()?;

    if let Some(location) = navigator.page().location() {
        println!("{}", location);
    }
    Ok(())
}

async fn run_version(settings: &dyn ConfigProvider, id: &str) -> anyhow::Result<()> {
    let backend = HttpBackend::from_config(settings)?;
    let file = backend.download_version(id).await?;

    let file_name = file
        .file_name
        .clone()
        .unwrap_or_else(|| format!("version_{}", id));
    let storage = LocalStorage::new(settings.output_path());
    let saved = storage.write_file(&file_name, &file.data).await?;

    println!("📁 Saved {}", saved);
    Ok(())
}
