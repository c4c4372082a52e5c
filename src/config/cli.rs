use crate::domain::model::EndpointPaths;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "recap")]
#[command(about = "Submit text or documents for requirements extraction and fetch the generated exports")]
pub struct CliConfig {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    #[arg(long, default_value = "./downloads")]
    pub output_path: String,

    /// TOML file; replaces --base-url and --output-path when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(skip)]
    pub endpoints: EndpointPaths,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Analyze text and/or a document, then save the Word and Excel exports
    Analyze {
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,

        /// Print the summary only
        #[arg(long)]
        no_save: bool,
    },
    /// Follow a landing-page card to the analysis page
    Open,
    /// Download a stored document version
    Version { id: String },
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoints(&self) -> &EndpointPaths {
        &self.endpoints
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
