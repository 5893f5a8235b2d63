use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scene_adapters::gemini::GeminiAdapter;
use scene_config::{ConfigOverrides, StudioConfig};
use scene_kernel::{GenerativePromptService, WizardController};
use scene_studio::Shell;
use scene_telemetry::TelemetryConfig;
use tokio::io::BufReader;
use tracing::info;

/// Turn a script into image, video and structured scene prompts.
#[derive(Debug, Parser)]
#[command(name = "scene-studio", version, about)]
struct Cli {
    /// Gemini model identifier.
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the Gemini REST API.
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory receiving saved exports.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Sampling temperature between 0.0 and 2.0.
    #[arg(long)]
    temperature: Option<f32>,

    /// Log filter directive, overriding `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            output_dir: self.output_dir.clone(),
            temperature: self.temperature,
        }
    }

    fn telemetry(&self) -> TelemetryConfig {
        let config = TelemetryConfig::default();
        match &self.log_level {
            Some(directive) => config.with_directive(directive.clone()),
            None => config,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dotenv = scene_config::load_dotenv();

    scene_telemetry::init(&cli.telemetry()).context("failed to initialise logging")?;
    if let Some(path) = dotenv {
        info!(path = %path.display(), "environment loaded from file");
    }

    let config = StudioConfig::from_env(cli.overrides()).context("invalid configuration")?;
    info!(model = config.model(), output_dir = %config.output_dir().display(), "configuration resolved");

    let adapter = GeminiAdapter::new(config.gemini_config()?)
        .context("failed to construct Gemini adapter")?;
    let service = GenerativePromptService::new(Arc::new(adapter))
        .context("failed to load prompt templates")?;
    let controller = WizardController::new(Arc::new(service));

    let mut shell = Shell::new(controller, config.output_dir(), std::io::stdout());
    tokio::select! {
        result = shell.run(BufReader::new(tokio::io::stdin())) => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    Ok(())
}
