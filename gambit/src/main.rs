use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gambit::config::{Config, LogFormat};
use gambit::models::{
    AnalysisConfig, AnalysisResponse, BatchRequest, BatchResponse, ContentItem, ContentType,
    ErrorResponse, TargetAudience, VoiceMode,
};
use gambit::processing::AnalysisPipeline;
use gambit::services::{JsonDirSink, LogRenderer, ResultSink, VoiceConsumer, VoiceDispatcher};

#[derive(Parser)]
#[command(name = "gambit")]
#[command(about = "Emotional heatmaps, key moments and narration for chess content")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single game, article or transcript
    Analyze {
        /// File to analyze, or `-` for stdin
        file: PathBuf,

        #[arg(long = "type", default_value = "notation")]
        content_type: ContentType,

        /// JSON file with analysis options (camelCase keys)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        voice_mode: Option<VoiceMode>,

        #[arg(long)]
        audience: Option<TargetAudience>,

        /// Also write the result as JSON into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Analyze every item of a JSON batch manifest
    Batch {
        /// `{"items": [{"content": "...", "type": "notation"}], "config": {...}}`
        manifest: PathBuf,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(config.logging.format);

    let pipeline = AnalysisPipeline::new(&config)?;

    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling pending work...");
            token.cancel();
        }
    });

    let (dispatcher, rx) = VoiceDispatcher::channel();
    let consumer = VoiceConsumer::new(rx, Arc::new(LogRenderer));
    let voice_task = tokio::spawn(consumer.run(cancel_token.child_token()));
    let pipeline = pipeline.with_voice(dispatcher);

    let outcome = match args.command {
        Command::Analyze {
            file,
            content_type,
            config: options_path,
            voice_mode,
            audience,
            output_dir,
        } => {
            let mut options = match options_path {
                Some(path) => read_json::<AnalysisConfig>(&path).await?,
                None => AnalysisConfig::default(),
            };
            if let Some(mode) = voice_mode {
                options.voice_mode = mode;
            }
            if let Some(audience) = audience {
                options.target_audience = audience;
            }
            let content = read_input(&file).await?;
            let item = ContentItem::new(content, content_type);
            run_single(&pipeline, &item, &options, output_dir).await
        }
        Command::Batch {
            manifest,
            output_dir,
        } => {
            let request = read_json::<BatchRequest>(&manifest).await?;
            run_batch(&pipeline, request, &cancel_token, output_dir).await
        }
    };

    // Dropping the pipeline closes the voice channel so the consumer drains and exits
    drop(pipeline);
    if let Ok(rendered) = voice_task.await {
        tracing::debug!(rendered, "Voice hand-off finished");
    }

    outcome
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gambit=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run_single(
    pipeline: &AnalysisPipeline,
    item: &ContentItem,
    options: &AnalysisConfig,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    match pipeline.analyze_with_timeout(item, options).await {
        Ok(result) => {
            if let Some(dir) = output_dir {
                let sink = JsonDirSink::new(dir);
                sink.store(&result).await?;
                tracing::info!(dir = %sink.dir().display(), "Stored analysis result");
            }
            print_json(&AnalysisResponse::new(result))
        }
        Err(e) => {
            tracing::error!(code = %e.code(), "Analysis failed: {}", e);
            print_json(&ErrorResponse::from(&e))?;
            Err(e.into())
        }
    }
}

async fn run_batch(
    pipeline: &AnalysisPipeline,
    request: BatchRequest,
    cancel_token: &CancellationToken,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    match pipeline
        .analyze_batch(request.items, &request.config, cancel_token)
        .await
    {
        Ok(batch) => {
            if let Some(dir) = output_dir {
                let sink = JsonDirSink::new(dir);
                let stored = sink.store_batch(&batch).await?;
                tracing::info!(stored, dir = %sink.dir().display(), "Stored batch results");
            }
            print_json(&BatchResponse::from(&batch))
        }
        Err(e) => {
            tracing::error!(code = %e.code(), "Batch rejected: {}", e);
            print_json(&ErrorResponse::from(&e))?;
            Err(e.into())
        }
    }
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        use tokio::io::AsyncReadExt;
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = read_input(path).await?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
