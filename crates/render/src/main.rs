use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use groupframe_config::Settings;
use groupframe_render::compress::{CompressionOptions, compress_image};
use groupframe_render::{
    CanvasRenderer, FlowConfig, HttpOrderSource, HttpPhotoLoader, NoFaceDetection, RenderFlow,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Render harness for GroupFrame orders.
#[derive(Parser)]
#[command(name = "groupframe-render", version)]
struct Cli {
    /// Overrides `render.api_base`.
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the variant listing for an order as JSON.
    Variants {
        #[arg(long)]
        order: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Render one variant and print the report as JSON.
    Render {
        #[arg(long)]
        order: String,
        #[arg(long)]
        variant: String,
        #[arg(long)]
        token: Option<String>,
        /// Also write the PNG here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Re-encode a member photo as JPEG under a size budget.
    Compress {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 500)]
        target_kb: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // stdout carries the JSON report, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groupframe_render=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    if let Command::Compress { input, output, target_kb } = &cli.command {
        let options = CompressionOptions {
            target_bytes: target_kb * 1024,
            max_dimension: settings.render.max_photo_dimension,
            ..CompressionOptions::default()
        };
        let image = image::open(input)?;
        let compressed = compress_image(image, &options)?;
        tokio::fs::write(output, &compressed.bytes).await?;
        println!(
            "{}",
            serde_json::json!({
                "output": output.display().to_string(),
                "bytes": compressed.bytes.len(),
                "quality": compressed.quality,
                "iterations": compressed.iterations,
                "width": compressed.width,
                "height": compressed.height,
            })
        );
        return Ok(ExitCode::SUCCESS);
    }

    let api_base = cli.api_base.unwrap_or_else(|| settings.render.api_base.clone());
    info!(api_base = %api_base, "Starting render harness");

    let source = Arc::new(HttpOrderSource::new(api_base)?);
    let loader = Arc::new(HttpPhotoLoader::new(Duration::from_secs(
        settings.render.fetch_timeout_secs,
    ))?);
    let renderer = Arc::new(CanvasRenderer::new(
        loader,
        Arc::new(NoFaceDetection),
        settings.render.max_photo_dimension,
    ));
    let flow = RenderFlow::new(source, renderer, FlowConfig::from_settings(&settings.render));

    match cli.command {
        Command::Variants { order, token } => match flow.bootstrap(&order, token.as_deref()).await {
            Ok(listing) => {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                println!("{}", serde_json::json!({ "status": flow.status(), "error": e.to_string() }));
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Render { order, variant, token, output } => {
            let report = flow.run(&order, &variant, token.as_deref()).await;
            if let (Some(path), Some(image)) = (output.as_ref(), report.image.as_deref()) {
                let png = data_url_payload(image)?;
                tokio::fs::write(path, png).await?;
                info!(path = %path.display(), "Wrote PNG");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Command::Compress { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn data_url_payload(url: &str) -> anyhow::Result<Vec<u8>> {
    use base64::Engine;
    let (_, payload) = url
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("malformed image data URL"))?;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}
