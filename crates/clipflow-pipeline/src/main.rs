//! Clipflow pipeline binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipflow_media::{check_ffmpeg, check_ffprobe, check_ytdlp, MediaResult};
use clipflow_models::EncodingConfig;
use clipflow_pipeline::acquire::YtDlpAcquirer;
use clipflow_pipeline::discovery::YoutubeSearchProvider;
use clipflow_pipeline::publish::ReelsPublisher;
use clipflow_pipeline::render::FfmpegRenderer;
use clipflow_pipeline::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("clipflow=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting clipflow");

    // Preconditions: config and external tools, checked before any network
    // activity.
    let config = match PipelineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = check_tools() {
        error!("Missing external tool: {}", e);
        std::process::exit(1);
    }

    let client = reqwest::Client::new();
    let pipeline = Pipeline::new(
        config.clone(),
        YoutubeSearchProvider::new(client.clone()),
        YtDlpAcquirer,
        FfmpegRenderer::new(EncodingConfig::default(), config.font_file.clone()),
        ReelsPublisher::new(
            client,
            config.publish_url.clone(),
            config.publish_user.clone(),
            config.publish_pass.clone(),
        ),
    );

    let mut rng = rand::rng();
    match pipeline.run(&mut rng).await {
        Ok(report) if report.no_candidates() => {
            info!(searched = report.searched, "No suitable candidates");
        }
        Ok(report) => {
            info!(
                published = report.published_count(),
                failed = report.failed_count(),
                "Clipflow run finished"
            );
        }
        Err(e) => {
            error!("Pipeline run failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn check_tools() -> MediaResult<()> {
    check_ffmpeg()?;
    check_ffprobe()?;
    check_ytdlp()?;
    Ok(())
}
