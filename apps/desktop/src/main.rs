use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    human_readable_bytes, load_settings, HttpPredictionClient, StatusView, SubmissionController,
};
use tracing_subscriber::EnvFilter;

/// Submit a chest X-ray image to the prediction service and print the result.
#[derive(Parser, Debug)]
struct Args {
    /// Image file to submit.
    file: Option<PathBuf>,
    /// Prediction service origin; overrides config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Config file (defaults to ./client.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the generated preview data URI to this path.
    #[arg(long)]
    preview_out: Option<PathBuf>,
    /// Only probe the service root and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())
        .context("failed to load client settings")?
        .with_api_url_override(args.api_url);
    let client = HttpPredictionClient::new(&settings).context("failed to build http client")?;
    let predict_url = client.predict_url().clone();
    let mut controller = SubmissionController::new(client);

    if args.check {
        return Ok(match controller.check_service().await {
            Ok(()) => {
                println!("Prediction service at {} is reachable", settings.api_url);
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "health probe failed");
                eprintln!("Prediction service at {} is unreachable", settings.api_url);
                ExitCode::FAILURE
            }
        });
    }

    if let Some(path) = &args.file {
        if let Err(err) = controller.select_path(path).await {
            tracing::error!(error = %err, "could not stage file");
            eprintln!("{}", err.user_message());
            return Ok(ExitCode::from(2));
        }
    }

    if let Some(file) = controller.session().staged_file() {
        println!("Staged {} ({})", file.name(), human_readable_bytes(file.size()));
    }
    if let Some(out) = &args.preview_out {
        match controller.session().preview() {
            Some(preview) => tokio::fs::write(out, preview.data_uri())
                .await
                .with_context(|| format!("failed to write preview to '{}'", out.display()))?,
            None => tracing::warn!("no preview available to write"),
        }
    }

    tracing::info!(url = %predict_url, "submitting");
    if let Err(err) = controller.submit().await {
        tracing::debug!(error = %err, "submission rejected locally");
    }

    println!("{}", render_status(controller.view()));
    Ok(exit_code_for(controller.view()))
}

fn render_status(view: StatusView<'_>) -> String {
    match view {
        StatusView::Empty => String::new(),
        StatusView::Validation(message) => message.to_string(),
        StatusView::Prediction {
            headline, message, ..
        } => format!("{headline}\n{message}"),
        StatusView::Failure(message) => format!("Error: {message}"),
    }
}

fn exit_code_for(view: StatusView<'_>) -> ExitCode {
    match view {
        StatusView::Prediction { .. } => ExitCode::SUCCESS,
        StatusView::Validation(_) => ExitCode::from(2),
        StatusView::Empty | StatusView::Failure(_) => ExitCode::FAILURE,
    }
}
