use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    input, FileUpload, FixedControls, HttpJobTransport, PaintClient, PaintEvent,
};
use shared::domain::SubmitMode;

mod config;

fn parse_mode(s: &str) -> Result<SubmitMode, String> {
    match s {
        "batch" => Ok(SubmitMode::Batch),
        "single" => Ok(SubmitMode::Single),
        "slow" => Ok(SubmitMode::Slow),
        other => Err(format!(
            "unknown mode '{other}' (expected batch, single or slow)"
        )),
    }
}

#[derive(Parser, Debug)]
struct Args {
    /// Processing backend, e.g. http://127.0.0.1:8000. Overrides painter.toml.
    #[arg(long)]
    server_url: Option<String>,
    /// Line-art content image to submit.
    #[arg(long)]
    content: PathBuf,
    /// Style reference image (slow mode).
    #[arg(long)]
    style: Option<PathBuf>,
    #[arg(long, default_value = "single", value_parser = parse_mode)]
    mode: SubmitMode,
    /// Blur kernel size read at submission time.
    #[arg(long, default_value_t = 3)]
    blur: u32,
    /// Per-style weights, comma separated (single mode).
    #[arg(long, value_delimiter = ',')]
    style_weights: Vec<f64>,
    #[arg(long, default_value_t = 1.0)]
    master_weight: f64,
}

async fn read_upload(path: &Path) -> Result<FileUpload> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let mime = input::mime_for_extension(ext)
        .ok_or_else(|| anyhow!("cannot infer an image MIME type for {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(FileUpload::new(mime, bytes))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);

    let controls = FixedControls {
        blur_kernel: args.blur,
        style_weights: if args.style_weights.is_empty() {
            vec![1.0]
        } else {
            args.style_weights.clone()
        },
        master_weight: args.master_weight,
    };
    let client = PaintClient::with_output_base(
        args.mode,
        Arc::new(HttpJobTransport::new(server_url)),
        Arc::new(controls),
        settings.output_base,
    );
    let mut events = client.subscribe_events();

    if let Some(style_path) = &args.style {
        if !client.load_style_file(read_upload(style_path).await?).await {
            return Err(anyhow!(
                "style file {} is not an image",
                style_path.display()
            ));
        }
    }

    // Batch and single mode submit as part of the content selection; slow
    // mode needs the explicit confirmation.
    let accepted = client
        .load_content_file(read_upload(&args.content).await?)
        .await?;
    if !accepted {
        return Err(anyhow!(
            "content file {} is not an image",
            args.content.display()
        ));
    }
    if !client.mode().auto_submit_on_content() {
        client.submit().await?;
    }

    while let Ok(event) = events.try_recv() {
        match event {
            PaintEvent::OutputsRewritten(bindings) => {
                for binding in bindings {
                    println!("{}", binding.image_url);
                }
            }
            PaintEvent::Alert(message) => eprintln!("{message}"),
            _ => {}
        }
    }

    Ok(())
}
