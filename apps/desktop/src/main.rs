use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    dimensions::physical_size,
    folders::{find_batch_folders, resolve_input_image},
    settings::{resolve_settings_path, Settings},
    workflow, RequestDraft, VectorizerClient,
};
use shared::domain::{Mode, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Runs one vectorization with the stored settings and prints where the result went.
#[derive(Parser, Debug)]
struct Args {
    /// Settings file (defaults to $VECTORIZER_CONFIG, then ./vectorizer.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Source image. Required unless --batch resolves one.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Folder number looked up under the input base folder; also names the output file.
    #[arg(long)]
    batch: Option<String>,
    #[arg(long)]
    mode: Option<Mode>,
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Print width; computed from the image when omitted.
    #[arg(long)]
    width_cm: Option<String>,
    /// Print height; computed from the image when omitted.
    #[arg(long)]
    height_cm: Option<String>,
    #[arg(long)]
    output_folder: Option<String>,
    /// Print the stored result as JSON.
    #[arg(long)]
    json: bool,
}

/// Uses the given size, filling in what is missing from the image itself.
fn apply_size(
    draft: &mut RequestDraft,
    image: &Path,
    width_cm: Option<String>,
    height_cm: Option<String>,
) -> Result<()> {
    if width_cm.is_none() || height_cm.is_none() {
        let (width, height) = physical_size(image)
            .context("could not read the image size; pass --width-cm and --height-cm")?;
        draft.width_cm = width.to_string();
        draft.height_cm = height.to_string();
    }
    if let Some(width) = width_cm {
        draft.width_cm = width;
    }
    if let Some(height) = height_cm {
        draft.height_cm = height;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings_path = resolve_settings_path(args.config);
    let settings = Settings::load(&settings_path)?;
    let mut draft = settings.draft();

    if let Some(batch) = &args.batch {
        draft.batch_id = batch.clone();
    }
    let image = match (args.image, args.batch.as_deref()) {
        (Some(image), _) => image,
        (None, Some(batch)) => {
            let base = PathBuf::from(settings.settings.input_base_folder.trim());
            let folders = find_batch_folders(&base, batch)?;
            if folders.len() > 1 {
                bail!(
                    "folder number {batch} matches several folders ({}); pass --image instead",
                    folders.join(", ")
                );
            }
            let folder = folders
                .first()
                .with_context(|| format!("no folder found for {batch}"))?;
            resolve_input_image(&base, folder)?
        }
        (None, None) => bail!("pass --image or --batch"),
    };
    draft.image_path = image.display().to_string();

    if let Some(mode) = args.mode {
        draft.mode = mode;
    }
    if let Some(format) = args.format {
        draft.output_format = format;
    }
    apply_size(&mut draft, &image, args.width_cm, args.height_cm)?;
    if let Some(folder) = args.output_folder {
        draft.output_folder = folder;
    }

    let client = VectorizerClient::with_endpoint(settings.endpoint(), settings.credentials());
    let attempt = workflow::run(&client, &draft).await;
    if let Some(warning) = &attempt.palette_warning {
        eprintln!("Palette file ignored: {warning}");
    }
    let stored = attempt.result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }
    println!(
        "Saved {} ({} bytes, {}) to {}",
        stored.format,
        stored.bytes_written,
        stored.content_type,
        stored.path.display()
    );
    println!("Palette colors sent to the API: {}", stored.palette_colors);
    Ok(())
}
