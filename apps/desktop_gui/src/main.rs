use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::settings::{log_file_path, resolve_settings_path, Settings};
use crossbeam_channel::bounded;
use eframe::egui;
use shared::error::ErrorKind;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{Notice, UiError, UiErrorContext, UiEvent};
use crate::ui::VectorizerApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop client for the vectorizer.ai API")]
struct Args {
    /// Settings file (defaults to $VECTORIZER_CONFIG, then ./vectorizer.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

type FileLayer<S> = fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, Mutex<File>>;

/// Plain-text log appended to `path`.
fn file_layer<S>(path: &Path) -> std::io::Result<FileLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
}

/// Logs to the console and to the log file beside the settings file.
fn init_logging(settings_path: &Path) {
    let log_path = log_file_path(settings_path);
    let (file_log, file_error) = match file_layer(&log_path) {
        Ok(layer) => (Some(layer), None),
        Err(err) => (None, Some(err)),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .with(file_log)
        .init();
    if let Some(err) = file_error {
        tracing::warn!(path = %log_path.display(), "log file unavailable: {err}");
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let settings_path = resolve_settings_path(args.config);
    init_logging(&settings_path);
    let (settings, startup_notice) = match Settings::load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(err) => {
            let notice = Notice::error(&UiError::new(
                ErrorKind::Filesystem,
                UiErrorContext::Settings,
                format!("{err:#}; using defaults"),
            ));
            (Settings::default(), Some(notice))
        }
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Vectorizer AI Tool")
            .with_inner_size([1200.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Vectorizer AI Tool",
        options,
        Box::new(move |cc| {
            backend_bridge::runtime::launch(cmd_rx, ui_tx, cc.egui_ctx.clone());
            Ok(Box::new(VectorizerApp::new(
                cmd_tx,
                ui_rx,
                settings,
                settings_path,
                startup_notice,
            )))
        }),
    )
}
