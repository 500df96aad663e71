//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{workflow, VectorizerClient};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::error::ErrorKind;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::preview::decode_preview;

/// Starts the single backend worker. Commands are handled one at a time, so
/// vectorize requests never overlap.
pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, ctx: egui::Context) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    ErrorKind::Filesystem,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                ctx.request_repaint();
                return;
            }
        };

        let notify = |event: UiEvent| {
            if ui_tx.send(event).is_err() {
                tracing::warn!("ui event queue closed; dropping backend event");
            }
            ctx.request_repaint();
        };

        runtime.block_on(async {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::Vectorize {
                        draft,
                        credentials,
                        endpoint,
                    } => {
                        notify(UiEvent::Info("Vectorization running...".to_string()));
                        let client = VectorizerClient::with_endpoint(endpoint, credentials);
                        let attempt = workflow::run(&client, &draft).await;
                        notify(UiEvent::VectorizeFinished(attempt));
                    }
                    BackendCommand::DecodePreview { slot, path } => {
                        let decode_path = path.clone();
                        let decoded =
                            tokio::task::spawn_blocking(move || decode_preview(&decode_path)).await;
                        let event = match decoded {
                            Ok(Ok(image)) => UiEvent::PreviewDecoded { slot, path, image },
                            Ok(Err(reason)) => UiEvent::PreviewFailed { slot, path, reason },
                            Err(err) => UiEvent::PreviewFailed {
                                slot,
                                path,
                                reason: format!("preview task failed: {err}"),
                            },
                        };
                        notify(event);
                    }
                }
            }
            tracing::info!("backend command queue closed; worker exiting");
        });
    });
}
