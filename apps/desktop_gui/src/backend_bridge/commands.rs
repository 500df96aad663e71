//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::{Credentials, RequestDraft};

use crate::ui::preview::PreviewSlot;

pub enum BackendCommand {
    Vectorize {
        draft: RequestDraft,
        credentials: Credentials,
        endpoint: String,
    },
    DecodePreview {
        slot: PreviewSlot,
        path: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Vectorize { .. } => "vectorize",
            BackendCommand::DecodePreview { .. } => "decode_preview",
        }
    }
}
