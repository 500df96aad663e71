//! One vectorize attempt from raw form values to a stored result.

use shared::{domain::Mode, error::VectorizeError};
use tracing::{info, warn};

use crate::{client::VectorizerClient, handler::VectorizationResult, request::RequestDraft};

#[derive(Debug)]
pub struct Attempt {
    /// Mode the attempt ran in.
    pub mode: Mode,
    /// Mode to arm for the next attempt; production never carries over.
    pub next_mode: Mode,
    pub palette_warning: Option<String>,
    /// Set once the request passed validation and was handed to the client.
    pub dispatched: bool,
    pub result: Result<VectorizationResult, VectorizeError>,
}

impl Attempt {
    /// True when the request was rejected before anything was sent.
    pub fn stopped_before_dispatch(&self) -> bool {
        !self.dispatched
    }
}

pub async fn run(client: &VectorizerClient, draft: &RequestDraft) -> Attempt {
    let mode = draft.mode;
    let (palette_warning, dispatched, result) = match draft.build() {
        Ok(request) => {
            let warning = request.palette_warning.clone();
            (warning, true, client.vectorize(&request).await)
        }
        Err(err) => {
            warn!(kind = ?err.kind(), "request rejected before dispatch: {err}");
            (None, false, Err(err))
        }
    };

    let next_mode = mode.after_attempt();
    if mode != next_mode {
        info!(from = %mode, to = %next_mode, "mode reset after attempt");
    }
    match &result {
        Ok(stored) => info!(
            path = %stored.path.display(),
            format = %stored.format,
            palette_colors = stored.palette_colors,
            "vectorization finished"
        ),
        Err(err) => warn!(kind = ?err.kind(), "vectorization failed: {err}"),
    }

    Attempt {
        mode,
        next_mode,
        palette_warning,
        dispatched,
        result,
    }
}
