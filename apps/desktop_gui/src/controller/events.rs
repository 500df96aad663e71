//! Backend-to-UI events and user-facing error modeling.

use std::{collections::VecDeque, path::PathBuf};

use client_core::Attempt;
use shared::error::{ErrorKind, VectorizeError};

use crate::ui::preview::{PreviewImage, PreviewSlot};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    VectorizeFinished(Attempt),
    PreviewDecoded {
        slot: PreviewSlot,
        path: PathBuf,
        image: PreviewImage,
    },
    PreviewFailed {
        slot: PreviewSlot,
        path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Settings,
    FolderLookup,
    Vectorize,
    Preview,
}

impl UiErrorContext {
    fn title(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Startup",
            UiErrorContext::Settings => "Settings",
            UiErrorContext::FolderLookup => "Folder lookup",
            UiErrorContext::Vectorize => "Vectorization",
            UiErrorContext::Preview => "Preview",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    kind: ErrorKind,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(kind: ErrorKind, context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            kind,
            context,
            message: message.into(),
        }
    }

    pub fn from_vectorize(context: UiErrorContext, err: &VectorizeError) -> Self {
        Self::new(err.kind(), context, err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// Content of the blocking notification window.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(err: &UiError) -> Self {
        tracing::error!(
            kind = ?err.kind(),
            context = err.context().title(),
            "{}",
            err.message()
        );
        Self {
            severity: NoticeSeverity::Error,
            title: format!("{}: {}", err.context().title(), err.kind().label()),
            message: err.message().to_string(),
        }
    }
}

/// Pending notices, shown one at a time in arrival order.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn push(&mut self, notice: Notice) {
        self.pending.push_back(notice);
    }

    pub fn current(&self) -> Option<&Notice> {
        self.pending.front()
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
