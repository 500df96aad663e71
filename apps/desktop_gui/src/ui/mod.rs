//! UI layer for the desktop GUI: app shell and image previews.

pub mod app;
pub mod preview;

pub use app::VectorizerApp;
