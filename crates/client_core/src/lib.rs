//! Request building, dispatch and response handling for the remote vectorizer.

pub mod classify;
pub mod client;
pub mod dimensions;
pub mod folders;
pub mod handler;
pub mod palette;
pub mod request;
pub mod settings;
pub mod workflow;

pub use classify::{classify, ResponseOutcome};
pub use client::{Credentials, VectorizerClient};
pub use handler::VectorizationResult;
pub use request::{RequestDraft, VectorizationRequest};
pub use settings::Settings;
pub use workflow::Attempt;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
