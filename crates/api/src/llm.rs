pub mod gemini;

use async_trait::async_trait;
use core::fmt::{self, Display};
use hyper::StatusCode;

pub use gemini::Gemini;

pub enum UpstreamError {
    /// Transport failure or an undecodable reply.
    Request(reqwest::Error),
    /// The service answered with a non-success status.
    Status(StatusCode),
    /// The reply held no candidate, optionally with the reason the prompt was blocked.
    NoCandidates(Option<String>),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) if err.is_decode() => write!(f, "unexpected reply from the model service: {err}"),
            Self::Request(err) => write!(f, "failed to reach the model service: {err}"),
            Self::Status(status) => write!(f, "the model service replied with status {status}"),
            Self::NoCandidates(Some(reason)) => write!(f, "the model refused the prompt ({reason})"),
            Self::NoCandidates(None) => f.write_str("the model returned no candidates"),
        }
    }
}

/// A text-generation service that answers one prompt with one reply.
#[async_trait]
pub trait Llm: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}
