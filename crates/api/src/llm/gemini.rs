use super::{Llm, UpstreamError};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the Gemini API.
pub struct Config {
    pub key: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateReply {
    /// Joins the text parts of the first candidate. A candidate without text yields an empty string.
    fn into_text(self) -> Result<String, UpstreamError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self.prompt_feedback.and_then(|feedback| feedback.block_reason);
            return Err(UpstreamError::NoCandidates(reason));
        };

        let parts = candidate.content.map(|content| content.parts).unwrap_or_default();
        Ok(parts.into_iter().filter_map(|part| part.text).collect())
    }
}

/// Single-turn `generateContent` request carrying the prompt as the user's message.
fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
    })
}

pub struct Gemini {
    client: reqwest::Client,
    /// Full `generateContent` URL for the configured model.
    url: Box<str>,
    key: Box<str>,
}

impl Gemini {
    pub fn new(Config { key, model, endpoint }: Config) -> Self {
        let url = format!("{}/models/{model}:generateContent", endpoint.trim_end_matches('/'));
        Self { client: reqwest::Client::new(), url: url.into_boxed_str(), key: key.into_boxed_str() }
    }
}

#[async_trait]
impl Llm for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let body = request_body(prompt);
        let res = self.client.post(&*self.url).header("x-goog-api-key", &*self.key).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            log::error!("Gemini replied with {status}: {detail}");
            return Err(UpstreamError::Status(status));
        }

        let reply: GenerateReply = res.json().await?;
        reply.into_text()
    }
}
