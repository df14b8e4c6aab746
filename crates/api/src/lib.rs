pub mod error;
pub mod llm;
pub mod prompt;

#[cfg(test)]
mod tests;

use core::time::Duration;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};
use llm::Llm;
use model::{
    quiz::{QuizQuestion, QuizRequest, Vocabulary, QUESTION_COUNT},
    ErrorBody, Info,
};
use repair::{Object, Value};
use serde::Serialize;

pub use llm::{gemini, Gemini, UpstreamError};

/// Largest request body read before bailing out.
const MAX_BODY_SIZE: usize = 64 * 1024;

const WELCOME: &str = "Welcome! The quiz generation API for Turjuman is running. POST five words to /generate-questions/.";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response<Full<Bytes>> {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json")).is_none());
    res
}

impl From<error::Error> for Response<Full<Bytes>> {
    fn from(err: error::Error) -> Self {
        let body = ErrorBody { detail: err.to_string() };
        json_response(err.status(), &body)
    }
}

/// Flags recovered entries that do not look like well-formed questions. The entries are kept as they are.
fn audit(questions: &[Object]) {
    if questions.len() != QUESTION_COUNT {
        log::warn!("Model returned {} questions instead of {QUESTION_COUNT}.", questions.len());
    }

    for (index, object) in questions.iter().enumerate() {
        let number = index + 1;
        match serde_json::from_value::<QuizQuestion>(Value::Object(object.clone())) {
            Ok(question) => {
                if let Err(err) = question.check() {
                    log::warn!("Question #{number} is malformed: {err}.");
                }
            }
            Err(err) => log::warn!("Question #{number} does not match the question schema: {err}."),
        }
    }
}

/// Request handler shared by every connection.
pub struct Api<L> {
    /// Model answering the prompts.
    llm: L,
    /// How long to wait on the model before giving up.
    timeout: Duration,
}

impl<L: Llm> Api<L> {
    pub fn new(llm: L, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Asks the model for questions on the vocabulary and recovers them from its reply.
    pub async fn generate(&self, vocab: &Vocabulary) -> error::Result<Vec<Object>> {
        let prompt = prompt::build(vocab);
        let reply = match tokio::time::timeout(self.timeout, self.llm.generate(&prompt)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                log::error!("Model call failed: {err}.");
                return Err(error::Error::Upstream(err));
            }
            Err(_) => {
                log::error!("Model call timed out after {:?}.", self.timeout);
                return Err(error::Error::Timeout);
            }
        };

        let questions = repair::repair(&reply).map_err(|err| {
            log::error!("Cannot recover questions from the model reply: {err}");
            log::debug!("Unparseable model reply: {reply:?}");
            error::Error::Unparseable(err)
        })?;

        audit(&questions);
        Ok(questions)
    }

    async fn on_generate<B>(&self, body: B) -> error::Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let bytes = Limited::new(body, MAX_BODY_SIZE)
            .collect()
            .await
            .map_err(|err| {
                if err.downcast_ref::<LengthLimitError>().is_some() {
                    error::Error::TooLarge
                } else {
                    error::Error::MalformedBody
                }
            })?
            .to_bytes();

        let request: QuizRequest = serde_json::from_slice(&bytes).map_err(|_| error::Error::MalformedBody)?;
        let vocab = Vocabulary::try_from(request).map_err(error::Error::Invalid)?;
        log::info!("Generating questions in {} for {:?}.", vocab.language, vocab.words);

        let questions = self.generate(&vocab).await?;
        Ok(json_response(StatusCode::OK, &questions))
    }

    fn on_info() -> Response<Full<Bytes>> {
        json_response(StatusCode::OK, &Info { message: WELCOME, version: env!("CARGO_PKG_VERSION") })
    }

    pub async fn try_respond<B>(&self, req: Request<B>) -> error::Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        match parts.uri.path() {
            "/" if parts.method == Method::GET => Ok(Self::on_info()),
            "/generate-questions/" | "/generate-questions" if parts.method == Method::POST => {
                self.on_generate(body).await
            }
            "/" | "/generate-questions/" | "/generate-questions" => Err(error::Error::MethodNotAllowed),
            _ => Err(error::Error::NotFound),
        }
    }

    /// Answers a request, turning every failure into a JSON error body.
    pub async fn respond<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        match self.try_respond(req).await {
            Ok(res) => {
                log::info!("{method} {path} -> {}", res.status());
                res
            }
            Err(err) => {
                log::warn!("{method} {path} -> {}: {err}", err.status());
                err.into()
            }
        }
    }
}
