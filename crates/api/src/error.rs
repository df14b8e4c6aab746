use crate::llm::UpstreamError;
use core::fmt::{self, Display};
use hyper::StatusCode;
use model::quiz::Invalid;

pub enum Error {
    NotFound,
    MethodNotAllowed,
    /// Request body exceeds the accepted size.
    TooLarge,
    /// Request body is not the expected JSON object.
    MalformedBody,
    /// Request is well-formed but its contents are rejected.
    Invalid(Invalid),
    /// The model service failed to answer.
    Upstream(UpstreamError),
    /// The model service did not answer in time.
    Timeout,
    /// The model answered, but nothing usable could be recovered.
    Unparseable(repair::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedBody => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unparseable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("Resource not found."),
            Self::MethodNotAllowed => f.write_str("Method not allowed."),
            Self::TooLarge => f.write_str("Request body is too large."),
            Self::MalformedBody => {
                f.write_str("Request body must be a JSON object with a \"srcLang\" string and a \"words\" list.")
            }
            Self::Invalid(err) => Display::fmt(err, f),
            Self::Upstream(err) => write!(f, "Error generating questions: {err}"),
            Self::Timeout => f.write_str("Error generating questions: the model did not answer in time."),
            Self::Unparseable(err) => write!(f, "Failed to parse the model response as JSON. {err}"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
