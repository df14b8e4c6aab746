#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod quiz;

use alloc::string::String;
use serde::Serialize;

pub use quiz::{QuizQuestion, QuizRequest, Vocabulary};

/// Error payload returned for every failed request.
#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Payload of the root endpoint.
#[derive(Serialize)]
pub struct Info {
    pub message: &'static str,
    pub version: &'static str,
}
