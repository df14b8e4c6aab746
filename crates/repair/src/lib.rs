//! Best-effort recovery of a JSON array of objects from free text produced by a language model.

pub mod error;
mod fence;
mod parser;

pub use error::{Error, Result};
pub use serde_json::{Map, Value};

/// A single recovered record.
pub type Object = Map<String, Value>;

/// Upper bound on the opening brackets tried per source.
const MAX_CANDIDATES: usize = 32;

/// Reads one candidate array starting at an opening bracket.
fn parse_candidate(src: &str) -> Result<Vec<Object>> {
    let Some(Value::Array(items)) = parser::Parser::new(src).value()? else {
        return Err(Error::NoArray);
    };

    if items.is_empty() {
        return Err(Error::Empty);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(Error::NotObject(index)),
        })
        .collect()
}

/// Recovers the non-empty array of objects the model meant to write.
///
/// Fenced code blocks are searched before the surrounding text, and within each source every opening
/// bracket is tried in order until one yields an array of objects. Text outside the chosen array is ignored.
/// When nothing qualifies, the error of the earliest rejected candidate is reported.
pub fn repair(text: &str) -> Result<Vec<Object>> {
    let mut first = None;
    for source in fence::sources(text) {
        for (start, _) in source.match_indices('[').take(MAX_CANDIDATES) {
            match parse_candidate(&source[start..]) {
                Ok(objects) => return Ok(objects),
                Err(err) => {
                    log::debug!("rejected candidate array at byte {start}: {err}");
                    first.get_or_insert(err);
                }
            }
        }
    }
    Err(first.unwrap_or(Error::NoArray))
}
