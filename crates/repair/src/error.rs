use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// No bracketed array could be located in the text.
    NoArray,
    /// The recovered array holds no elements.
    Empty,
    /// The element at this index is not an object.
    NotObject(usize),
    /// Nesting exceeded the parser's depth limit.
    TooDeep,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArray => f.write_str("Failed to locate a JSON array in the model output."),
            Self::Empty => f.write_str("The model output contains an empty array."),
            Self::NotObject(index) => write!(f, "Element #{} of the model output is not an object.", index + 1),
            Self::TooDeep => f.write_str("The model output is nested too deeply."),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
