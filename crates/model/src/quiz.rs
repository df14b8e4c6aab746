use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/// Number of words accepted per request.
pub const WORD_COUNT: usize = 5;
/// Number of questions requested from the model.
pub const QUESTION_COUNT: usize = 10;
/// Number of options attached to each question.
pub const OPTION_COUNT: usize = 4;
/// Letters labelling the options, in order.
pub const LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// Raw submission as sent by the client.
#[derive(Deserialize)]
pub struct QuizRequest {
    /// Language in which the questions must be written.
    #[serde(rename = "srcLang")]
    pub language: String,
    /// Vocabulary to quiz on.
    pub words: Vec<String>,
}

/// A request whose cardinality and contents have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub words: [String; WORD_COUNT],
    pub language: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Invalid {
    /// Number of words received.
    WordCount(usize),
    /// Index of the offending word.
    BlankWord(usize),
    BlankLanguage,
}

impl Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordCount(count) => write!(f, "Exactly {WORD_COUNT} words are required, got {count}."),
            Self::BlankWord(index) => write!(f, "Word #{} is blank.", index + 1),
            Self::BlankLanguage => f.write_str("The source language must not be blank."),
        }
    }
}

impl TryFrom<QuizRequest> for Vocabulary {
    type Error = Invalid;

    fn try_from(QuizRequest { language, words }: QuizRequest) -> Result<Self, Self::Error> {
        let count = words.len();
        let words: [String; WORD_COUNT] = words.try_into().map_err(|_| Invalid::WordCount(count))?;

        if let Some(index) = words.iter().position(|word| word.trim().is_empty()) {
            return Err(Invalid::BlankWord(index));
        }

        if language.trim().is_empty() {
            return Err(Invalid::BlankLanguage);
        }

        Ok(Self { words, language })
    }
}

/// One multiple-choice question as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text, prefixed with its ordinal (e.g. `1. ...`).
    pub question: String,
    /// Options, each prefixed with its letter (e.g. `A. ...`).
    pub options: Vec<String>,
    /// Letter of the correct option.
    pub correct_answer: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Malformed {
    EmptyQuestion,
    /// Number of options present.
    OptionCount(usize),
    /// Index of the option lacking a leading letter.
    UnlabelledOption(usize),
    AnswerNotLetter,
    /// The answer letter labels none of the options.
    UnknownAnswer(char),
}

impl Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuestion => f.write_str("question text is empty"),
            Self::OptionCount(count) => write!(f, "expected {OPTION_COUNT} options, found {count}"),
            Self::UnlabelledOption(index) => write!(f, "option #{} has no leading letter", index + 1),
            Self::AnswerNotLetter => f.write_str("correct answer is not a letter between A and D"),
            Self::UnknownAnswer(letter) => write!(f, "correct answer {letter} labels none of the options"),
        }
    }
}

/// Extracts the choice letter that labels some text, as in `B. mirth`, `b)` or a bare `B`.
pub fn leading_letter(text: &str) -> Option<char> {
    let mut chars = text.trim_start().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !LETTERS.contains(&letter) {
        return None;
    }

    match chars.next() {
        None | Some('.' | ')' | ':' | ' ' | '-') => Some(letter),
        _ => None,
    }
}

impl QuizQuestion {
    /// Checks the shape of the question: exactly four lettered options and an answer naming one of them.
    pub fn check(&self) -> Result<(), Malformed> {
        if self.question.trim().is_empty() {
            return Err(Malformed::EmptyQuestion);
        }

        if self.options.len() != OPTION_COUNT {
            return Err(Malformed::OptionCount(self.options.len()));
        }

        let mut labels = [None; OPTION_COUNT];
        for (index, (label, option)) in labels.iter_mut().zip(&self.options).enumerate() {
            *label = Some(leading_letter(option).ok_or(Malformed::UnlabelledOption(index))?);
        }

        let letter = leading_letter(&self.correct_answer).ok_or(Malformed::AnswerNotLetter)?;

        if labels.contains(&Some(letter)) {
            Ok(())
        } else {
            Err(Malformed::UnknownAnswer(letter))
        }
    }
}
