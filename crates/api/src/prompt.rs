use model::quiz::{Vocabulary, OPTION_COUNT, QUESTION_COUNT, WORD_COUNT};

/// Shape the model is asked to reproduce.
const EXAMPLE: &str = r#"[
  {
    "question": "1. Your question here",
    "options": [
      "A. Option one",
      "B. Option two",
      "C. Option three",
      "D. Option four"
    ],
    "correct_answer": "B"
  },
  ...
]"#;

/// Builds the instructions sent to the model. The output depends on nothing but the vocabulary.
pub fn build(Vocabulary { words, language }: &Vocabulary) -> String {
    let per_word = QUESTION_COUNT / WORD_COUNT;
    let list = words.iter().map(|word| format!("\"{word}\"")).collect::<Vec<_>>().join(", ");
    format!(
        r#"You will receive {WORD_COUNT} vocabulary words. Your task is to generate {QUESTION_COUNT} multiple-choice questions ({per_word} per word), written entirely in {language}.
Use a variety of question types, such as:
- Definition of the word.
- Synonym or alternative in the same language.
- Translation of the word.
- Contextual usage.
- Part of speech.

Each question must follow this JSON format:
{EXAMPLE}

Rules:
- Return exactly {QUESTION_COUNT} questions, numbered from 1 to {QUESTION_COUNT} at the start of the "question" field.
- Every question has exactly {OPTION_COUNT} options, prefixed with "A. ", "B. ", "C. " and "D. ".
- "correct_answer" must be the letter (A, B, C or D) of the correct option. Never use a number such as "2".
- All questions must relate to the provided words: {list}
- Write every question and every option in {language}.
- All options must be plausible.
- Only return the valid JSON array. No explanations and no markdown code fences.

Now here are the {WORD_COUNT} input words: {list}
"#
    )
}
