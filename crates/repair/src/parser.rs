use crate::error::{Error, Result};
use serde_json::{Map, Number, Value};

/// Maximum nesting of arrays and objects before giving up.
const MAX_DEPTH: usize = 64;

const DOUBLE: &[char] = &['"'];
const SINGLE: &[char] = &['\''];
const SMART_DOUBLE: &[char] = &['”', '“', '"'];
const SMART_SINGLE: &[char] = &['’', '‘', '\''];

/// Returns the characters that may terminate a string opened by `open`.
fn closing_quotes(open: char) -> Option<&'static [char]> {
    match open {
        '"' => Some(DOUBLE),
        '\'' => Some(SINGLE),
        '“' | '”' | '„' => Some(SMART_DOUBLE),
        '‘' | '’' => Some(SMART_SINGLE),
        _ => None,
    }
}

/// Containers left empty because the text ended right after their opening bracket.
fn is_hollow(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

/// Lenient recursive-descent reader for near-JSON text.
///
/// The reader never fails on syntax. Missing or doubled commas, unquoted keys, alternative quote styles,
/// comments, Python-style literals and truncated input are all read as the closest JSON value. Keys without
/// values are dropped rather than filled in.
pub struct Parser<'src> {
    src: &'src str,
    pos: usize,
    /// Containers opened and not yet closed, innermost last.
    open: Vec<Container>,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0, open: Vec::new() }
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                self.pos += 2 + body.find("*/").map_or(body.len(), |end| end + 2);
            } else {
                break;
            }
        }
    }

    fn enter(&mut self, container: Container) -> Result<()> {
        self.open.push(container);
        if self.open.len() > MAX_DEPTH {
            return Err(Error::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.open.pop();
    }

    /// Whether the container being read sits directly inside a `container`.
    fn nested_in(&self, container: Container) -> bool {
        self.open.iter().rev().nth(1) == Some(&container)
    }

    /// Reads the next value. Returns `None` when nothing resembling a value starts here.
    pub fn value(&mut self) -> Result<Option<Value>> {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let value = match c {
            '[' => self.array()?,
            '{' => self.object()?,
            c if closing_quotes(c).is_some() => Value::String(self.string()),
            '-' | '+' | '.' | '0'..='9' => match self.number() {
                Some(number) => number,
                None => return Ok(self.bare()),
            },
            _ => return Ok(self.bare()),
        };

        Ok(Some(value))
    }

    fn array(&mut self) -> Result<Value> {
        self.enter(Container::Array)?;
        self.bump();

        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => break,
                Some(']') => {
                    self.bump();
                    break;
                }
                // A brace closes the enclosing object when `]` was left out, so leave it there.
                Some('}') if self.nested_in(Container::Object) => break,
                // Doubled or trailing commas, and stray closers.
                Some(',' | '}' | ':') => {
                    self.bump();
                }
                Some(_) => {
                    let start = self.pos;
                    match self.value()? {
                        Some(value) if !(self.is_eof() && is_hollow(&value)) => items.push(value),
                        _ => {}
                    }
                    if self.pos == start {
                        self.bump();
                    }
                }
            }
        }

        self.leave();
        Ok(Value::Array(items))
    }

    fn object(&mut self) -> Result<Value> {
        self.enter(Container::Object)?;
        self.bump();

        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                // A bracket closes the enclosing array, so leave it there.
                None | Some(']') => break,
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(',') => {
                    self.bump();
                }
                // The next element of the enclosing array begins where `}` was left out.
                Some('{') if self.nested_in(Container::Array) => break,
                Some(_) => {
                    let start = self.pos;
                    if let Some((key, value)) = self.member()? {
                        map.insert(key, value);
                    }
                    if self.pos == start {
                        self.bump();
                    }
                }
            }
        }

        self.leave();
        Ok(Value::Object(map))
    }

    fn member(&mut self) -> Result<Option<(String, Value)>> {
        let Some(key) = self.key() else {
            return Ok(None);
        };

        self.skip_trivia();
        if self.peek() != Some(':') {
            return Ok(None);
        }
        self.bump();

        self.skip_trivia();
        if matches!(self.peek(), None | Some(',' | '}' | ']')) {
            return Ok(None);
        }

        Ok(self.value()?.map(|value| (key, value)))
    }

    fn key(&mut self) -> Option<String> {
        let c = self.peek()?;
        if closing_quotes(c).is_some() {
            return Some(self.string());
        }

        let rest = self.rest();
        let end = rest.find([':', ',', '{', '}', '[', ']', '\n']).unwrap_or(rest.len());
        self.pos += end;
        let key = rest[..end].trim();
        (!key.is_empty()).then(|| key.to_owned())
    }

    fn string(&mut self) -> String {
        let closers = self.bump().and_then(closing_quotes).unwrap_or(DOUBLE);

        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => self.escape(&mut out),
                c if closers.contains(&c) && self.closes_here() => return out,
                c => out.push(c),
            }
        }

        // Truncated text: keep what was there.
        out
    }

    /// Judges whether the quote just consumed ends the string by looking at what follows it.
    /// Anything other than a structural character on the same line means the quote is part of the text.
    fn closes_here(&self) -> bool {
        let rest = self.rest();
        let after = rest.trim_start();
        if after.starts_with("//") || after.starts_with("/*") {
            return true;
        }

        match after.chars().next() {
            None | Some(',' | ':' | ']' | '}') => true,
            Some(_) => rest[..rest.len() - after.len()].contains('\n'),
        }
    }

    fn escape(&mut self, out: &mut String) {
        let Some(c) = self.bump() else {
            return;
        };

        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'u' => match self.unicode() {
                Some(decoded) => out.push(decoded),
                None => out.push('u'),
            },
            other => out.push(other),
        }
    }

    fn hex4(&mut self) -> Option<u32> {
        let digits = self.rest().get(..4)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += 4;
        Some(code)
    }

    fn unicode(&mut self) -> Option<char> {
        let high = self.hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        let save = self.pos;
        if self.rest().starts_with("\\u") {
            self.pos += 2;
            if let Some(low @ 0xDC00..=0xDFFF) = self.hex4() {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = save;
        }

        Some(char::REPLACEMENT_CHARACTER)
    }

    fn number(&mut self) -> Option<Value> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !matches!(c, '0'..='9' | '-' | '+' | '.' | 'e' | 'E'))
            .unwrap_or(rest.len());

        // Things like `2nd` are words, not numbers.
        if rest[end..].chars().next().is_some_and(char::is_alphanumeric) {
            return None;
        }

        let token = &rest[..end];
        let number: Number = serde_json::from_str(token.strip_prefix('+').unwrap_or(token)).ok()?;
        self.pos += end;
        Some(Value::Number(number))
    }

    fn bare(&mut self) -> Option<Value> {
        let rest = self.rest();
        let end = rest.find([',', ']', '}', '\n', '\r']).unwrap_or(rest.len());
        self.pos += end;

        let value = match rest[..end].trim() {
            "" => return None,
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            "null" | "None" | "undefined" => Value::Null,
            word => Value::String(word.to_owned()),
        };
        Some(value)
    }
}
