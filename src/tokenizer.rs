use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Word,
    Separator,
}

/// One word or separator run of a sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
}

impl Token {
    pub fn word(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Word,
            content: content.into(),
        }
    }

    pub fn separator(c: char) -> Self {
        Self {
            kind: TokenKind::Separator,
            content: c.to_string(),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_separator(&self) -> bool {
        self.kind == TokenKind::Separator
    }
}

/// The set of single characters that split words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Separators {
    chars: Vec<char>,
}

impl Separators {
    pub fn new(chars: impl IntoIterator<Item = char>) -> Result<Self> {
        let mut collected: Vec<char> = Vec::new();
        for c in chars {
            if !collected.contains(&c) {
                collected.push(c);
            }
        }
        if collected.is_empty() {
            return Err(Error::invalid_config("separator set must not be empty"));
        }
        Ok(Self { chars: collected })
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// True when `text` is exactly one separator character.
    pub fn is_lone_separator(&self, text: &str) -> bool {
        let mut chars = text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if self.contains(c))
    }
}

impl Default for Separators {
    fn default() -> Self {
        Self { chars: vec![' '] }
    }
}

impl TryFrom<String> for Separators {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Separators::new(value.chars())
    }
}

impl From<Separators> for String {
    fn from(value: Separators) -> Self {
        value.chars.into_iter().collect()
    }
}

/// Split `text` into alternating word and separator tokens.
///
/// Every separator closes the preceding word, which may be empty, so the
/// sequence always starts with a word and words sit at even indices.
/// Concatenating the contents gives back `text`.
pub fn tokenize(text: &str, separators: &Separators) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.char_indices().find(|&(_, c)| separators.contains(c)) {
            Some((idx, sep)) => {
                tokens.push(Token::word(&rest[..idx]));
                tokens.push(Token::separator(sep));
                rest = &rest[idx + sep.len_utf8()..];
            }
            None => {
                tokens.push(Token::word(rest));
                rest = "";
            }
        }
    }

    tokens
}

/// Number of separator-delimited runs once leading and trailing separators
/// and whitespace are stripped.
///
/// An empty string still counts as one (empty) word.
pub fn count_words(text: &str, separators: &Separators) -> usize {
    text.trim_matches(|c: char| c.is_whitespace() || separators.contains(c))
        .split(|c: char| separators.contains(c))
        .count()
}

/// Rebuild the text a token slice was produced from.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.content.as_str()).collect()
}
