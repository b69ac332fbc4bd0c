//! Line cleaning and word parsing

use levelkit_core::GcodeError;
use regex::Regex;
use std::sync::OnceLock;

/// A single letter/number word such as `X10.5` or `G38.2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

/// A comment-free line and its words
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub text: String,
    pub words: Vec<Word>,
}

/// Remove `( ... )` and `; ...` comments and collapse whitespace runs
pub fn strip_comments(line: &str) -> String {
    static PAREN_COMMENT: OnceLock<Regex> = OnceLock::new();
    static SEMICOLON_COMMENT: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let paren = PAREN_COMMENT
        .get_or_init(|| Regex::new(r"\s*\([^)]*\)").expect("invalid regex pattern"));
    let semicolon =
        SEMICOLON_COMMENT.get_or_init(|| Regex::new(r"\s*;.*").expect("invalid regex pattern"));
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("invalid regex pattern"));

    let without_paren = paren.replace_all(line, "");
    let without_semicolon = semicolon.replace_all(&without_paren, "");
    whitespace
        .replace_all(&without_semicolon, " ")
        .trim()
        .to_string()
}

/// Letters whose values the compensation pass reads
const PARSED_LETTERS: &[char] = &['G', 'X', 'Y', 'Z', 'I', 'J'];

/// A letter run followed by a number; only single letters are words
fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"([A-Za-z]+)\s*([+\-.\d]+)").expect("invalid regex pattern"))
}

fn single_letter(run: &str) -> Option<char> {
    let mut chars = run.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Some(letter.to_ascii_uppercase()),
        _ => None,
    }
}

impl ParsedLine {
    /// Parse an already stripped line
    ///
    /// Only G, X, Y, Z, I and J words are kept. Anything else, such as the
    /// text of an `M117` message, is left alone. `line_number` is only used
    /// for error reporting.
    pub fn parse(text: &str, line_number: usize) -> Result<Self, GcodeError> {
        let mut words = Vec::new();
        for caps in word_regex().captures_iter(text) {
            let Some(letter) = single_letter(&caps[1]).filter(|l| PARSED_LETTERS.contains(l))
            else {
                continue;
            };
            let value = caps[2]
                .parse::<f64>()
                .map_err(|_| GcodeError::InvalidNumber {
                    line_number,
                    word: caps[0].to_string(),
                })?;
            words.push(Word { letter, value });
        }

        Ok(Self {
            text: text.to_string(),
            words,
        })
    }

    /// First value for `letter`, if the line carries one
    pub fn value(&self, letter: char) -> Option<f64> {
        let letter = letter.to_ascii_uppercase();
        self.words.iter().find(|w| w.letter == letter).map(|w| w.value)
    }

    pub fn has(&self, letter: char) -> bool {
        self.value(letter).is_some()
    }

    /// All G word values in order of appearance
    pub fn g_codes(&self) -> impl Iterator<Item = f64> + '_ {
        self.words
            .iter()
            .filter(|w| w.letter == 'G')
            .map(|w| w.value)
    }

    /// The line text with X, Y and Z words removed
    pub fn without_coordinates(&self) -> String {
        let removed = word_regex().replace_all(&self.text, |caps: &regex::Captures| {
            match single_letter(&caps[1]) {
                Some('X' | 'Y' | 'Z') => String::new(),
                _ => caps[0].to_string(),
            }
        });
        removed.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
