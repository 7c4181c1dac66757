//! Chainable line-oriented transforms over raw OCR text.
//!
//! [`TextUtil`] wraps a single string. Every transform consumes the value and
//! returns a new one, so a chain reads top to bottom without shared state.
//! Line lookups through [`LineSequence`] never fail: anything out of bounds
//! reads as an empty string.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapses whitespace runs to a single space and trims the ends.
pub fn normalize_space(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Drops tokens shorter than `min_word_length` from the start and end only.
pub fn reject_short_words(text: &str, min_word_length: usize) -> String {
    let normalized = normalize_space(text);
    let mut tokens: Vec<&str> = normalized.split(' ').collect();
    while tokens.first().is_some_and(|t| t.chars().count() < min_word_length) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(|t| t.chars().count() < min_word_length) {
        tokens.pop();
    }
    tokens.join(" ")
}

/// Lines of a text value, addressed by index.
#[derive(Debug, Clone)]
pub struct LineSequence<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineSequence<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().copied()
    }

    /// Line at `index`, or `""` past the end.
    pub fn line(&self, index: usize) -> &'a str {
        self.lines.get(index).copied().unwrap_or("")
    }

    /// Line at `index + offset`, or `""` when that lands outside the sequence.
    pub fn relative(&self, index: usize, offset: isize) -> &'a str {
        index
            .checked_add_signed(offset)
            .map_or("", |target| self.line(target))
    }
}

type LineTest<'a> = Box<dyn Fn(&str, usize) -> bool + 'a>;
type LineResolve<'a, T> = Box<dyn Fn(&str, usize, &LineSequence<'_>) -> T + 'a>;

/// One anchor rule for [`TextUtil::find_line_and_resolve`].
pub struct LineCandidate<'a, T> {
    test: LineTest<'a>,
    resolve: LineResolve<'a, T>,
}

impl<'a, T> LineCandidate<'a, T> {
    pub fn new(
        test: impl Fn(&str, usize) -> bool + 'a,
        resolve: impl Fn(&str, usize, &LineSequence<'_>) -> T + 'a,
    ) -> Self {
        Self {
            test: Box::new(test),
            resolve: Box::new(resolve),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextUtil {
    value: String,
}

impl TextUtil {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    pub fn lines(&self) -> LineSequence<'_> {
        LineSequence::new(&self.value)
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.value.split(char::is_whitespace).collect()
    }

    pub fn transform(self, f: impl FnOnce(&str) -> String) -> Self {
        Self::new(f(&self.value))
    }

    /// Unicode NFC, so decomposed umlauts compare equal to the locale phrases.
    pub fn normalize(self) -> Self {
        self.transform(|value| value.nfc().collect())
    }

    /// Collapses whitespace inside each line, trims, and drops empty lines.
    pub fn clean(self) -> Self {
        self.transform(|value| {
            value
                .split('\n')
                .map(normalize_space)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn strip_short_lines(self, min_line_length: usize) -> Self {
        self.transform(|value| {
            value
                .split('\n')
                .map(str::trim)
                .filter(|line| line.chars().count() >= min_line_length)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Drops every token shorter than `min_word_length` on every line.
    pub fn strip_short_words(self, min_word_length: usize) -> Self {
        self.transform(|value| {
            value
                .split('\n')
                .map(|line| {
                    line.split(' ')
                        .map(str::trim)
                        .filter(|word| word.chars().count() >= min_word_length)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn strip_words_left(self, count: usize) -> Self {
        self.transform(|value| {
            value
                .split(' ')
                .skip(count)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    pub fn strip_words_right(self, count: usize) -> Self {
        self.transform(|value| {
            let words: Vec<&str> = value.split(' ').collect();
            let keep = words.len().saturating_sub(count);
            words[..keep].join(" ")
        })
    }

    pub fn replace(self, pattern: &Regex, replacement: &str) -> Self {
        self.transform(|value| pattern.replace_all(value, replacement).into_owned())
    }

    /// Keeps only the first match of `pattern`, or nothing.
    pub fn extract(self, pattern: &Regex) -> Self {
        self.transform(|value| {
            pattern
                .find(value)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
    }

    /// Parses the value as a number. Anything unparsable, including an empty
    /// value, yields NaN rather than an error.
    pub fn to_number(&self) -> f64 {
        self.value.trim().parse::<f64>().unwrap_or(f64::NAN)
    }

    pub fn to_result<T>(self, f: impl FnOnce(&str) -> T) -> T {
        f(&self.value)
    }

    /// Lines at `offsets` relative to the first line passing `test`. Every
    /// entry is empty when no line passes.
    pub fn find_line(&self, test: impl Fn(&str, usize) -> bool, offsets: &[isize]) -> Vec<String> {
        let lines = self.lines();
        match lines.iter().enumerate().position(|(i, line)| test(line, i)) {
            Some(index) => offsets
                .iter()
                .map(|&offset| lines.relative(index, offset).to_string())
                .collect(),
            None => offsets.iter().map(|_| String::new()).collect(),
        }
    }

    /// Scans lines top to bottom and, for each line, the candidates in order.
    /// The first candidate whose test passes resolves the result, so an
    /// earlier line always beats a higher-priority candidate on a later one.
    pub fn find_line_and_resolve<T>(&self, candidates: &[LineCandidate<'_, T>]) -> Option<T> {
        let lines = self.lines();
        for (i, line) in lines.iter().enumerate() {
            for candidate in candidates {
                if (candidate.test)(line, i) {
                    return Some((candidate.resolve)(line, i, &lines));
                }
            }
        }
        None
    }

    /// Runs `action` for every line passing `test`, in line order.
    pub fn each_matching_line(
        &self,
        test: impl Fn(&str, usize) -> bool,
        mut action: impl FnMut(&str, usize, &LineSequence<'_>),
    ) -> &Self {
        let lines = self.lines();
        for (i, line) in lines.iter().enumerate() {
            if test(line, i) {
                action(line, i, &lines);
            }
        }
        self
    }
}
