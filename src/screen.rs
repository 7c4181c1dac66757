//! Routes recognized text to the parser for the screen it came from.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::dictionary::{vocabulary, Vocabulary};
use crate::locale::detect_locale;
use crate::parsers::{parse_city_with, parse_war_with, CityResult, WarEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    War,
    City,
    /// Try every parser and keep the first plausible result.
    Unknown,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown screen kind '{0}' (expected war, city or unknown)")]
pub struct ScreenKindError(pub String);

impl FromStr for ScreenKind {
    type Err = ScreenKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "war" | "wars" => Ok(ScreenKind::War),
            "city" | "town" => Ok(ScreenKind::City),
            "unknown" => Ok(ScreenKind::Unknown),
            _ => Err(ScreenKindError(s.to_string())),
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScreenKind::War => "war",
            ScreenKind::City => "city",
            ScreenKind::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", content = "result", rename_all = "lowercase")]
pub enum ScreenResult {
    War(Vec<WarEntry>),
    City(CityResult),
}

pub fn parse_screen(text: &str, kind: ScreenKind) -> Option<ScreenResult> {
    parse_screen_with(vocabulary(), text, kind)
}

/// `None` only for [`ScreenKind::Unknown`] when neither parser recognized
/// anything.
pub fn parse_screen_with(vocab: &Vocabulary, text: &str, kind: ScreenKind) -> Option<ScreenResult> {
    tracing::debug!("parsing {} screen, language {:?}", kind, detect_locale(text));

    match kind {
        ScreenKind::War => Some(ScreenResult::War(parse_war_with(vocab, text))),
        ScreenKind::City => Some(ScreenResult::City(parse_city_with(vocab, text))),
        ScreenKind::Unknown => {
            let wars = parse_war_with(vocab, text);
            if !wars.is_empty() {
                return Some(ScreenResult::War(wars));
            }
            let city = parse_city_with(vocab, text);
            if city.settlement.is_some() {
                return Some(ScreenResult::City(city));
            }
            tracing::debug!("no parser recognized the screen");
            None
        }
    }
}

/// Parses independent screens in parallel. Output order follows `texts`.
pub fn parse_screens<S>(texts: &[S], kind: ScreenKind) -> Vec<Option<ScreenResult>>
where
    S: AsRef<str> + Sync,
{
    let vocab = vocabulary();
    texts
        .par_iter()
        .map(|text| parse_screen_with(vocab, text.as_ref(), kind))
        .collect()
}
