use std::path::PathBuf;

use thiserror::Error;

use crate::locale::Locale;

/// Failures while loading locale resources or building the vocabulary from them.
///
/// Parse calls never return these; they only surface at startup.
#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("locale '{locale}' is missing key '{key}'")]
    MissingKey { locale: Locale, key: &'static str },

    #[error("locale '{locale}' has an empty phrase for key '{key}'")]
    EmptyPhrase { locale: Locale, key: &'static str },

    #[error("no locale tables supplied")]
    NoLocales,

    #[error("failed to compile phrase pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, LocaleError>;
