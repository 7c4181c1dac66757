use std::path::Path;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use serde::Serialize;

use crate::dictionary;
use crate::error::LocaleError;
use crate::parsers::{parse_city, parse_war};
use crate::screen::{self, ScreenKind};

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyValueError::new_err(format!("Failed to serialize result: {}", e)))
}

fn parse_kind(kind: &str) -> PyResult<ScreenKind> {
    kind.parse().map_err(|e: screen::ScreenKindError| PyValueError::new_err(e.to_string()))
}

/// Parse a settlement overlay
/// Returns: JSON object (settlement, encounter, governedBy, controledBy, crafting)
#[pyfunction]
fn parse_settlement_screen(text: String) -> PyResult<String> {
    to_json(&parse_city(&text))
}

/// Parse a war board overlay
/// Returns: JSON array of entries, invasions first
#[pyfunction]
fn parse_war_screen(text: String) -> PyResult<String> {
    to_json(&parse_war(&text))
}

/// Parse a screen of the given kind ("war", "city" or "unknown")
/// Returns: JSON string, or None when an unknown screen was not recognized
#[pyfunction]
fn parse_screen(text: String, kind: String) -> PyResult<Option<String>> {
    screen::parse_screen(&text, parse_kind(&kind)?)
        .map(|result| to_json(&result))
        .transpose()
}

/// Batch parse screens of one kind in parallel
#[pyfunction]
fn parse_screens(texts: Vec<String>, kind: String) -> PyResult<Vec<Option<String>>> {
    screen::parse_screens(&texts, parse_kind(&kind)?)
        .iter()
        .map(|result| result.as_ref().map(to_json).transpose())
        .collect()
}

/// Load de.json/en.json from a directory before the first parse call
/// Returns: false if locales were already in place
#[pyfunction]
fn init_locales(locale_dir: String) -> PyResult<bool> {
    dictionary::init_vocabulary(Path::new(&locale_dir)).map_err(|e| match e {
        LocaleError::Io { .. } => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    })
}

#[pymodule]
fn nw_ocr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_settlement_screen, m)?)?;
    m.add_function(wrap_pyfunction!(parse_war_screen, m)?)?;
    m.add_function(wrap_pyfunction!(parse_screen, m)?)?;
    m.add_function(wrap_pyfunction!(parse_screens, m)?)?;
    m.add_function(wrap_pyfunction!(init_locales, m)?)?;
    Ok(())
}
