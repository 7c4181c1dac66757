//! War board overlay: every scheduled invasion and war on the list.

use serde::Serialize;

use super::{EncounterKind, CANONICAL_THRESHOLD};
use crate::dictionary::{vocabulary, City, Vocabulary};
use crate::text::{LineSequence, TextUtil};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarEntry {
    pub encounter: EncounterKind,
    pub location: Option<City>,
    /// Raw start time as recognized, e.g. `Mon, 01. Jan, 20:00`.
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Parses a war board with the process-wide vocabulary.
pub fn parse_war(text: &str) -> Vec<WarEntry> {
    parse_war_with(vocabulary(), text)
}

/// All invasions in text order, followed by all wars in text order.
pub fn parse_war_with(vocab: &Vocabulary, text: &str) -> Vec<WarEntry> {
    let text = TextUtil::new(text).normalize().clean();
    let mut result = Vec::new();

    // [START LABEL]
    // [TIME]
    // ...
    // [ICON] [LOCATION]
    text.each_matching_line(
        |line, _| vocab.invasion_start.is_match(line),
        |_, i, lines| {
            result.push(WarEntry {
                encounter: EncounterKind::Invasion,
                location: read_location(vocab, lines, i),
                time: lines.relative(i, 1).to_string(),
                info: None,
            })
        },
    );
    text.each_matching_line(
        |line, _| vocab.war_start.is_match(line),
        |_, i, lines| {
            result.push(WarEntry {
                encounter: EncounterKind::War,
                location: read_location(vocab, lines, i),
                time: lines.relative(i, 1).to_string(),
                info: Some(lines.relative(i, -1).to_string()),
            })
        },
    );

    tracing::debug!("war screen: {} entries", result.len());
    result
}

fn read_location(vocab: &Vocabulary, lines: &LineSequence<'_>, anchor: usize) -> Option<City> {
    TextUtil::new(lines.relative(anchor, 3))
        .strip_words_left(1)
        .to_result(|name| vocab.to_settlement_name(name, CANONICAL_THRESHOLD))
}
