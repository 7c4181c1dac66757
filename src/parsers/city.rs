//! Settlement info overlay.
//!
//! Each field group is located independently over the same cleaned lines:
//! an anchor line is found by phrase match (or a fuzzy header heuristic for
//! the shop table) and the values are read at fixed offsets from it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{EncounterKind, CANONICAL_THRESHOLD};
use crate::dictionary::{vocabulary, City, Faction, SettlementTier, Vocabulary};
use crate::text::{reject_short_words, LineCandidate, LineSequence, TextUtil};

const MIN_WORD_LENGTH: usize = 2;

/// Per-token match against the crafting/refining/taxes header words.
const SHOP_HEADER_THRESHOLD: f64 = 0.5;

/// Shop rows are noisy, so any token loosely resembling "tier" counts.
const SHOP_TIER_THRESHOLD: f64 = 0.2;

const SHOP_ROWS: usize = 5;
const TAX_ROWS: usize = 4;

lazy_static! {
    static ref ONE_LOOKALIKE: Regex = Regex::new(r"(?i)[il]").unwrap();
    static ref SEVEN_LOOKALIKE: Regex = Regex::new(r"(?i)z").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
    static ref TAX_VALUE: Regex = Regex::new(r"(\d?\d[.,]?\d\d)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub name: Option<City>,
    pub tier: Option<SettlementTier>,
    /// NaN when the upgrade line holds no digits. Serialized as `null`.
    pub upgrades: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encounter {
    #[serde(rename = "type")]
    pub kind: EncounterKind,
    pub info: String,
}

/// Crafting and refining tiers per shop row, plus the tax column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShopLevels {
    pub crafting: [Option<u8>; SHOP_ROWS],
    pub refining: [Option<u8>; SHOP_ROWS],
    pub taxes: [Option<String>; TAX_ROWS],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityResult {
    pub settlement: Option<Settlement>,
    pub encounter: Option<Encounter>,
    pub governed_by: Option<String>,
    #[serde(rename = "controledBy")]
    pub controlled_by: Option<Faction>,
    pub crafting: ShopLevels,
}

/// Parses a settlement overlay with the process-wide vocabulary.
pub fn parse_city(text: &str) -> CityResult {
    parse_city_with(vocabulary(), text)
}

pub fn parse_city_with(vocab: &Vocabulary, text: &str) -> CityResult {
    let text = TextUtil::new(text).normalize().clean();

    let result = CityResult {
        settlement: parse_settlement(vocab, &text),
        encounter: parse_encounter(vocab, &text),
        governed_by: parse_governed_by(vocab, &text),
        controlled_by: parse_controlled_by(vocab, &text),
        crafting: parse_shops(vocab, &text).unwrap_or_default(),
    };
    tracing::debug!(
        "city screen: settlement={} encounter={} governed={} controlled={}",
        result.settlement.is_some(),
        result.encounter.is_some(),
        result.governed_by.is_some(),
        result.controlled_by.is_some()
    );
    result
}

// Layouts:
//   [CITY NAME] [TIER]        or   Settlement
//   [NUMBER] Upgrades              [CITY NAME] [TIER]
//                                  [NUMBER] Upgrades
fn parse_settlement(vocab: &Vocabulary, text: &TextUtil) -> Option<Settlement> {
    text.find_line_and_resolve(&[
        LineCandidate::new(
            |line, _| vocab.any_city.is_match(line),
            |line, i, lines| resolve_settlement(vocab, line, lines.relative(i, 1)),
        ),
        LineCandidate::new(
            |line, _| vocab.any_tier.is_match(line),
            |line, i, lines| resolve_settlement(vocab, line, lines.relative(i, 1)),
        ),
        LineCandidate::new(
            |line, _| vocab.settlement_label.is_match(line),
            |_, i, lines| resolve_settlement(vocab, lines.relative(i, 1), lines.relative(i, 2)),
        ),
    ])
}

fn resolve_settlement(vocab: &Vocabulary, title: &str, upgrades: &str) -> Settlement {
    let title = TextUtil::new(reject_short_words(title, MIN_WORD_LENGTH));
    let mut tokens = title.tokens();
    let tier = tokens.pop().unwrap_or_default();
    let name = tokens.join(" ");

    let upgrades = TextUtil::new(upgrades)
        .replace(&ONE_LOOKALIKE, "1")
        .replace(&SEVEN_LOOKALIKE, "7")
        .extract(&DIGIT_RUN)
        .to_number();

    tracing::debug!("settlement title '{} / {}', upgrades {}", name, tier, upgrades);

    Settlement {
        name: vocab.to_settlement_name(&name, CANONICAL_THRESHOLD),
        tier: vocab.to_settlement_tier(tier, CANONICAL_THRESHOLD),
        upgrades,
    }
}

fn parse_encounter(vocab: &Vocabulary, text: &TextUtil) -> Option<Encounter> {
    let banner_info = |kind| {
        move |_: &str, i: usize, lines: &LineSequence<'_>| Encounter {
            kind,
            info: lines.relative(i, -2).to_string(),
        }
    };

    text.find_line_and_resolve(&[
        LineCandidate::new(
            |line, _| vocab.war_banner.is_match(line),
            banner_info(EncounterKind::War),
        ),
        LineCandidate::new(
            |line, _| vocab.invasion_banner.is_match(line),
            banner_info(EncounterKind::Invasion),
        ),
        LineCandidate::new(
            |line, _| vocab.combatant_label.is_match(line),
            |_, i, lines| {
                let info = lines.relative(i, -1);
                let kind = if vocab.invasion_attacker.is_match(info) {
                    EncounterKind::Invasion
                } else {
                    EncounterKind::War
                };
                Encounter {
                    kind,
                    info: info.to_string(),
                }
            },
        ),
    ])
}

fn parse_governed_by(vocab: &Vocabulary, text: &TextUtil) -> Option<String> {
    text.find_line_and_resolve(&[LineCandidate::new(
        |line, _| vocab.governed_by.is_match(line),
        |_, i, lines| {
            TextUtil::new(lines.relative(i, 1))
                .strip_short_words(MIN_WORD_LENGTH)
                .into_value()
        },
    )])
    .filter(|governor| !governor.is_empty())
}

fn parse_controlled_by(vocab: &Vocabulary, text: &TextUtil) -> Option<Faction> {
    text.find_line_and_resolve(&[LineCandidate::new(
        |line, _| vocab.controlled_by.is_match(line),
        |_, i, lines| {
            TextUtil::new(lines.relative(i, 1))
                .strip_short_words(MIN_WORD_LENGTH)
                .to_result(|faction| vocab.to_faction_name(faction, CANONICAL_THRESHOLD))
        },
    )])
    .flatten()
}

fn parse_shops(vocab: &Vocabulary, text: &TextUtil) -> Option<ShopLevels> {
    let resolve = |_: &str, i: usize, lines: &LineSequence<'_>| resolve_shops(vocab, i, lines);

    text.find_line_and_resolve(&[
        LineCandidate::new(|line, _| vocab.shop_header.is_match(line), resolve),
        LineCandidate::new(|line, _| is_fuzzy_shop_header(vocab, line), resolve),
    ])
}

/// Header row misread beyond a phrase match: three leading tokens that still
/// look like crafting, refining and taxes.
fn is_fuzzy_shop_header(vocab: &Vocabulary, line: &str) -> bool {
    let tokens: Vec<&str> = line.split(' ').collect();
    tokens.len() >= 3
        && vocab.crafting.is_similar(tokens[0], SHOP_HEADER_THRESHOLD)
        && vocab.refining.is_similar(tokens[1], SHOP_HEADER_THRESHOLD)
        && vocab.taxes.is_similar(tokens[2], SHOP_HEADER_THRESHOLD)
}

fn resolve_shops(vocab: &Vocabulary, header: usize, lines: &LineSequence<'_>) -> ShopLevels {
    tracing::debug!("shop header at line {}", header);

    let rows: Vec<ShopRow> = (1..=SHOP_ROWS as isize)
        .map(|offset| extract_shop_row(vocab, lines.relative(header, offset)))
        .collect();

    ShopLevels {
        crafting: std::array::from_fn(|row| rows[row].crafting),
        refining: std::array::from_fn(|row| rows[row].refining),
        taxes: std::array::from_fn(|row| rows[row].taxes.clone()),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ShopRow {
    crafting: Option<u8>,
    refining: Option<u8>,
    taxes: Option<String>,
}

fn extract_shop_row(vocab: &Vocabulary, line: &str) -> ShopRow {
    let tokens: Vec<&str> = line.split(' ').collect();
    let mut row = ShopRow::default();

    for (i, token) in tokens.iter().enumerate() {
        if row.taxes.is_none() {
            if let Some(caps) = TAX_VALUE.captures(token) {
                row.taxes = Some(caps[1].to_string());
            }
        }

        let next = tokens.get(i + 1).copied();
        if row.crafting.is_none() {
            if vocab.is_tier_label(token, SHOP_TIER_THRESHOLD) {
                row.crafting = read_tier(token, next);
            }
            continue;
        }
        if row.refining.is_none() && vocab.is_tier_label(token, SHOP_TIER_THRESHOLD) {
            row.refining = read_tier(token, next);
        }
    }

    row
}

/// Tier number next to a tier label: a trailing digit on the label, else the
/// first digit of the following token. Without digits, a label ending in
/// `e` reads as 3 and one ending in `s` as 5.
fn read_tier(token: &str, next: Option<&str>) -> Option<u8> {
    let digit = |c: char| c.to_digit(10).map(|d| d as u8);

    if let Some(d) = token.chars().last().and_then(digit) {
        return Some(d);
    }
    if let Some(d) = next.and_then(|t| t.chars().find_map(digit)) {
        return Some(d);
    }
    if token.ends_with('e') {
        Some(3)
    } else if token.ends_with('s') {
        Some(5)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> CityResult {
        parse_city_with(&Vocabulary::builtin().unwrap(), text)
    }

    #[test]
    fn test_empty_text() {
        let result = parse("");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "settlement": null,
                "encounter": null,
                "governedBy": null,
                "controledBy": null,
                "crafting": {
                    "crafting": [null, null, null, null, null],
                    "refining": [null, null, null, null, null],
                    "taxes": [null, null, null, null]
                }
            })
        );
    }

    #[test]
    fn test_settlement_from_city_line() {
        let result = parse("Windsward Village\n3 Upgrades");
        assert_eq!(
            result.settlement,
            Some(Settlement {
                name: Some(City::Windsward),
                tier: Some(SettlementTier::Village),
                upgrades: 3.0,
            })
        );
        let value = serde_json::to_value(&result.settlement).unwrap();
        assert_eq!(value, json!({"name": "Windsward", "tier": "village", "upgrades": 3.0}));
    }

    #[test]
    fn test_settlement_german() {
        let result = parse("Immerfall  Kleinstadt\n17 Ausbauten");
        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.name, Some(City::Everfall));
        assert_eq!(settlement.tier, Some(SettlementTier::Town));
        assert_eq!(settlement.upgrades, 17.0);
    }

    #[test]
    fn test_settlement_upgrade_lookalikes() {
        let result = parse("Brightwood Hamlet\nl2 Upgrades");
        assert_eq!(result.settlement.unwrap().upgrades, 12.0);

        let result = parse("Brightwood Hamlet\nZ Upgrades");
        assert_eq!(result.settlement.unwrap().upgrades, 7.0);
    }

    #[test]
    fn test_settlement_without_upgrade_digits_is_nan() {
        let result = parse("Reekwater Capital");
        let settlement = result.settlement.clone().unwrap();
        assert_eq!(settlement.name, Some(City::Reekwater));
        assert_eq!(settlement.tier, Some(SettlementTier::Capital));
        assert!(settlement.upgrades.is_nan());
        let value = serde_json::to_value(&result.settlement).unwrap();
        assert_eq!(value["upgrades"], json!(null));
    }

    #[test]
    fn test_settlement_from_tier_line() {
        // name misread beyond a phrase match, tier still recognised
        let result = parse("Wlndsvvard Village\n4 Upgrades");
        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.tier, Some(SettlementTier::Village));
        assert_eq!(settlement.upgrades, 4.0);
    }

    #[test]
    fn test_settlement_label_reads_two_lines_below() {
        let result = parse("Settlement\nEverfall Town\n12 Upgrades");
        assert_eq!(
            result.settlement,
            Some(Settlement {
                name: Some(City::Everfall),
                tier: Some(SettlementTier::Town),
                upgrades: 12.0,
            })
        );
    }

    #[test]
    fn test_settlement_label_is_case_sensitive() {
        let result = parse("settlement\nnothing here\nat all");
        assert_eq!(result.settlement, None);
    }

    #[test]
    fn test_settlement_drops_short_edge_tokens() {
        let result = parse("| Windsward Village .\n3 Upgrades");
        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.name, Some(City::Windsward));
        assert_eq!(settlement.tier, Some(SettlementTier::Village));
    }

    #[test]
    fn test_war_banner_reads_two_lines_above() {
        let text = "Windsward Village\n\
                    3 Upgrades\n\
                    Marauders attack Windsward\n\
                    Sat, 02. Feb, 21:00\n\
                    War Declared";
        let result = parse(text);
        assert_eq!(
            result.encounter,
            Some(Encounter {
                kind: EncounterKind::War,
                info: "Marauders attack Windsward".to_string(),
            })
        );
    }

    #[test]
    fn test_invasion_banner() {
        let result = parse("Die Verderbten greifen an\nSo, 03. Feb, 20:00\nInvasion steht bevor");
        let encounter = result.encounter.unwrap();
        assert_eq!(encounter.kind, EncounterKind::Invasion);
        assert_eq!(encounter.info, "Die Verderbten greifen an");
    }

    #[test]
    fn test_banner_at_top_has_empty_info() {
        let result = parse("War in Progress");
        assert_eq!(
            result.encounter,
            Some(Encounter {
                kind: EncounterKind::War,
                info: String::new(),
            })
        );
    }

    #[test]
    fn test_combatant_label_decides_kind_from_line_above() {
        let result = parse("The Corrupted\nAttacker");
        assert_eq!(result.encounter.unwrap().kind, EncounterKind::Invasion);

        let result = parse("Syndicate Company\nDefender");
        let encounter = result.encounter.unwrap();
        assert_eq!(encounter.kind, EncounterKind::War);
        assert_eq!(encounter.info, "Syndicate Company");
    }

    #[test]
    fn test_governed_and_controlled_by() {
        let text = "Governed by\nx Windward Traders Co\nControlled by\nThe Syndicate";
        let result = parse(text);
        assert_eq!(result.governed_by.as_deref(), Some("Windward Traders Co"));
        assert_eq!(result.controlled_by, Some(Faction::Syndicate));
    }

    #[test]
    fn test_governed_by_without_next_line() {
        let result = parse("Regiert von");
        assert_eq!(result.governed_by, None);
    }

    #[test]
    fn test_controlled_by_unknown_faction() {
        let result = parse("Kontrolliert von\nNiemand");
        assert_eq!(result.controlled_by, None);
    }

    #[test]
    fn test_shops_from_header_line() {
        let text = "Crafting Refining Taxes\n\
                    Tier4 Tier3 10.00%\n\
                    Tier 5 Tier 2 7,50%\n\
                    12,00 Tiers Stufe\n\
                    Tier 2";
        let shops = parse(text).crafting;
        assert_eq!(shops.crafting, [Some(4), Some(5), Some(5), Some(2), None]);
        assert_eq!(shops.refining, [Some(3), Some(2), Some(3), None, None]);
        assert_eq!(
            shops.taxes,
            [
                Some("10.00".to_string()),
                Some("7,50".to_string()),
                Some("12,00".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_shops_from_fuzzy_header() {
        let text = "Craftinq Refininq Taxcs\nTier 1 Tier 1 5.00%";
        let shops = parse(text).crafting;
        assert_eq!(shops.crafting[0], Some(1));
        assert_eq!(shops.refining[0], Some(1));
        assert_eq!(shops.taxes[0].as_deref(), Some("5.00"));
        assert_eq!(shops.crafting[1], None);
    }

    #[test]
    fn test_read_tier() {
        assert_eq!(read_tier("Tier4", None), Some(4));
        assert_eq!(read_tier("Tier", Some("x5y")), Some(5));
        assert_eq!(read_tier("Stufe", Some("abc")), Some(3));
        assert_eq!(read_tier("Tiers", None), Some(5));
        assert_eq!(read_tier("Tier", None), None);
    }

    #[test]
    fn test_tax_separator_is_optional() {
        let vocab = Vocabulary::builtin().unwrap();
        let row = extract_shop_row(&vocab, "Stufe 4 Stufe 2 Steuern 2024");
        assert_eq!(
            row,
            ShopRow {
                crafting: Some(4),
                refining: Some(2),
                taxes: Some("2024".to_string()),
            }
        );
        assert_eq!(extract_shop_row(&vocab, "Tier 3 125").taxes.as_deref(), Some("125"));
        assert_eq!(extract_shop_row(&vocab, "Tier 3 12").taxes, None);
    }

    #[test]
    fn test_extract_shop_row_empty_line() {
        let vocab = Vocabulary::builtin().unwrap();
        assert_eq!(extract_shop_row(&vocab, ""), ShopRow::default());
    }
}
