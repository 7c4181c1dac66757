//! Locale tables for the in-game phrases the parsers look for.
//!
//! Every supported locale maps the same fixed list of semantic keys to the
//! literal phrase shown on screen. The built-in German and English tables are
//! compiled in; replacement tables can be loaded from a directory holding
//! `de.json` and `en.json` (flat objects of key to phrase).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use whatlang::{Detector, Lang};

use crate::error::{LocaleError, Result};

/// Supported screenshot languages, in candidate assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    De,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::De, Locale::En];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! locale_keys {
    ($($variant:ident => $name:literal,)+) => {
        /// Semantic keys shared by every locale table. Declaration order is the
        /// table order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum LocaleKey {
            $($variant,)+
        }

        impl LocaleKey {
            pub const ALL: &'static [LocaleKey] = &[$(LocaleKey::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(LocaleKey::$variant => $name,)+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(LocaleKey::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

locale_keys! {
    Township => "township",
    SettlementHamlet => "settlement_hamlet",
    SettlementVillage => "settlement_village",
    SettlementTown => "settlement_town",
    SettlementCity => "settlement_city",
    SettlementCapital => "settlement_capital",
    EncounterUpcomingWar => "encounter_upcoming_war",
    EncounterOngoingWar => "encounter_ongoing_war",
    EncounterUpcomingInvasion => "encounter_upcoming_invasion",
    EncounterOngoingInvasion => "encounter_ongoing_invasion",
    AttackerLabel => "attacker_label",
    DefenderLabel => "defender_label",
    InvasionAttacker => "invasion_attacker",
    Crafting => "crafting",
    Refining => "refining",
    Taxes => "taxes",
    Tier => "tier",
    GovernedBy => "governd_by",
    ControlledBy => "controlled_by",
    InvasionTime => "invasiontime",
    WarTime => "wartime",
    Location => "location",
    CitiesFirstLight => "cities_FirstLight",
    CitiesCutlassKeys => "cities_CutlassKeys",
    CitiesReekwater => "cities_Reekwater",
    CitiesWindsward => "cities_Windsward",
    CitiesMonarchsBluffs => "cities_MonarchsBluffs",
    CitiesEverfall => "cities_Everfall",
    CitiesQueensport => "cities_Queensport",
    CitiesRestlessShore => "cities_RestlessShore",
    CitiesWeaversFen => "cities_WeaversFen",
    CitiesBrightwood => "cities_Brightwood",
    CitiesMourningdale => "cities_Mourningdale",
    CitiesEdengrove => "cities_Edengrove",
    CitiesGreatCleave => "cities_GreatCleave",
    CitiesShatteredMountain => "cities_ShatteredMountain",
    FactionName1 => "faction_name1",
    FactionName2 => "faction_name2",
    FactionName3 => "faction_name3",
}

impl LocaleKey {
    fn index(self) -> usize {
        self as usize
    }
}

const GERMAN: &[(LocaleKey, &str)] = &[
    (LocaleKey::Township, "Siedlung"),
    (LocaleKey::SettlementHamlet, "Weiler"),
    (LocaleKey::SettlementVillage, "Dorf"),
    (LocaleKey::SettlementTown, "Kleinstadt"),
    (LocaleKey::SettlementCity, "Großstadt"),
    (LocaleKey::SettlementCapital, "Hauptstadt"),
    (LocaleKey::EncounterUpcomingWar, "Krieg erklärt"),
    (LocaleKey::EncounterOngoingWar, "Krieg im Gange"),
    (LocaleKey::EncounterUpcomingInvasion, "Invasion steht bevor"),
    (LocaleKey::EncounterOngoingInvasion, "Invasion im Gange"),
    (LocaleKey::AttackerLabel, "Angreifer"),
    (LocaleKey::DefenderLabel, "Verteidiger"),
    (LocaleKey::InvasionAttacker, "Verderbte"),
    (LocaleKey::Crafting, "Herstellung"),
    (LocaleKey::Refining, "Verfeinerung"),
    (LocaleKey::Taxes, "Steuern"),
    (LocaleKey::Tier, "Stufe"),
    (LocaleKey::GovernedBy, "Regiert von"),
    (LocaleKey::ControlledBy, "Kontrolliert von"),
    (LocaleKey::InvasionTime, "Invasionsbeginn"),
    (LocaleKey::WarTime, "Kriegsbeginn"),
    (LocaleKey::Location, "Ort"),
    (LocaleKey::CitiesFirstLight, "Erstes Licht"),
    (LocaleKey::CitiesCutlassKeys, "Entermesserriffe"),
    (LocaleKey::CitiesReekwater, "Brackwasser"),
    (LocaleKey::CitiesWindsward, "Windkreis"),
    (LocaleKey::CitiesMonarchsBluffs, "Monarchenfels"),
    (LocaleKey::CitiesEverfall, "Immerfall"),
    (LocaleKey::CitiesQueensport, "Königinhafen"),
    (LocaleKey::CitiesRestlessShore, "Rastlose Küste"),
    (LocaleKey::CitiesWeaversFen, "Weberfenn"),
    (LocaleKey::CitiesBrightwood, "Lichtholz"),
    (LocaleKey::CitiesMourningdale, "Trauertal"),
    (LocaleKey::CitiesEdengrove, "Edenhain"),
    (LocaleKey::CitiesGreatCleave, "Große Kluft"),
    (LocaleKey::CitiesShatteredMountain, "Zerrissener Berg"),
    (LocaleKey::FactionName1, "Syndikat"),
    (LocaleKey::FactionName2, "Marodeure"),
    (LocaleKey::FactionName3, "Bund"),
];

const ENGLISH: &[(LocaleKey, &str)] = &[
    (LocaleKey::Township, "Settlement"),
    (LocaleKey::SettlementHamlet, "Hamlet"),
    (LocaleKey::SettlementVillage, "Village"),
    (LocaleKey::SettlementTown, "Town"),
    (LocaleKey::SettlementCity, "City"),
    (LocaleKey::SettlementCapital, "Capital"),
    (LocaleKey::EncounterUpcomingWar, "War Declared"),
    (LocaleKey::EncounterOngoingWar, "War in Progress"),
    (LocaleKey::EncounterUpcomingInvasion, "Invasion Imminent"),
    (LocaleKey::EncounterOngoingInvasion, "Invasion in Progress"),
    (LocaleKey::AttackerLabel, "Attacker"),
    (LocaleKey::DefenderLabel, "Defender"),
    (LocaleKey::InvasionAttacker, "Corrupted"),
    (LocaleKey::Crafting, "Crafting"),
    (LocaleKey::Refining, "Refining"),
    (LocaleKey::Taxes, "Taxes"),
    (LocaleKey::Tier, "Tier"),
    (LocaleKey::GovernedBy, "Governed by"),
    (LocaleKey::ControlledBy, "Controlled by"),
    (LocaleKey::InvasionTime, "Invasion Start"),
    (LocaleKey::WarTime, "War Start"),
    (LocaleKey::Location, "Location"),
    (LocaleKey::CitiesFirstLight, "First Light"),
    (LocaleKey::CitiesCutlassKeys, "Cutlass Keys"),
    (LocaleKey::CitiesReekwater, "Reekwater"),
    (LocaleKey::CitiesWindsward, "Windsward"),
    (LocaleKey::CitiesMonarchsBluffs, "Monarch's Bluffs"),
    (LocaleKey::CitiesEverfall, "Everfall"),
    (LocaleKey::CitiesQueensport, "Queensport"),
    (LocaleKey::CitiesRestlessShore, "Restless Shore"),
    (LocaleKey::CitiesWeaversFen, "Weaver's Fen"),
    (LocaleKey::CitiesBrightwood, "Brightwood"),
    (LocaleKey::CitiesMourningdale, "Mourningdale"),
    (LocaleKey::CitiesEdengrove, "Edengrove"),
    (LocaleKey::CitiesGreatCleave, "Great Cleave"),
    (LocaleKey::CitiesShatteredMountain, "Shattered Mountain"),
    (LocaleKey::FactionName1, "Syndicate"),
    (LocaleKey::FactionName2, "Marauders"),
    (LocaleKey::FactionName3, "Covenant"),
];

/// One locale's phrases, stored by key position so every table has the same
/// shape regardless of where it was loaded from.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    locale: Locale,
    phrases: Vec<String>,
}

impl LocaleTable {
    /// Builds a table from an external key to phrase map. Every key in
    /// [`LocaleKey::ALL`] must be present with a non-blank phrase; a blank
    /// phrase would compile to a pattern matching every line.
    pub fn from_map(locale: Locale, map: &BTreeMap<String, String>) -> Result<Self> {
        for name in map.keys() {
            if LocaleKey::from_name(name).is_none() {
                tracing::warn!("locale '{}' has unknown key '{}', ignoring", locale, name);
            }
        }

        let phrases = LocaleKey::ALL
            .iter()
            .map(|key| -> Result<String> {
                let phrase = map.get(key.as_str()).ok_or(LocaleError::MissingKey {
                    locale,
                    key: key.as_str(),
                })?;
                if phrase.trim().is_empty() {
                    return Err(LocaleError::EmptyPhrase {
                        locale,
                        key: key.as_str(),
                    });
                }
                Ok(phrase.clone())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { locale, phrases })
    }

    fn from_pairs(locale: Locale, pairs: &[(LocaleKey, &str)]) -> Result<Self> {
        let map = pairs
            .iter()
            .map(|(key, phrase)| (key.as_str().to_string(), phrase.to_string()))
            .collect();
        Self::from_map(locale, &map)
    }

    /// The compiled-in table for `locale`.
    pub fn builtin(locale: Locale) -> Self {
        BUILTIN_TABLES[locale as usize].clone()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, key: LocaleKey) -> &str {
        &self.phrases[key.index()]
    }
}

lazy_static! {
    static ref BUILTIN_TABLES: Vec<LocaleTable> = vec![
        LocaleTable::from_pairs(Locale::De, GERMAN).expect("built-in German table is complete"),
        LocaleTable::from_pairs(Locale::En, ENGLISH).expect("built-in English table is complete"),
    ];

    static ref DETECTOR: Detector = Detector::with_allowlist(vec![Lang::Deu, Lang::Eng]);
}

/// All compiled-in tables, in [`Locale::ALL`] order.
pub fn builtin_tables() -> Vec<LocaleTable> {
    BUILTIN_TABLES.clone()
}

/// Loads `de.json` and `en.json` from `dir`.
pub fn load_locale_dir(dir: &Path) -> Result<Vec<LocaleTable>> {
    Locale::ALL
        .iter()
        .map(|&locale| {
            let path = dir.join(locale.file_name());
            let content = fs::read_to_string(&path).map_err(|source| LocaleError::Io {
                path: path.clone(),
                source,
            })?;
            let map: BTreeMap<String, String> = serde_json::from_str(&content)
                .map_err(|source| LocaleError::Json {
                    path: path.clone(),
                    source,
                })?;
            let table = LocaleTable::from_map(locale, &map)?;
            tracing::debug!("loaded locale table {} from {}", locale, path.display());
            Ok(table)
        })
        .collect()
}

/// Guesses which supported language the OCR text is in.
pub fn detect_locale(text: &str) -> Option<Locale> {
    if text.trim().is_empty() {
        return None;
    }
    match DETECTOR.detect_lang(text)? {
        Lang::Deu => Some(Locale::De),
        Lang::Eng => Some(Locale::En),
        _ => None,
    }
}
