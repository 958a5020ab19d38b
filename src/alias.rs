//! Lookup from free-text season labels to canonical season numbers, built
//! once from the already-resolved seasons and read-only afterwards.

use std::collections::HashMap;

use crate::extract::fields::first_int;
use crate::model::SeasonEntity;

/// Subtitles of the seasons whose page titles predate the plain
/// "Survivor N" naming. Used to build fetch title variants; everything the
/// alias index knows comes from fetched season entities, not from here.
pub const KNOWN_SEASON_NAMES: &[(u32, &str)] = &[
    (1, "Borneo"),
    (2, "The Australian Outback"),
    (3, "Africa"),
    (4, "Marquesas"),
    (5, "Thailand"),
    (6, "The Amazon"),
    (7, "Pearl Islands"),
    (8, "All-Stars"),
    (9, "Vanuatu"),
    (10, "Palau"),
    (11, "Guatemala"),
    (12, "Panama"),
    (13, "Cook Islands"),
    (14, "Fiji"),
    (15, "China"),
    (16, "Micronesia"),
    (17, "Gabon"),
    (18, "Tocantins"),
    (19, "Samoa"),
    (20, "Heroes vs. Villains"),
    (21, "Nicaragua"),
    (22, "Redemption Island"),
    (23, "South Pacific"),
    (24, "One World"),
    (25, "Philippines"),
    (26, "Caramoan"),
    (27, "Blood vs. Water"),
    (28, "Cagayan"),
    (29, "San Juan del Sur"),
    (30, "Worlds Apart"),
    (31, "Cambodia"),
    (32, "Kaôh Rōng"),
    (33, "Millennials vs. Gen X"),
    (34, "Game Changers"),
    (35, "Heroes vs. Healers vs. Hustlers"),
    (36, "Ghost Island"),
    (37, "David vs. Goliath"),
    (38, "Edge of Extinction"),
    (39, "Island of the Idols"),
    (40, "Winners at War"),
];

/// Page titles to try for a season, most canonical first.
pub fn season_title_variants(n: u32) -> Vec<String> {
    let mut variants = Vec::new();
    if let Some((_, name)) = KNOWN_SEASON_NAMES.iter().find(|(k, _)| *k == n) {
        variants.push(format!("Survivor: {}", name));
    }
    variants.push(format!("Survivor {}", n));
    variants
}

#[derive(Debug, Default)]
pub struct SeasonAliasIndex {
    map: HashMap<String, u32>,
}

impl SeasonAliasIndex {
    /// Register each season under its full title, the colon-stripped
    /// subtitle, and numeric forms ("survivor N" and bare "N").
    pub fn build(seasons: &[SeasonEntity]) -> SeasonAliasIndex {
        let mut index = SeasonAliasIndex::default();
        for s in seasons {
            let n = s.season_number;
            index.register(&s.title, n);
            if let Some((_, suffix)) = s.title.split_once(':') {
                index.register(suffix, n);
            }
            index.register(&format!("survivor {}", n), n);
            index.register(&n.to_string(), n);
        }
        index
    }

    fn register(&mut self, alias: &str, n: u32) {
        let key = normalize(alias);
        if !key.is_empty() {
            self.map.entry(key).or_insert(n);
        }
    }

    pub fn resolve(&self, label: &str) -> Option<u32> {
        self.map.get(&normalize(label)).copied()
    }

    /// Resolve a label via the index, falling back to the first bare integer
    /// in it. Labels with no digits and no known alias stay unresolved.
    pub fn resolve_or_numeric(&self, label: &str) -> Option<u32> {
        self.resolve(label).or_else(|| first_int(label))
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// ── Tests ──
