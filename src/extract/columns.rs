//! Maps header-row text to semantic column roles through ordered regex
//! patterns, most specific first. Two header sets exist: the consolidated
//! cross-season table (season column mandatory) and single-season pages
//! (no season column; title or air date must map for the table to count as
//! an episode list at all).

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Season,
    Overall,
    InSeason,
    Title,
    AirDate,
    Type,
    Viewers,
}

const ROLE_COUNT: usize = 7;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleMap {
    idx: [Option<usize>; ROLE_COUNT],
}

impl RoleMap {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.idx[role as usize]
    }

    /// The row cell for a role, trimmed; None when the role is unmapped or
    /// the cell is empty.
    pub fn cell<'a>(&self, row: &'a [String], role: ColumnRole) -> Option<&'a str> {
        let i = self.get(role)?;
        let text = row.get(i)?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn set(&mut self, role: ColumnRole, index: Option<usize>) {
        self.idx[role as usize] = index;
    }
}

struct RolePatterns {
    role: ColumnRole,
    patterns: Vec<Regex>,
}

fn patterns(role: ColumnRole, pats: &[&str]) -> RolePatterns {
    RolePatterns {
        role,
        patterns: pats
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
            .collect(),
    }
}

static CONSOLIDATED: LazyLock<Vec<RolePatterns>> = LazyLock::new(|| {
    vec![
        patterns(ColumnRole::Season, &[r"\bseason\b"]),
        patterns(ColumnRole::Overall, &[r"\bno\.\s*overall\b", r"\boverall\b"]),
        patterns(
            ColumnRole::InSeason,
            &[
                r"\bno\.\s*in\s*season\b",
                r"\bepisode\s*no\.",
                r"\bep\.?\b",
                r"\bepisode\b",
            ],
        ),
        patterns(ColumnRole::Title, &[r"\bepisode\s*title\b", r"\btitle\b"]),
        patterns(ColumnRole::AirDate, &[r"\bair\s*date\b", r"\boriginal"]),
        patterns(ColumnRole::Type, &[r"\bepisode\s*type\b", r"\btype\b"]),
        patterns(
            ColumnRole::Viewers,
            &[r"\bu\.?s\.?\s*viewers", r"\bviewers\b", r"\bmillions\b"],
        ),
    ]
});

static SEASON_PAGE: LazyLock<Vec<RolePatterns>> = LazyLock::new(|| {
    vec![
        patterns(ColumnRole::Overall, &[r"\bno\.\s*overall\b", r"\boverall\b"]),
        patterns(
            ColumnRole::InSeason,
            &[
                r"\bno\.\s*in\s*season\b",
                r"\bepisode\s*no\.",
                r"\bep\.?\b",
                r"\bepisode\b",
            ],
        ),
        patterns(ColumnRole::Title, &[r"\btitle\b"]),
        patterns(ColumnRole::AirDate, &[r"\bair\s*date\b", r"\boriginal"]),
        patterns(ColumnRole::Type, &[r"\bepisode\s*type\b", r"\btype\b"]),
        patterns(
            ColumnRole::Viewers,
            &[r"\bu\.?s\.?\s*viewers", r"\bviewers\b", r"\bmillions\b"],
        ),
    ]
});

fn resolve(header: &[String], sets: &[RolePatterns]) -> RoleMap {
    let mut map = RoleMap::default();
    for rp in sets {
        let hit = header.iter().enumerate().find_map(|(i, h)| {
            rp.patterns.iter().any(|p| p.is_match(h)).then_some(i)
        });
        map.set(rp.role, hit);
    }
    map
}

/// Role map for the consolidated cross-season table. The table is rejected
/// when its season or title column cannot be identified.
pub fn resolve_consolidated(header: &[String]) -> Option<RoleMap> {
    let map = resolve(header, &CONSOLIDATED);
    if map.get(ColumnRole::Season).is_none() || map.get(ColumnRole::Title).is_none() {
        return None;
    }
    Some(map)
}

/// Role map for a single-season page table. Rejected unless at least one of
/// title/air date maps; anything else is not an episode table.
pub fn resolve_season_page(header: &[String]) -> Option<RoleMap> {
    let map = resolve(header, &SEASON_PAGE);
    if map.get(ColumnRole::Title).is_none() && map.get(ColumnRole::AirDate).is_none() {
        return None;
    }
    Some(map)
}

// ── Tests ──
