//! Turns normalized table matrices into typed episode records. Handles the
//! consolidated table's season-block convention (only the first row of a
//! season block carries the season label) and fills missing in-season
//! numbers from a monotonic per-season counter.

use std::collections::BTreeMap;

use crate::alias::SeasonAliasIndex;
use crate::dom::{DocumentTree, Node};
use crate::extract::columns::{self, ColumnRole, RoleMap};
use crate::extract::fields::{clean_quoted, first_float, first_int, validate_air_date};
use crate::extract::table::{normalize_table, TableMatrix};
use crate::extract::section_contents;
use crate::merge::coalesce;
use crate::model::EpisodeEntity;

/// Mutable season context threaded through consolidated-table extraction:
/// the season block currently in effect and each season's episode counter.
#[derive(Debug, Default)]
pub struct SeasonCursor {
    current: Option<u32>,
    counters: BTreeMap<u32, u32>,
}

impl SeasonCursor {
    pub(crate) fn enter(&mut self, season: Option<u32>) {
        self.current = season;
    }

    /// Next in-season number: the explicit one when present (advancing the
    /// counter to at least that value so later inferred numbers cannot
    /// collide), otherwise the incremented counter.
    pub(crate) fn episode_number(&mut self, season: u32, explicit: Option<u32>) -> u32 {
        let counter = self.counters.entry(season).or_insert(0);
        match explicit {
            Some(n) => {
                *counter = (*counter).max(n);
                n
            }
            None => {
                *counter += 1;
                *counter
            }
        }
    }
}

/// Extract episodes from the consolidated cross-season table on `doc`.
/// Empty when no table with the mandatory roles exists.
pub fn master_episodes(
    doc: &DocumentTree,
    alias: &SeasonAliasIndex,
    source_url: &str,
) -> BTreeMap<u32, Vec<EpisodeEntity>> {
    for table in doc.find_all("table") {
        let matrix = normalize_table(table);
        if matrix.len() < 2 {
            continue;
        }
        let Some(roles) = columns::resolve_consolidated(&matrix[0]) else {
            continue;
        };
        let grouped = episodes_from_master_matrix(&matrix, &roles, alias, source_url);
        if !grouped.is_empty() {
            return grouped;
        }
    }
    BTreeMap::new()
}

/// Row loop for an already-resolved consolidated matrix. Split out so the
/// season-cursor semantics are testable without a document.
pub fn episodes_from_master_matrix(
    matrix: &TableMatrix,
    roles: &RoleMap,
    alias: &SeasonAliasIndex,
    source_url: &str,
) -> BTreeMap<u32, Vec<EpisodeEntity>> {
    let mut cursor = SeasonCursor::default();
    let mut records: Vec<EpisodeEntity> = Vec::new();

    for row in &matrix[1..] {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        // A non-empty season cell starts a new season block; empty cells
        // inherit the block in effect.
        if let Some(label) = roles.cell(row, ColumnRole::Season) {
            cursor.enter(alias.resolve_or_numeric(label));
        }
        let Some(season) = cursor.current else {
            continue;
        };
        let Some(rec) = row_to_episode(row, roles, season, &mut cursor, source_url) else {
            continue;
        };
        records.push(rec);
    }

    let mut grouped: BTreeMap<u32, Vec<EpisodeEntity>> = BTreeMap::new();
    for rec in coalesce(records) {
        grouped.entry(rec.season_number).or_default().push(rec);
    }
    grouped
}

/// Extract episodes for one season from its own page: tables under the
/// episodes section when one exists, otherwise any wikitable on the page.
pub fn season_page_episodes(
    doc: &DocumentTree,
    season_number: u32,
    source_url: &str,
) -> Vec<EpisodeEntity> {
    let mut records: Vec<EpisodeEntity> = Vec::new();
    for table in episode_tables(doc) {
        let matrix = normalize_table(table);
        if matrix.len() < 2 {
            continue;
        }
        let Some(roles) = columns::resolve_season_page(&matrix[0]) else {
            continue;
        };
        let mut cursor = SeasonCursor::default();
        cursor.enter(Some(season_number));
        for row in &matrix[1..] {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            if let Some(rec) = row_to_episode(row, &roles, season_number, &mut cursor, source_url) {
                records.push(rec);
            }
        }
    }
    coalesce(records)
}

fn row_to_episode(
    row: &[String],
    roles: &RoleMap,
    season: u32,
    cursor: &mut SeasonCursor,
    source_url: &str,
) -> Option<EpisodeEntity> {
    let title = roles
        .cell(row, ColumnRole::Title)
        .map(clean_quoted)
        .filter(|t| !t.is_empty());
    let air_date = roles
        .cell(row, ColumnRole::AirDate)
        .and_then(validate_air_date);

    // A row with neither a usable title nor a usable air date is a
    // decorative or legend row, not an episode.
    if title.is_none() && air_date.is_none() {
        return None;
    }

    let explicit = roles.cell(row, ColumnRole::InSeason).and_then(first_int);
    let number = cursor.episode_number(season, explicit);

    let mut rec = EpisodeEntity::new(season, number, source_url);
    rec.overall_episode_number = roles.cell(row, ColumnRole::Overall).and_then(first_int);
    rec.title = title;
    rec.air_date = air_date;
    rec.episode_type = roles.cell(row, ColumnRole::Type).map(|s| s.to_string());
    rec.us_viewers_millions = roles.cell(row, ColumnRole::Viewers).and_then(first_float);
    Some(rec)
}

fn episode_tables(doc: &DocumentTree) -> Vec<&Node> {
    let looks_like_episodes = |t: &str| {
        let t = t.to_lowercase();
        ["episode guide", "episode list", "episode summary", "episodes", "episode"]
            .iter()
            .any(|k| t.contains(k))
    };
    if let Some(nodes) = section_contents(doc, looks_like_episodes) {
        let mut tables: Vec<&Node> = Vec::new();
        for &n in &nodes {
            if n.tag == "table" && n.has_class("wikitable") {
                tables.push(n);
            }
            tables.extend(
                n.descendants()
                    .filter(|d| d.tag == "table" && d.has_class("wikitable")),
            );
        }
        if !tables.is_empty() {
            return tables;
        }
    }
    doc.find_all("table")
        .into_iter()
        .filter(|t| t.has_class("wikitable"))
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRange, SeasonEntity};

    fn alias() -> SeasonAliasIndex {
        let seasons: Vec<SeasonEntity> = [(1, "Survivor: Borneo"), (2, "Survivor: The Australian Outback")]
            .iter()
            .map(|(n, title)| SeasonEntity {
                season_number: *n,
                title: title.to_string(),
                location: String::new(),
                filming_dates: DateRange::default(),
                airing_dates: DateRange::default(),
                num_episodes: None,
                num_days: None,
                num_castaways: None,
                winner: String::new(),
                tribes: Vec::new(),
                viewership_millions: None,
                source_url: String::new(),
            })
            .collect();
        SeasonAliasIndex::build(&seasons)
    }

    fn consolidated_matrix() -> (TableMatrix, RoleMap) {
        let matrix: TableMatrix = vec![
            vec!["Season", "Episode No.", "Episode Title", "Air Date"],
            vec!["1", "1", "\"Pilot\"", "September 24, 2000"],
            vec!["", "2", "\"Island\"", "October 1, 2000"],
            vec!["2", "1", "\"Return\"", "—"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let roles = columns::resolve_consolidated(&matrix[0]).unwrap();
        (matrix, roles)
    }

    #[test]
    fn consolidated_inherits_season_blocks() {
        let (matrix, roles) = consolidated_matrix();
        let grouped = episodes_from_master_matrix(&matrix, &roles, &alias(), "http://src");

        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        let s1 = &grouped[&1];
        assert_eq!(s1.len(), 2);
        assert_eq!(s1[0].title.as_deref(), Some("Pilot"));
        assert_eq!(s1[0].air_date.as_deref(), Some("September 24, 2000"));
        assert_eq!(s1[1].episode_in_season, 2);
        assert_eq!(s1[1].air_date.as_deref(), Some("October 1, 2000"));

        let s2 = &grouped[&2];
        assert_eq!(s2.len(), 1);
        assert_eq!(s2[0].title.as_deref(), Some("Return"));
        assert_eq!(s2[0].air_date, None, "placeholder date must become null");
    }

    #[test]
    fn extraction_is_idempotent() {
        let (matrix, roles) = consolidated_matrix();
        let a = episodes_from_master_matrix(&matrix, &roles, &alias(), "http://src");
        let b = episodes_from_master_matrix(&matrix, &roles, &alias(), "http://src");
        assert_eq!(a, b);
    }

    #[test]
    fn counter_fills_missing_numbers_without_collisions() {
        let matrix: TableMatrix = vec![
            vec!["Season", "Episode No.", "Episode Title", "Air Date"],
            vec!["1", "3", "\"Three\"", "October 8, 2000"],
            vec!["", "", "\"Four\"", "October 15, 2000"],
            vec!["", "", "\"Five\"", "October 22, 2000"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let roles = columns::resolve_consolidated(&matrix[0]).unwrap();
        let grouped = episodes_from_master_matrix(&matrix, &roles, &alias(), "http://src");
        let numbers: Vec<u32> = grouped[&1].iter().map(|e| e.episode_in_season).collect();
        assert_eq!(numbers, vec![3, 4, 5]);
    }

    #[test]
    fn rows_before_season_context_are_dropped() {
        let matrix: TableMatrix = vec![
            vec!["Season", "Episode No.", "Episode Title", "Air Date"],
            vec!["", "1", "\"Orphan\"", "January 1, 2001"],
            vec!["Nowhere Land", "1", "\"Also Orphan\"", "January 8, 2001"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let roles = columns::resolve_consolidated(&matrix[0]).unwrap();
        let grouped = episodes_from_master_matrix(&matrix, &roles, &alias(), "http://src");
        assert!(grouped.is_empty());
    }

    #[test]
    fn season_page_table_extraction() {
        let html = r#"
            <div>
              <h2>Episodes</h2>
              <table class="wikitable">
                <tr><th>No.</th><th>Title</th><th>Original air date</th></tr>
                <tr><td>1</td><td>"The Marooning"</td><td>May 31, 2000</td></tr>
                <tr><td></td><td>"Quest for Food"</td><td>June 7, 2000</td></tr>
                <tr><td>·</td><td></td><td></td></tr>
              </table>
            </div>"#;
        let doc = DocumentTree::parse(html);
        let eps = season_page_episodes(&doc, 1, "http://src");
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0].episode_in_season, 1);
        assert_eq!(eps[1].episode_in_season, 2);
        assert_eq!(eps[1].title.as_deref(), Some("Quest for Food"));
    }

    #[test]
    fn non_episode_tables_are_ignored() {
        let html = r#"
            <table class="wikitable">
              <tr><th>Contestant</th><th>Tribe</th></tr>
              <tr><td>Richard</td><td>Tagi</td></tr>
            </table>"#;
        let doc = DocumentTree::parse(html);
        assert!(season_page_episodes(&doc, 1, "http://src").is_empty());
    }
}
