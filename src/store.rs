//! JSON datasets on disk: the season collection, the episode collection,
//! and a derived per-episode facts view for consumers that only want
//! enrichment data.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Enrichment, EpisodeEntity, SeasonEntity};

const SEASONS_FILE: &str = "seasons.json";
const EPISODES_FILE: &str = "episodes.json";
const FACTS_FILE: &str = "episode_facts.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeasonsFile {
    pub updated_at: Option<DateTime<Utc>>,
    pub seasons: Vec<SeasonEntity>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EpisodesFile {
    pub updated_at: Option<DateTime<Utc>>,
    pub episodes_by_season: BTreeMap<u32, Vec<EpisodeEntity>>,
}

/// Derived view: episode identity plus enrichment only.
#[derive(Debug, Serialize, Deserialize)]
pub struct EpisodeFactsRow {
    pub season_number: u32,
    pub episode_in_season: u32,
    pub title: Option<String>,
    pub enrichment: Enrichment,
}

#[derive(Debug, Serialize, Deserialize)]
struct FactsFile {
    updated_at: Option<DateTime<Utc>>,
    facts_by_season: BTreeMap<u32, Vec<EpisodeFactsRow>>,
}

pub fn save_seasons(data_dir: &Path, seasons: &[SeasonEntity]) -> Result<()> {
    write_json(
        data_dir,
        SEASONS_FILE,
        &SeasonsFile {
            updated_at: Some(Utc::now()),
            seasons: seasons.to_vec(),
        },
    )
}

pub fn load_seasons(data_dir: &Path) -> Result<SeasonsFile> {
    read_json(data_dir, SEASONS_FILE)
}

/// Write the episode collection and its derived facts view.
pub fn save_episodes(
    data_dir: &Path,
    episodes_by_season: &BTreeMap<u32, Vec<EpisodeEntity>>,
) -> Result<()> {
    write_json(
        data_dir,
        EPISODES_FILE,
        &EpisodesFile {
            updated_at: Some(Utc::now()),
            episodes_by_season: episodes_by_season.clone(),
        },
    )?;

    let facts_by_season: BTreeMap<u32, Vec<EpisodeFactsRow>> = episodes_by_season
        .iter()
        .map(|(n, eps)| {
            let rows = eps
                .iter()
                .map(|e| EpisodeFactsRow {
                    season_number: e.season_number,
                    episode_in_season: e.episode_in_season,
                    title: e.title.clone(),
                    enrichment: e.enrichment.clone(),
                })
                .collect();
            (*n, rows)
        })
        .collect();
    write_json(
        data_dir,
        FACTS_FILE,
        &FactsFile {
            updated_at: Some(Utc::now()),
            facts_by_season,
        },
    )
}

pub fn load_episodes(data_dir: &Path) -> Result<EpisodesFile> {
    read_json(data_dir, EPISODES_FILE)
}

fn write_json<T: Serialize>(data_dir: &Path, name: &str, value: &T) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
    let path = data_dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Missing files read as empty datasets; a malformed file is an operator
/// error and surfaces.
fn read_json<T: Default + for<'de> Deserialize<'de>>(data_dir: &Path, name: &str) -> Result<T> {
    let path = data_dir.join(name);
    if !path.exists() {
        return Ok(T::default());
    }
    let raw =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed dataset {}", path.display()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = env::temp_dir().join(format!("survivor_scraper_test_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn episodes_round_trip_with_string_keys() {
        let dir = temp_dir("episodes");
        let mut ep = EpisodeEntity::new(1, 1, "http://src");
        ep.title = Some("Pilot".into());
        let map = BTreeMap::from([(1u32, vec![ep])]);

        save_episodes(&dir, &map).unwrap();

        let raw = fs::read_to_string(dir.join(EPISODES_FILE)).unwrap();
        assert!(raw.contains("\"1\""), "season keys serialize as strings");

        let loaded = load_episodes(&dir).unwrap();
        assert_eq!(loaded.episodes_by_season, map);
        assert!(loaded.updated_at.is_some());

        let facts = fs::read_to_string(dir.join(FACTS_FILE)).unwrap();
        assert!(facts.contains("facts_by_season"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = temp_dir("missing");
        let seasons = load_seasons(&dir).unwrap();
        assert!(seasons.seasons.is_empty());
        assert!(seasons.updated_at.is_none());
    }
}
