use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const WIKI_BASE: &str = "https://survivor.fandom.com";

/// Runtime settings. Defaults match the public Survivor fandom wiki;
/// a JSON config file and CLI flags can override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wiki_base: String,
    pub api_endpoint: String,
    /// A descriptive user agent is polite.
    pub user_agent: String,
    /// Sleep before every outbound request, in milliseconds.
    pub request_delay_ms: u64,
    pub min_season: u32,
    /// Generous upper bound; the sweep stops early once pages stop existing.
    pub max_season_guess: u32,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            wiki_base: WIKI_BASE.to_string(),
            api_endpoint: format!("{}/api.php", WIKI_BASE),
            user_agent: "SurvivorScraper/0.1 (+https://example.com/contact)".to_string(),
            request_delay_ms: 750,
            min_season: 1,
            max_season_guess: 60,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => {
                let raw = fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                let cfg = serde_json::from_str(&raw)
                    .with_context(|| format!("Malformed config file {}", p.display()))?;
                Ok(cfg)
            }
            None => Ok(Config::default()),
        }
    }
}

// ── Tests ──
