use serde::{Deserialize, Serialize};

/// Start/end of a loosely formatted date span as it appears on the wiki.
/// Kept as display strings; only episode air dates go through grammar
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEntity {
    pub season_number: u32,
    pub title: String,
    pub location: String,
    pub filming_dates: DateRange,
    pub airing_dates: DateRange,
    pub num_episodes: Option<u32>,
    pub num_days: Option<u32>,
    pub num_castaways: Option<u32>,
    pub winner: String,
    pub tribes: Vec<String>,
    pub viewership_millions: Option<f64>,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEntity {
    pub season_number: u32,
    pub episode_in_season: u32,
    pub overall_episode_number: Option<u32>,
    pub title: Option<String>,
    /// Validated against the `MonthName D, YYYY` grammar; anything else is None.
    pub air_date: Option<String>,
    pub episode_type: Option<String>,
    pub us_viewers_millions: Option<f64>,
    pub source_url: String,
    #[serde(default)]
    pub enrichment: Enrichment,
}

impl EpisodeEntity {
    pub fn new(season_number: u32, episode_in_season: u32, source_url: &str) -> EpisodeEntity {
        EpisodeEntity {
            season_number,
            episode_in_season,
            overall_episode_number: None,
            title: None,
            air_date: None,
            episode_type: None,
            us_viewers_millions: None,
            source_url: source_url.to_string(),
            enrichment: Enrichment::default(),
        }
    }
}

/// Facts merged in from an episode's own detail page. Added by the
/// enrichment pass only; core fields are never touched from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub episode_page_url: Option<String>,
    pub immunity_winners: Vec<String>,
    pub eliminated: Vec<String>,
    pub advantage_events: Vec<AdvantageEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvantageEvent {
    pub text: String,
    pub tag: String,
}
