//! Per-season resolution: an ordered sequence of extraction strategies,
//! first non-empty result wins. Consolidated table first, then the season's
//! own page (table, then list), then linked episode-guide subpages, then
//! nothing — a season that exhausts every state is simply absent from the
//! output, which is an expected outcome, not an error.

use std::collections::BTreeMap;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::alias::{season_title_variants, SeasonAliasIndex};
use crate::config::Config;
use crate::dom::DocumentTree;
use crate::extract::{freetext, infobox, records};
use crate::fetch::{title_from_path, FetchedDocument, Fetcher};
use crate::model::{EpisodeEntity, SeasonEntity};

pub const MASTER_EPISODES_TITLE: &str = "List of Survivor (U.S.) episodes";

/// How far past the last found season the sweep probes before stopping.
const SWEEP_GAP: u32 = 2;

/// How many episode-guide-looking links to follow per season page.
const MAX_SUBPAGE_LINKS: usize = 5;

/// Single-document strategies, tried in order on a season page and again on
/// each linked subpage. Uniform signature so the orchestrator stays a plain
/// loop over states.
const PAGE_STRATEGIES: &[(&str, fn(&DocumentTree, u32, &str) -> Vec<EpisodeEntity>)] = &[
    ("season-page-table", records::season_page_episodes),
    ("season-page-list", freetext::list_episodes),
];

/// Sweep season numbers from the configured minimum up to the guess bound,
/// stopping once the gap since the last existing season exceeds SWEEP_GAP.
pub async fn fetch_all_seasons<F: Fetcher>(fetcher: &F, cfg: &Config) -> Vec<SeasonEntity> {
    let pb = progress_bar(cfg.max_season_guess.saturating_sub(cfg.min_season) as u64 + 1);
    let mut seasons: Vec<SeasonEntity> = Vec::new();
    let mut max_seen = 0;

    for n in cfg.min_season..=cfg.max_season_guess {
        match fetch_one_season(fetcher, n).await {
            Some(season) => {
                max_seen = n;
                seasons.push(season);
            }
            None if n > max_seen + SWEEP_GAP => {
                debug!("No season page at {} and beyond, stopping sweep", n);
                break;
            }
            None => {}
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    seasons.sort_by_key(|s| s.season_number);
    info!("Resolved {} seasons", seasons.len());
    seasons
}

/// Try the season's title variants until one page carries a season info
/// block. Pages without the block are not season pages.
pub async fn fetch_one_season<F: Fetcher>(fetcher: &F, n: u32) -> Option<SeasonEntity> {
    for title in season_title_variants(n) {
        let Some(page) = fetcher.fetch(&title).await else {
            continue;
        };
        if let Some(season) = infobox::season_entity(&page.doc, n, &title, &page.url) {
            return Some(season);
        }
    }
    None
}

/// Episodes for every season: the consolidated table's seasons are used
/// verbatim when non-empty, and only absent or empty seasons are filled
/// from the per-season fallback chain. Strategies never merge at the season
/// level.
pub async fn fetch_episodes_by_season<F: Fetcher>(
    fetcher: &F,
    seasons: &[SeasonEntity],
    alias: &SeasonAliasIndex,
) -> BTreeMap<u32, Vec<EpisodeEntity>> {
    let mut by_season: BTreeMap<u32, Vec<EpisodeEntity>> = BTreeMap::new();

    if let Some(page) = fetcher.fetch(MASTER_EPISODES_TITLE).await {
        by_season = records::master_episodes(&page.doc, alias, &page.url);
        info!(
            "Consolidated table covered {} seasons",
            by_season.len()
        );
    }

    let pb = progress_bar(seasons.len() as u64);
    for season in seasons {
        let n = season.season_number;
        pb.inc(1);
        if by_season.get(&n).is_some_and(|eps| !eps.is_empty()) {
            continue;
        }
        let episodes = resolve_season(fetcher, n).await;
        if episodes.is_empty() {
            debug!("Season {} yielded no episodes from any source", n);
            by_season.remove(&n);
        } else {
            by_season.insert(n, episodes);
        }
    }
    pb.finish_and_clear();

    by_season
}

/// The per-season state machine: season page (table, then list), then
/// linked subpages, each retried across the season's title variants.
async fn resolve_season<F: Fetcher>(fetcher: &F, n: u32) -> Vec<EpisodeEntity> {
    for title in season_title_variants(n) {
        let Some(page) = fetcher.fetch(&title).await else {
            continue;
        };
        if let Some(eps) = try_page_strategies(&page, n) {
            return eps;
        }
        for href in episode_like_links(&page.doc) {
            let Some(sub) = fetcher.fetch(&title_from_path(&href)).await else {
                continue;
            };
            if let Some(eps) = try_page_strategies(&sub, n) {
                return eps;
            }
        }
    }
    Vec::new()
}

fn try_page_strategies(page: &FetchedDocument, n: u32) -> Option<Vec<EpisodeEntity>> {
    for (name, strategy) in PAGE_STRATEGIES {
        let episodes = strategy(&page.doc, n, &page.url);
        if !episodes.is_empty() {
            debug!("Season {} resolved via {} ({})", n, name, page.url);
            return Some(episodes);
        }
    }
    None
}

/// Internal links whose label or path resembles an episode-guide
/// reference, de-duplicated preserving order.
fn episode_like_links(doc: &DocumentTree) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for a in doc.find_all("a") {
        let Some(href) = a.attr("href") else { continue };
        if !href.starts_with("/wiki/") {
            continue;
        }
        let label = a.text().to_lowercase();
        if !(label.contains("episode") || href.to_lowercase().contains("episode")) {
            continue;
        }
        if !out.iter().any(|h| h == href) {
            out.push(href.to_string());
        }
    }
    out.truncate(MAX_SUBPAGE_LINKS);
    out
}

/// Independent second stage: for each episode with a validated air date,
/// fetch its own detail page and merge in infobox facts and tagged events.
/// Only enrichment fields are written; core fields stay untouched.
/// Episodes without a validated air date have not aired yet and are
/// skipped.
pub async fn enrich_episodes<F: Fetcher>(
    fetcher: &F,
    episodes_by_season: &mut BTreeMap<u32, Vec<EpisodeEntity>>,
) {
    let total: usize = episodes_by_season.values().map(|v| v.len()).sum();
    let pb = progress_bar(total as u64);

    for episodes in episodes_by_season.values_mut() {
        for ep in episodes.iter_mut() {
            pb.inc(1);
            if ep.air_date.is_none() {
                continue;
            }
            let Some(title) = ep.title.clone() else {
                continue;
            };
            let Some(page) = fetch_episode_page(fetcher, &title).await else {
                continue;
            };

            let enr = &mut ep.enrichment;
            if enr.episode_page_url.is_none() {
                enr.episode_page_url = Some(page.url.clone());
            }
            let (immunity, eliminated) = infobox::episode_facts(&page.doc);
            if enr.immunity_winners.is_empty() {
                enr.immunity_winners = immunity;
            }
            if enr.eliminated.is_empty() {
                enr.eliminated = eliminated;
            }
            if enr.advantage_events.is_empty() {
                enr.advantage_events = freetext::tag_events(&page.doc);
            }
        }
    }
    pb.finish_and_clear();
}

/// Plain title first, then the "(episode)" disambiguation variant; prefer
/// whichever page actually carries an episode info block.
async fn fetch_episode_page<F: Fetcher>(fetcher: &F, title: &str) -> Option<FetchedDocument> {
    let variant = format!("{} (episode)", title);
    if let Some(page) = fetcher.fetch(title).await {
        if !infobox::info_block(&page.doc, "Episode Information").is_empty() {
            return Some(page);
        }
        if let Some(alt) = fetcher.fetch(&variant).await {
            if !infobox::info_block(&alt.doc, "Episode Information").is_empty() {
                return Some(alt);
            }
        }
        return Some(page);
    }
    fetcher.fetch(&variant).await
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

// ── Tests ──
