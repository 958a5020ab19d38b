//! Merges duplicate episode records produced by independent strategies or
//! duplicate table rows. Policy: prefer complete over incomplete — a field
//! is only taken from the incoming record when the base lacks it, and never
//! overwritten once populated. Field-level merging is therefore commutative
//! for disjoint fields, which keeps results independent of row order.

use std::collections::BTreeMap;

use crate::model::EpisodeEntity;

/// Fill the base record's absent optional fields from `incoming`.
/// The (season_number, episode_in_season) key is never touched.
pub fn merge_episode(base: &mut EpisodeEntity, incoming: &EpisodeEntity) {
    if base.overall_episode_number.is_none() {
        base.overall_episode_number = incoming.overall_episode_number;
    }
    if base.title.is_none() {
        base.title = incoming.title.clone();
    }
    if base.air_date.is_none() {
        base.air_date = incoming.air_date.clone();
    }
    if base.episode_type.is_none() {
        base.episode_type = incoming.episode_type.clone();
    }
    if base.us_viewers_millions.is_none() {
        base.us_viewers_millions = incoming.us_viewers_millions;
    }

    let enr = &mut base.enrichment;
    let inc = &incoming.enrichment;
    if enr.episode_page_url.is_none() {
        enr.episode_page_url = inc.episode_page_url.clone();
    }
    if enr.immunity_winners.is_empty() {
        enr.immunity_winners = inc.immunity_winners.clone();
    }
    if enr.eliminated.is_empty() {
        enr.eliminated = inc.eliminated.clone();
    }
    if enr.advantage_events.is_empty() {
        enr.advantage_events = inc.advantage_events.clone();
    }
}

/// Collapse duplicate rows from one strategy by episode key, merging field
/// by field, and return the records ordered by episode number.
pub fn coalesce(records: Vec<EpisodeEntity>) -> Vec<EpisodeEntity> {
    let mut by_key: BTreeMap<(u32, u32), EpisodeEntity> = BTreeMap::new();
    for rec in records {
        let key = (rec.season_number, rec.episode_in_season);
        match by_key.get_mut(&key) {
            Some(base) => merge_episode(base, &rec),
            None => {
                by_key.insert(key, rec);
            }
        }
    }
    by_key.into_values().collect()
}

// ── Tests ──
