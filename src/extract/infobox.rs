//! Heading-keyed info blocks: the "Season Information" block that identifies
//! a season page, and the "Episode Information" block the enrichment pass
//! mines for immunity winners and eliminations. Both follow the same wiki
//! convention: an h2 section whose h3 sub-headings are keys and whatever
//! sits between them is the value.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::DocumentTree;
use crate::extract::fields::{first_float, first_int};
use crate::extract::section_contents;
use crate::model::{DateRange, SeasonEntity};

static TRIBE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\|\u{00B7}]| {2,}| - ").unwrap());
static NAME_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:/|,|&|\band\b)\s*").unwrap());

/// Collect the h3-keyed values of the section titled `section_title`.
/// Order preserved; missing section yields an empty list.
pub fn info_block(doc: &DocumentTree, section_title: &str) -> Vec<(String, String)> {
    let Some(nodes) = section_contents(doc, |t| t.contains(section_title)) else {
        return Vec::new();
    };

    let mut out: Vec<(String, String)> = Vec::new();
    let mut current_key: Option<String> = None;
    let mut parts: Vec<String> = Vec::new();

    let mut flush = |key: &mut Option<String>, parts: &mut Vec<String>, out: &mut Vec<(String, String)>| {
        if let Some(k) = key.take() {
            let value = parts.join(" ").trim().to_string();
            out.push((k, value));
        }
        parts.clear();
    };

    for node in nodes {
        if node.tag == "h3" {
            flush(&mut current_key, &mut parts, &mut out);
            current_key = Some(node.text());
        } else if current_key.is_some() {
            let text = node.text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    flush(&mut current_key, &mut parts, &mut out);
    out
}

fn get<'a>(info: &'a [(String, String)], key: &str) -> Option<&'a str> {
    info.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

fn get_containing<'a>(info: &'a [(String, String)], fragment: &str) -> Option<&'a str> {
    info.iter()
        .find(|(k, _)| k.to_lowercase().contains(fragment))
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// Build a SeasonEntity from a season page's info block. None when the page
/// carries no "Season Information" section, which is how non-season pages
/// are told apart from real ones during the sweep.
pub fn season_entity(doc: &DocumentTree, fallback_number: u32, fallback_title: &str, url: &str) -> Option<SeasonEntity> {
    let info = info_block(doc, "Season Information");
    if info.is_empty() {
        return None;
    }

    let title = doc
        .find_first("h1")
        .map(|h| h.text())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    let season_number = get(&info, "Season No.")
        .and_then(first_int)
        .unwrap_or(fallback_number);

    Some(SeasonEntity {
        season_number,
        title,
        location: get(&info, "Filming Location").unwrap_or_default().to_string(),
        filming_dates: parse_date_range(get(&info, "Filming Dates").unwrap_or_default()),
        airing_dates: parse_date_range(get(&info, "Season Run").unwrap_or_default()),
        num_episodes: get(&info, "No. of Episodes").and_then(first_int),
        num_days: get(&info, "No. of Days").and_then(first_int),
        num_castaways: get(&info, "No. of Castaways").and_then(first_int),
        winner: get(&info, "Winner").unwrap_or_default().to_string(),
        tribes: split_tribes(get(&info, "Tribes").unwrap_or_default()),
        viewership_millions: get(&info, "Viewership (in Millions)").and_then(first_float),
        source_url: url.to_string(),
    })
}

/// Immunity winners and eliminated names from an episode page's info block.
pub fn episode_facts(doc: &DocumentTree) -> (Vec<String>, Vec<String>) {
    let info = info_block(doc, "Episode Information");
    let immunity = get_containing(&info, "immunity")
        .map(split_names)
        .unwrap_or_default();
    let eliminated = get_containing(&info, "eliminated")
        .or_else(|| get_containing(&info, "voted"))
        .map(split_names)
        .unwrap_or_default();
    (immunity, eliminated)
}

fn parse_date_range(s: &str) -> DateRange {
    let mut parts = s.splitn(2, '-').map(|p| p.trim());
    let start = parts.next().filter(|p| !p.is_empty()).map(String::from);
    let end = parts.next().filter(|p| !p.is_empty()).map(String::from);
    DateRange { start, end }
}

fn split_tribes(s: &str) -> Vec<String> {
    TRIBE_SPLIT_RE
        .split(s)
        .map(|t| t.trim_matches(|c: char| matches!(c, '•' | '-' | '–' | ' ')).trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Split a multi-name value on common separators, de-duplicating while
/// preserving first-seen order.
pub fn split_names(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in NAME_SPLIT_RE.split(s) {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const SEASON_HTML: &str = r#"<div>
        <h1>Survivor: Borneo</h1>
        <h2>Season Information</h2>
        <h3>Season No.</h3><p>1</p>
        <h3>Filming Location</h3><p>Pulau Tiga, Sabah, Malaysia</p>
        <h3>Filming Dates</h3><p>March 13, 2000 - April 20, 2000</p>
        <h3>Season Run</h3><p>May 31, 2000 - August 23, 2000</p>
        <h3>No. of Episodes</h3><p>14</p>
        <h3>No. of Days</h3><p>39</p>
        <h3>No. of Castaways</h3><p>16</p>
        <h3>Winner</h3><p>Richard Hatch</p>
        <h3>Tribes</h3><p>Tagi, Pagong, Rattana</p>
        <h3>Viewership (in Millions)</h3><p>28.3</p>
        <h2>Next Section</h2>
      </div>"#;

    #[test]
    fn season_entity_from_info_block() {
        let doc = DocumentTree::parse(SEASON_HTML);
        let s = season_entity(&doc, 99, "Survivor 1", "http://src").unwrap();
        assert_eq!(s.season_number, 1);
        assert_eq!(s.title, "Survivor: Borneo");
        assert_eq!(s.location, "Pulau Tiga, Sabah, Malaysia");
        assert_eq!(s.filming_dates.start.as_deref(), Some("March 13, 2000"));
        assert_eq!(s.filming_dates.end.as_deref(), Some("April 20, 2000"));
        assert_eq!(s.num_episodes, Some(14));
        assert_eq!(s.num_days, Some(39));
        assert_eq!(s.winner, "Richard Hatch");
        assert_eq!(s.tribes, vec!["Tagi", "Pagong", "Rattana"]);
        assert_eq!(s.viewership_millions, Some(28.3));
    }

    #[test]
    fn pages_without_info_block_are_not_seasons() {
        let doc = DocumentTree::parse("<div><h1>Some Article</h1><p>text</p></div>");
        assert!(season_entity(&doc, 1, "Survivor 1", "http://src").is_none());
    }

    #[test]
    fn episode_facts_from_info_block() {
        let html = r#"<div>
            <h2>Episode Information</h2>
            <h3>Immunity Challenge Winner</h3><p>Rudy / Richard</p>
            <h3>Eliminated</h3><p>Sonja Christopher</p>
          </div>"#;
        let doc = DocumentTree::parse(html);
        let (immunity, eliminated) = episode_facts(&doc);
        assert_eq!(immunity, vec!["Rudy", "Richard"]);
        assert_eq!(eliminated, vec!["Sonja Christopher"]);
    }

    #[test]
    fn names_deduplicated_in_order() {
        assert_eq!(split_names("Rob, Amber and Rob"), vec!["Rob", "Amber"]);
        assert_eq!(split_names("Colby / Tina"), vec!["Colby", "Tina"]);
    }

    #[test]
    fn open_ended_date_range() {
        let r = parse_date_range("February 12, 2025 -");
        assert_eq!(r.start.as_deref(), Some("February 12, 2025"));
        assert_eq!(r.end, None);
    }
}
