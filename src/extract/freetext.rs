//! Prose and list extraction: the fallback episode strategy for pages that
//! carry their episode guide as a plain list, and the keyword tagger that
//! collects advantage/idol mentions from notes sections.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{DocumentTree, Node};
use crate::extract::fields::{clean_quoted, validate_air_date, MONTH_NAMES};
use crate::extract::records::SeasonCursor;
use crate::extract::section_contents;
use crate::merge::coalesce;
use crate::model::{AdvantageEvent, EpisodeEntity};

static EP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ep(?:isode)?\.?\s*)?(\d{1,3})\s*[–—:.\-]\s*").unwrap());
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[“"]([^”"]+)[”"]"#).unwrap());
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static DATE_AFTER_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:air|release)\s*date:?\s*((?:{})\s+\d{{1,2}},\s+\d{{4}})",
        MONTH_NAMES
    ))
    .unwrap()
});
static DATE_AFTER_DASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"[–—-]\s*((?:{})\s+\d{{1,2}},\s+\d{{4}})\s*$",
        MONTH_NAMES
    ))
    .unwrap()
});

/// Keyword vocabulary for entity-fact tagging, most specific first. The
/// bare "advantage" match is generic and gets the default "event" tag.
const EVENT_KEYWORDS: &[(&str, &str)] = &[
    ("hidden immunity idol", "idol"),
    ("immunity idol", "idol"),
    ("idol", "idol"),
    ("steal-a-vote", "steal-a-vote"),
    ("steal a vote", "steal-a-vote"),
    ("extra vote", "extra-vote"),
    ("vote nullifier", "nullifier"),
    ("nullifier", "nullifier"),
    ("fire token", "fire-token"),
    ("medevac", "medevac"),
    ("advantage", "event"),
];

fn looks_like_episodes_heading(t: &str) -> bool {
    let t = t.to_lowercase();
    ["episode guide", "episode list", "episode summary", "episodes", "episode"]
        .iter()
        .any(|k| t.contains(k))
}

/// Fallback strategy: extract episodes from list items under the episodes
/// section. Items yielding neither a title nor a date are dropped;
/// numbering follows the same monotonic-counter rule as table extraction.
pub fn list_episodes(doc: &DocumentTree, season_number: u32, source_url: &str) -> Vec<EpisodeEntity> {
    let Some(nodes) = section_contents(doc, looks_like_episodes_heading) else {
        return Vec::new();
    };

    let mut cursor = SeasonCursor::default();
    cursor.enter(Some(season_number));
    let mut records = Vec::new();

    for node in nodes {
        let lists: Vec<&Node> = if node.tag == "ul" || node.tag == "ol" {
            vec![node]
        } else {
            node.descendants()
                .filter(|n| n.tag == "ul" || n.tag == "ol")
                .collect()
        };
        for list in lists {
            for li in list.child_elements().filter(|n| n.tag == "li") {
                if let Some(rec) = parse_list_item(li, season_number, &mut cursor, source_url) {
                    records.push(rec);
                }
            }
        }
    }

    coalesce(records)
}

fn parse_list_item(
    li: &Node,
    season: u32,
    cursor: &mut SeasonCursor,
    source_url: &str,
) -> Option<EpisodeEntity> {
    let text = li.text();
    if text.is_empty() {
        return None;
    }

    let (explicit, rest) = match EP_PREFIX_RE.captures(&text) {
        Some(caps) => {
            let n = caps[1].parse().ok();
            (n, text[caps.get(0).unwrap().end()..].to_string())
        }
        None => (None, text.clone()),
    };

    // Title: quoted span first, italicized span as fallback.
    let mut title = QUOTED_RE
        .captures(&rest)
        .map(|c| c[1].trim().to_string())
        .or_else(|| {
            li.find_first("i")
                .map(|i| i.text())
                .filter(|t| !t.is_empty())
        });

    // Date: parenthesized (grammar-checked), after an air/release-date
    // label, or after a trailing dash.
    let air_date = PAREN_RE
        .captures_iter(&rest)
        .find_map(|c| validate_air_date(&c[1]))
        .or_else(|| {
            DATE_AFTER_LABEL_RE
                .captures(&rest)
                .and_then(|c| validate_air_date(&c[1]))
        })
        .or_else(|| {
            DATE_AFTER_DASH_RE
                .captures(&rest)
                .and_then(|c| validate_air_date(&c[1]))
        });

    if title.is_none() {
        // Last resort: text before the date/separator, quotes stripped.
        let mut candidate = rest.clone();
        if let Some(start) = PAREN_RE.find(&candidate).map(|m| m.start()) {
            candidate.truncate(start);
        }
        if let Some(start) = DATE_AFTER_DASH_RE.find(&candidate).map(|m| m.start()) {
            candidate.truncate(start);
        }
        let cleaned = clean_quoted(candidate.trim_end_matches(['–', '—', '-', ' ']));
        if !cleaned.is_empty() && air_date.is_some() {
            title = Some(cleaned);
        }
    }

    if title.is_none() && air_date.is_none() {
        return None;
    }

    let number = cursor.episode_number(season, explicit);
    let mut rec = EpisodeEntity::new(season, number, source_url);
    rec.title = title;
    rec.air_date = air_date;
    Some(rec)
}

/// Scan a document for advantage-related facts: nodes under a notes/summary
/// section when one exists, otherwise every paragraph and list item. Each
/// matching node is tagged with its first matching keyword and
/// de-duplicated by exact text.
pub fn tag_events(doc: &DocumentTree) -> Vec<AdvantageEvent> {
    let is_notes = |t: &str| {
        let t = t.to_lowercase();
        t.contains("note") || t.contains("summary") || t.contains("trivia")
    };

    let texts: Vec<String> = match section_contents(doc, is_notes) {
        Some(nodes) => nodes
            .iter()
            .flat_map(|n| prose_texts(n))
            .collect(),
        None => {
            let mut all = Vec::new();
            for n in doc.descendants() {
                if n.tag == "p" || n.tag == "li" {
                    all.push(n.text());
                }
            }
            all
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut events = Vec::new();
    for text in texts {
        if text.is_empty() || !seen.insert(text.clone()) {
            continue;
        }
        let lower = text.to_lowercase();
        if let Some((_, tag)) = EVENT_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw)) {
            events.push(AdvantageEvent {
                text,
                tag: tag.to_string(),
            });
        }
    }
    events
}

fn prose_texts(node: &Node) -> Vec<String> {
    let mut out = Vec::new();
    if node.tag == "p" {
        out.push(node.text());
    } else if node.tag == "li" {
        out.push(node.text());
    }
    for n in node.descendants() {
        if n.tag == "p" || n.tag == "li" {
            out.push(n.text());
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn episodes_from(html: &str) -> Vec<EpisodeEntity> {
        let doc = DocumentTree::parse(html);
        list_episodes(&doc, 11, "http://src")
    }

    #[test]
    fn numbered_quoted_dated_item() {
        let eps = episodes_from(
            r#"<div><h2>Episodes</h2><ul><li>Ep 4 – "Exile" (November 2, 2005)</li></ul></div>"#,
        );
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].episode_in_season, 4);
        assert_eq!(eps[0].title.as_deref(), Some("Exile"));
        assert_eq!(eps[0].air_date.as_deref(), Some("November 2, 2005"));
    }

    #[test]
    fn counter_continues_after_explicit_number() {
        let eps = episodes_from(
            r#"<div><h2>Episode Guide</h2><ul>
                 <li>Ep 4 – "Exile" (November 2, 2005)</li>
                 <li>"Redemption" (November 9, 2005)</li>
               </ul></div>"#,
        );
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[1].episode_in_season, 5);
        assert_eq!(eps[1].title.as_deref(), Some("Redemption"));
    }

    #[test]
    fn italic_title_fallback() {
        let eps = episodes_from(
            "<div><h2>Episodes</h2><ul><li><i>The Merge</i> (December 1, 2005)</li></ul></div>",
        );
        assert_eq!(eps[0].title.as_deref(), Some("The Merge"));
        assert_eq!(eps[0].air_date.as_deref(), Some("December 1, 2005"));
    }

    #[test]
    fn date_after_dash_and_label() {
        let eps = episodes_from(
            r#"<div><h2>Episodes</h2><ul>
                 <li>"Opening Night" – September 15, 2005</li>
                 <li>"Closing Act" air date: December 11, 2005</li>
               </ul></div>"#,
        );
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0].air_date.as_deref(), Some("September 15, 2005"));
        assert_eq!(eps[1].air_date.as_deref(), Some("December 11, 2005"));
    }

    #[test]
    fn unusable_items_dropped() {
        let eps = episodes_from(
            "<div><h2>Episodes</h2><ul><li>See also the episode guide.</li></ul></div>",
        );
        assert!(eps.is_empty());
    }

    #[test]
    fn events_tagged_and_deduplicated() {
        let html = r#"<div>
              <h2>Notes</h2>
              <ul>
                <li>Judd found a hidden immunity idol at camp.</li>
                <li>Judd found a hidden immunity idol at camp.</li>
                <li>Gary used a steal-a-vote advantage at tribal council.</li>
                <li>A secret advantage was hidden on Exile Island.</li>
                <li>The tribes merged on day 19.</li>
              </ul>
            </div>"#;
        let doc = DocumentTree::parse(html);
        let events = tag_events(&doc);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].tag, "idol");
        assert_eq!(events[1].tag, "steal-a-vote");
        assert_eq!(events[2].tag, "event");
    }

    #[test]
    fn events_fall_back_to_whole_page() {
        let html = "<div><p>She played her idol that night.</p><p>Unrelated text.</p></div>";
        let doc = DocumentTree::parse(html);
        let events = tag_events(&doc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag, "idol");
    }
}
