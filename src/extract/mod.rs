pub mod columns;
pub mod fields;
pub mod freetext;
pub mod infobox;
pub mod records;
pub mod table;

use crate::dom::{collapse_ws, DocumentTree, Node, NodeChild};

/// Text content of a table cell. Line breaks become " / " separators so that
/// multi-value cells (double eliminations, shared rewards) stay splittable.
pub fn cell_text(node: &Node) -> String {
    let mut out = String::new();
    collect(node, &mut out);
    return collapse_ws(&out);

    fn collect(node: &Node, out: &mut String) {
        for child in &node.children {
            match child {
                NodeChild::Text(t) => {
                    out.push_str(t);
                    out.push(' ');
                }
                NodeChild::Element(n) if n.tag == "br" => out.push_str(" / "),
                NodeChild::Element(n) => collect(n, out),
            }
        }
    }
}

pub fn heading_level(tag: &str) -> u8 {
    match tag {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        "h6" => 6,
        _ => 7,
    }
}

fn is_heading(tag: &str) -> bool {
    heading_level(tag) < 7
}

/// Find the first h2-h4 heading whose text (or anchor span id) satisfies the
/// predicate, and return the sibling elements that follow it up to the next
/// heading of the same or higher level.
pub fn section_contents<'a>(
    doc: &'a DocumentTree,
    matches: impl Fn(&str) -> bool,
) -> Option<Vec<&'a Node>> {
    let heading_matches = |n: &Node| -> bool {
        if matches(&n.text()) {
            return true;
        }
        // Section titles sometimes live only in an anchor span's id.
        n.find_all("span")
            .iter()
            .filter_map(|s| s.attr("id"))
            .any(|id| matches(&id.replace('_', " ")))
    };

    // Scan every container's child list so the heading can sit at any depth.
    let mut containers: Vec<&Node> = vec![doc.root()];
    containers.extend(doc.descendants());
    for parent in containers {
        let children: Vec<&Node> = parent.child_elements().collect();
        for (i, child) in children.iter().enumerate() {
            let level = heading_level(&child.tag);
            if !(2..=4).contains(&level) || !heading_matches(child) {
                continue;
            }
            let mut nodes = Vec::new();
            for sib in &children[i + 1..] {
                if is_heading(&sib.tag) && heading_level(&sib.tag) <= level {
                    break;
                }
                nodes.push(*sib);
            }
            return Some(nodes);
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentTree;

    #[test]
    fn cell_text_br_separator() {
        let doc = DocumentTree::parse("<table><tbody><tr><td>Rob<br>Amber</td></tr></tbody></table>");
        let td = doc.find_first("td").unwrap();
        assert_eq!(cell_text(td), "Rob / Amber");
    }

    #[test]
    fn section_stops_at_same_level_heading() {
        let html = "<div><h2>Episodes</h2><p>one</p><ul><li>x</li></ul><h2>Trivia</h2><p>two</p></div>";
        let doc = DocumentTree::parse(html);
        let nodes = section_contents(&doc, |t| t.to_lowercase().contains("episode")).unwrap();
        let tags: Vec<&str> = nodes.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["p", "ul"]);
    }

    #[test]
    fn section_includes_lower_level_headings() {
        let html = "<div><h2>Season Information</h2><h3>Winner</h3><p>Richard</p><h2>Next</h2></div>";
        let doc = DocumentTree::parse(html);
        let nodes = section_contents(&doc, |t| t.contains("Season Information")).unwrap();
        let tags: Vec<&str> = nodes.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["h3", "p"]);
    }

    #[test]
    fn section_found_via_anchor_id() {
        let html = r#"<div><h2><span id="Episode_Guide"></span>Guide</h2><ul><li>a</li></ul></div>"#;
        let doc = DocumentTree::parse(html);
        let nodes = section_contents(&doc, |t| t.to_lowercase().contains("episode")).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn missing_section_is_none() {
        let doc = DocumentTree::parse("<div><p>no headings here</p></div>");
        assert!(section_contents(&doc, |t| t.contains("Episodes")).is_none());
    }
}
