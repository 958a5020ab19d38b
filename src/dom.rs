use scraper::{ElementRef, Html};

/// Parsed page content as a closed tag/attribute/children tree.
///
/// Built once from the HTML returned by the wiki API and never mutated.
/// Extraction code only sees this model, never the underlying parser.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    root: Node,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeChild>,
}

#[derive(Debug, Clone)]
pub enum NodeChild {
    Element(Node),
    Text(String),
}

impl DocumentTree {
    /// Parse an HTML string through html5ever and convert the element tree
    /// into the closed node model.
    pub fn parse(html: &str) -> DocumentTree {
        let doc = Html::parse_document(html);
        DocumentTree {
            root: convert(doc.root_element()),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// All descendant elements with the given tag name, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.root.find_all(tag)
    }

    pub fn find_first(&self, tag: &str) -> Option<&Node> {
        self.root.descendants().find(|n| n.tag == tag)
    }

    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|w| w == class))
            .unwrap_or(false)
    }

    /// Direct child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            NodeChild::Element(n) => Some(n),
            NodeChild::Text(_) => None,
        })
    }

    /// Pre-order traversal of this node's descendant elements (self excluded).
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Node> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.descendants().filter(|n| n.tag == tag).collect()
    }

    pub fn find_first(&self, tag: &str) -> Option<&Node> {
        self.descendants().find(|n| n.tag == tag)
    }

    /// Concatenated text content with runs of whitespace collapsed to single
    /// spaces, trimmed at both ends.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        collapse_ws(&out)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        for child in node.child_elements() {
            self.stack.push(child);
        }
        self.stack[start..].reverse();
        Some(node)
    }
}

fn convert(el: ElementRef) -> Node {
    let tag = el.value().name().to_string();
    let attrs = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut children = Vec::new();
    for child in el.children() {
        match child.value() {
            scraper::node::Node::Element(_) => {
                if let Some(e) = ElementRef::wrap(child) {
                    children.push(NodeChild::Element(convert(e)));
                }
            }
            scraper::node::Node::Text(t) => {
                children.push(NodeChild::Text(t.to_string()));
            }
            _ => {}
        }
    }
    Node { tag, attrs, children }
}

fn collect_text(node: &Node, out: &mut String) {
    for child in &node.children {
        match child {
            NodeChild::Text(t) => {
                out.push_str(t);
                out.push(' ');
            }
            NodeChild::Element(n) => collect_text(n, out),
        }
    }
}

pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
