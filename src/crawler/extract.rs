//! Content extraction: raw HTML into a cleaned [`PageRecord`]
//!
//! Parses the page with scraper, drops non-content subtrees (script/style and
//! a configurable selector denylist), and walks the remaining tree in reading
//! order. Block-level elements become line breaks; consecutive whitespace is
//! collapsed. Outbound links are resolved to absolute URLs and passed through
//! the scope filter before landing in the record.

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::crawler::scope::ScopeFilter;
use crate::crawler::{CrawlerConfig, PageRecord};

/// Tags whose text never counts as content
const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that terminate a text line when walking the tree
const BLOCK_TAGS: [&str; 22] = [
    "p", "div", "section", "article", "main", "li", "ul", "ol", "dl", "dd", "dt", "table", "tr",
    "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "br",
];

/// Parse raw HTML into a [`PageRecord`] for the given (normalized) URL.
///
/// Never fails: unparseable markup degrades to whatever scraper can recover,
/// and a page with no extractable text yields a record with empty text.
pub fn extract(
    html: &str,
    url: &str,
    depth: u32,
    used_fallback: bool,
    scope: &ScopeFilter,
    config: &CrawlerConfig,
) -> PageRecord {
    let document = Html::parse_document(html);

    let excluded = collect_excluded(&document, &config.exclude_selectors);
    let title = extract_title(&document).unwrap_or_else(|| url.to_string());
    let text = extract_text(&document, &excluded, &config.content_selectors);
    let links = extract_links(&document, url, scope);

    PageRecord {
        url: url.to_string(),
        title,
        text,
        links,
        depth,
        used_fallback,
        truncated: false,
    }
}

/// Node ids of every subtree matched by the exclude selectors
fn collect_excluded(document: &Html, exclude_selectors: &[String]) -> HashSet<NodeId> {
    let mut excluded = HashSet::new();

    for selector_str in exclude_selectors {
        match Selector::parse(selector_str) {
            Ok(selector) => {
                for element in document.select(&selector) {
                    excluded.insert(element.id());
                }
            }
            Err(e) => {
                warn!("Failed to parse exclude selector '{}': {}", selector_str, e);
            }
        }
    }

    excluded
}

fn extract_title(document: &Html) -> Option<String> {
    // <title> first, then the most prominent heading
    for selector_str in ["title", "h1", "h2", "h3"] {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn extract_text(document: &Html, excluded: &HashSet<NodeId>, content_selectors: &[String]) -> String {
    let mut raw = String::new();

    if content_selectors.is_empty() {
        walk(document.tree.root(), excluded, &mut raw);
    } else {
        // Restrict extraction to the configured content subtrees
        for selector_str in content_selectors {
            match Selector::parse(selector_str) {
                Ok(selector) => {
                    for element in document.select(&selector) {
                        walk(*element, excluded, &mut raw);
                    }
                }
                Err(e) => {
                    warn!("Failed to parse content selector '{}': {}", selector_str, e);
                }
            }
        }
    }

    collapse_whitespace(&raw)
}

/// Depth-first walk in document order, skipping excluded subtrees
fn walk(node: NodeRef<'_, Node>, excluded: &HashSet<NodeId>, out: &mut String) {
    if excluded.contains(&node.id()) {
        return;
    }

    let mut block = false;
    match node.value() {
        Node::Text(text) => {
            out.push_str(text);
            return;
        }
        Node::Element(element) => {
            let name = element.name();
            if NON_CONTENT_TAGS.contains(&name) {
                return;
            }
            block = BLOCK_TAGS.contains(&name);
        }
        _ => {}
    }

    for child in node.children() {
        walk(child, excluded, out);
    }

    if block {
        out.push('\n');
    }
}

/// Collapse runs of whitespace within lines and drop empty lines
fn collapse_whitespace(raw: &str) -> String {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}

/// Outbound in-scope links, absolute and normalized, in discovery order
fn extract_links(document: &Html, page_url: &str, scope: &ScopeFilter) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            warn!("Cannot resolve links against {}: {}", page_url, e);
            return Vec::new();
        }
    };
    let own = scope.normalize(page_url);

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(absolute) = base.join(href) else {
            debug!("Skipping unresolvable href '{}' on {}", href, page_url);
            continue;
        };
        let Some(normalized) = scope.normalize(absolute.as_str()) else {
            continue;
        };

        // Self-references and repeats within the page add nothing
        if Some(&normalized) == own.as_ref() || seen.contains(&normalized) {
            continue;
        }

        if scope.is_in_scope(&normalized) {
            seen.insert(normalized.clone());
            links.push(normalized);
        }
    }

    links
}
