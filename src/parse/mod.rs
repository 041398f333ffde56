//! Extraction rules for the catalog pages.
//!
//! Each rule is a small function over a parsed [`Document`] or one of its
//! [`Node`]s, so a markup change on the site only touches the matching rule.

mod detail;
mod search;

pub use detail::{
    availability, canonical_url, categories, datasheets, detail_price, part_number,
    product_detail, product_name, technical_data,
};
pub use search::{discount_tiers, probe_layout, search_card, search_results, CardLayout};

use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Name, Predicate};
use url::Url;

use crate::error::ParseError;

/// `content` of the first `<meta itemprop=...>` below `node`.
fn meta_content<'a>(node: &Node<'a>, itemprop: &str) -> Option<&'a str> {
    node.find(Name("meta").and(Attr("itemprop", itemprop)))
        .find_map(|meta| meta.attr("content"))
        .map(str::trim)
}

/// Same as [`meta_content`] over the whole document.
fn doc_meta_content<'a>(doc: &'a Document, itemprop: &str) -> Option<&'a str> {
    doc.find(Name("meta").and(Attr("itemprop", itemprop)))
        .find_map(|meta| meta.attr("content"))
        .map(str::trim)
}

/// Trimmed text content, `None` when blank.
fn trimmed_text(node: &Node) -> Option<String> {
    let text = node.text();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Resolves an `href` found in a page against the page URL.
pub fn resolve_url(page_url: &Url, href: &str) -> Result<String, ParseError> {
    page_url
        .join(href.trim())
        .map(String::from)
        .map_err(|e| ParseError::InvalidUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })
}
