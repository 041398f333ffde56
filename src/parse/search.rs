use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};
use url::Url;

use super::{meta_content, resolve_url, trimmed_text};
use crate::config::NumberFormat;
use crate::error::ParseError;
use crate::record::{PriceTable, SearchResult};

const CARD: &str = "search card";

/// Markup shape of a result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// Part data published as `itemprop` metadata
    Structured,
    /// Part data only available as displayed text
    Legacy,
}

pub fn probe_layout(card: &Node) -> CardLayout {
    let structured = card
        .find(Name("meta").and(Attr("itemprop", "productID")))
        .next()
        .is_some();
    if structured {
        CardLayout::Structured
    } else {
        CardLayout::Legacy
    }
}

/// Extracts every result card of a search page, in page order.
pub fn search_results(
    page: &str,
    page_url: &Url,
    format: NumberFormat,
) -> Result<Vec<SearchResult>, ParseError> {
    let document = Document::from(page);

    document
        .find(Name("div").and(Class("al_gallery_article")))
        .map(|card| search_card(&card, page_url, format))
        .collect()
}

pub fn search_card(
    card: &Node,
    page_url: &Url,
    format: NumberFormat,
) -> Result<SearchResult, ParseError> {
    let href = card
        .find(Name("a").and(Class("al_artinfo_link")))
        .find_map(|a| a.attr("href"))
        .ok_or_else(|| ParseError::missing("detail link", CARD))?;
    let url = resolve_url(page_url, href)?;

    let (part, name, mut price) = match probe_layout(card) {
        CardLayout::Structured => structured_card(card)?,
        CardLayout::Legacy => legacy_card(card, format)?,
    };

    if !price.is_empty() {
        for (quantity, tier_price) in discount_tiers(card, format) {
            price.set(quantity, tier_price);
        }
    }

    Ok(SearchResult {
        part,
        name,
        url,
        price,
    })
}

fn structured_card(card: &Node) -> Result<(String, String, PriceTable), ParseError> {
    let part = meta_content(card, "productID")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::missing("part number", CARD))?;
    let name = meta_content(card, "name").ok_or_else(|| ParseError::missing("name", CARD))?;

    let currency = meta_content(card, "priceCurrency").map(String::from);
    let price = match meta_content(card, "price").and_then(|p| p.parse().ok()) {
        Some(unit) => PriceTable::with_unit_price(unit, currency),
        None => {
            log::debug!("No price for {part}");
            PriceTable::default()
        }
    };

    Ok((part.to_string(), name.to_string(), price))
}

fn legacy_card(
    card: &Node,
    format: NumberFormat,
) -> Result<(String, String, PriceTable), ParseError> {
    let link = card
        .find(Name("a").and(Class("al_artinfo_link")))
        .next()
        .ok_or_else(|| ParseError::missing("detail link", CARD))?;
    let part = trimmed_text(&link).ok_or_else(|| ParseError::missing("part number", CARD))?;
    let name = link
        .attr("title")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| part.clone());

    let price = card
        .find(Class("al_price"))
        .next()
        .map(|node| node.text())
        .and_then(|text| {
            format
                .parse_price(&text)
                .map(|unit| PriceTable::with_unit_price(unit, currency_from_sign(&text)))
        })
        .unwrap_or_default();

    Ok((part, name, price))
}

fn currency_from_sign(text: &str) -> Option<String> {
    let currency = if text.contains('€') {
        "EUR"
    } else if text.contains('£') {
        "GBP"
    } else if text.contains("CHF") {
        "CHF"
    } else if text.contains('$') {
        "USD"
    } else {
        return None;
    };
    Some(currency.to_string())
}

/// Quantity discounts listed under `ul.discounts`.
///
/// Items without a quantity are skipped, a quantity without a readable price
/// is reported as unknown.
pub fn discount_tiers(card: &Node, format: NumberFormat) -> Vec<(u32, Option<f64>)> {
    let Some(list) = card.find(Name("ul").and(Class("discounts"))).next() else {
        return vec![];
    };

    list.find(Name("li"))
        .filter_map(|li| {
            let quantity = li
                .find(Name("span").and(Attr("data-discquant", ())))
                .find_map(|span| span.attr("data-discquant"))?;
            let quantity = match quantity.trim().parse::<u32>() {
                Ok(q) => q,
                Err(e) => {
                    log::warn!("Skipping discount quantity {quantity:?}: {e}");
                    return None;
                }
            };
            let price = li
                .find(Name("span").and(Attr("data-discprice", ())))
                .find_map(|span| span.attr("data-discprice"))
                .and_then(|p| format.parse_price(p));
            Some((quantity, price))
        })
        .collect()
}
