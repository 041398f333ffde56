use indexmap::IndexMap;
use select::document::Document;
use select::predicate::{Attr, Class, Name, Predicate};
use url::Url;

use super::{doc_meta_content, resolve_url, trimmed_text};
use crate::config::NumberFormat;
use crate::error::ParseError;
use crate::record::{Availability, PriceTable, ProductDetail, TechnicalData};

const PAGE: &str = "detail page";

pub fn product_detail(
    page: &str,
    page_url: &Url,
    format: NumberFormat,
) -> Result<ProductDetail, ParseError> {
    let document = Document::from(page);

    let detail = ProductDetail {
        part: part_number(&document)?,
        name: product_name(&document)?,
        url: canonical_url(&document, page_url)?,
        price: detail_price(&document, format),
        availability: availability(&document),
        datasheets: datasheets(&document, page_url),
        data: technical_data(&document),
        categories: categories(&document),
    };

    log::debug!(
        "Parsed {} with {} datasheet(s) and {} data block(s)",
        detail.part,
        detail.datasheets.len(),
        detail.data.len()
    );

    Ok(detail)
}

/// `<span itemprop="sku">Art.-Nr.: <b>74HC 00</b></span>`
pub fn part_number(doc: &Document) -> Result<String, ParseError> {
    doc.find(Name("span").and(Attr("itemprop", "sku")).descendant(Name("b")))
        .find_map(|b| trimmed_text(&b))
        .ok_or_else(|| ParseError::missing("part number", PAGE))
}

pub fn product_name(doc: &Document) -> Result<String, ParseError> {
    doc.find(Name("h1").and(Attr("itemprop", "name")))
        .find_map(|h1| trimmed_text(&h1))
        .ok_or_else(|| ParseError::missing("name", PAGE))
}

/// Canonical page URL, the requested URL when the page doesn't publish one.
pub fn canonical_url(doc: &Document, page_url: &Url) -> Result<String, ParseError> {
    match doc_meta_content(doc, "url").filter(|u| !u.is_empty()) {
        Some(url) => resolve_url(page_url, url),
        None => Ok(page_url.to_string()),
    }
}

/// Last path segment of the `schema.org` availability link.
pub fn availability(doc: &Document) -> Option<Availability> {
    doc.find(Name("link").and(Attr("itemprop", "availability")))
        .find_map(|link| link.attr("href"))
        .and_then(|href| href.trim().trim_end_matches('/').rsplit('/').next())
        .filter(|token| !token.is_empty())
        .map(Availability::from)
}

/// Unit price from the item metadata, then the displayed discount prices
/// which are listed for 1, 10, 100, ... units in that order.
pub fn detail_price(doc: &Document, format: NumberFormat) -> PriceTable {
    let currency = doc_meta_content(doc, "priceCurrency").map(String::from);
    let mut price = match doc_meta_content(doc, "price").and_then(|p| p.parse().ok()) {
        Some(unit) => PriceTable::with_unit_price(unit, currency),
        None => PriceTable {
            currency,
            ..Default::default()
        },
    };

    let displayed = doc
        .find(Name("p").and(Class("productPrice")).and(Class("right")))
        .map(|p| p.text());
    for (i, text) in displayed.enumerate() {
        let Some(quantity) = u32::try_from(i).ok().and_then(|i| 10u32.checked_pow(i)) else {
            break;
        };
        match format.parse_price(&text) {
            Some(tier_price) => price.set(quantity, Some(tier_price)),
            None => log::warn!("Skipping unreadable price {:?} for {quantity} units", text.trim()),
        }
    }

    price
}

/// Links of every `div.articleDatasheet`, absolute and without duplicates.
pub fn datasheets(doc: &Document, page_url: &Url) -> Vec<String> {
    let mut urls = Vec::new();
    for href in doc
        .find(Name("div").and(Class("articleDatasheet")).descendant(Name("a")))
        .filter_map(|a| a.attr("href"))
        .filter(|href| !href.trim().is_empty())
    {
        match resolve_url(page_url, href) {
            Ok(url) if !urls.contains(&url) => urls.push(url),
            Ok(_) => (),
            Err(e) => log::warn!("Skipping datasheet: {e}"),
        }
    }
    urls
}

/// Each `ul.articleTechnicalData` block becomes a category named after its
/// headline, the `li` of its nested `ul.articleAttribute` lists alternate
/// between attribute name and value.
pub fn technical_data(doc: &Document) -> TechnicalData {
    let mut data = TechnicalData::new();

    for block in doc.find(Name("ul").and(Class("articleTechnicalData"))) {
        let Some(headline) = block
            .find(Name("li").and(Class("articleTechnicalHeadline")))
            .find_map(|li| trimmed_text(&li))
        else {
            log::warn!("Skipping technical data block without headline");
            continue;
        };

        let attributes = data.entry(headline).or_insert_with(IndexMap::new);
        for list in block.find(Name("ul").and(Class("articleAttribute"))) {
            let items = list
                .find(Name("li"))
                .map(|li| li.text().trim().to_string())
                .collect::<Vec<_>>();
            if items.len() % 2 != 0 {
                log::warn!("Ignoring unpaired attribute {:?}", items[items.len() - 1]);
            }
            for pair in items.chunks_exact(2) {
                attributes.insert(pair[0].clone(), pair[1].clone());
            }
        }
    }

    data
}

/// Breadcrumb path, outermost category first.
pub fn categories(doc: &Document) -> Vec<String> {
    doc.find(
        Name("ol")
            .and(Class("breadcrumb"))
            .descendant(Name("span").and(Attr("itemprop", "name"))),
    )
    .filter_map(|span| span.children().find_map(|c| c.as_text().map(str::trim)))
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
