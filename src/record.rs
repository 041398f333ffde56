use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Quantities every price table reports, known or not.
pub const STANDARD_TIERS: [u32; 4] = [1, 10, 100, 1000];

/// Category headline -> attribute name -> attribute value, in page order.
pub type TechnicalData = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub currency: Option<String>,
    /// Unit price per quantity tier, `None` when the tier price is unknown
    pub tiers: BTreeMap<u32, Option<f64>>,
}

impl PriceTable {
    /// A table with the unit price set and the other standard tiers unknown.
    pub fn with_unit_price(price: f64, currency: Option<String>) -> Self {
        let mut tiers = STANDARD_TIERS
            .iter()
            .map(|&q| (q, None))
            .collect::<BTreeMap<_, _>>();
        tiers.insert(1, Some(price));
        Self { currency, tiers }
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn set(&mut self, quantity: u32, price: Option<f64>) {
        self.tiers.insert(quantity, price);
    }

    pub fn get(&self, quantity: u32) -> Option<f64> {
        self.tiers.get(&quantity).copied().flatten()
    }

    pub fn unit_price(&self) -> Option<f64> {
        self.get(1)
    }

    /// Known tiers in increasing quantity order.
    pub fn known(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.tiers.iter().filter_map(|(&q, p)| p.map(|p| (q, p)))
    }

    /// Whether the unit price never increases with the quantity, unknown
    /// tiers are ignored.
    pub fn is_monotonic(&self) -> bool {
        let prices = self.known().map(|(_, p)| p).collect::<Vec<_>>();
        prices.windows(2).all(|w| w[1] <= w[0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub part: String,
    pub name: String,
    pub url: String,
    pub price: PriceTable,
}

impl SearchResult {
    /// Exact part number comparison, ignoring case and surrounding spaces.
    pub fn matches_part(&self, part: &str) -> bool {
        self.part.trim().to_uppercase() == part.trim().to_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub part: String,
    pub name: String,
    pub url: String,
    pub price: PriceTable,
    pub availability: Option<Availability>,
    pub datasheets: Vec<String>,
    pub data: TechnicalData,
    pub categories: Vec<String>,
}

impl ProductDetail {
    /// Overlays a detail page on the search result it was reached from.
    ///
    /// The search price is kept when the detail page had none, and its
    /// currency fills in a detail price table that lacks one.
    pub fn merge(result: SearchResult, detail: ProductDetail) -> Self {
        let price = if detail.price.is_empty() {
            result.price
        } else {
            PriceTable {
                currency: detail.price.currency.or(result.price.currency),
                ..detail.price
            }
        };
        Self { price, ..detail }
    }
}

impl From<SearchResult> for ProductDetail {
    fn from(result: SearchResult) -> Self {
        Self {
            part: result.part,
            name: result.name,
            url: result.url,
            price: result.price,
            availability: None,
            datasheets: vec![],
            data: TechnicalData::new(),
            categories: vec![],
        }
    }
}

/// Stock status as published through `schema.org/ItemAvailability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Availability {
    InStock,
    OutOfStock,
    PreOrder,
    BackOrder,
    Discontinued,
    LimitedAvailability,
    SoldOut,
    OnlineOnly,
    InStoreOnly,
    Other(String),
}

impl Availability {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InStock => "InStock",
            Self::OutOfStock => "OutOfStock",
            Self::PreOrder => "PreOrder",
            Self::BackOrder => "BackOrder",
            Self::Discontinued => "Discontinued",
            Self::LimitedAvailability => "LimitedAvailability",
            Self::SoldOut => "SoldOut",
            Self::OnlineOnly => "OnlineOnly",
            Self::InStoreOnly => "InStoreOnly",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for Availability {
    fn from(token: &str) -> Self {
        match token {
            "InStock" => Self::InStock,
            "OutOfStock" => Self::OutOfStock,
            "PreOrder" => Self::PreOrder,
            "BackOrder" => Self::BackOrder,
            "Discontinued" => Self::Discontinued,
            "LimitedAvailability" => Self::LimitedAvailability,
            "SoldOut" => Self::SoldOut,
            "OnlineOnly" => Self::OnlineOnly,
            "InStoreOnly" => Self::InStoreOnly,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Availability {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl From<Availability> for String {
    fn from(availability: Availability) -> Self {
        availability.as_str().to_string()
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
