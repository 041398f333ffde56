mod client;
mod config;
mod error;
pub mod parse;
mod record;

pub use client::CatalogClient;
pub use config::{ClientConfig, NumberFormat};
pub use error::{Error, ParseError, Result};
pub use record::{
    Availability, PriceTable, ProductDetail, SearchResult, TechnicalData, STANDARD_TIERS,
};
