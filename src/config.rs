use std::io;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Search endpoint, the query is appended as a `q` parameter
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Sent with every request, an empty value disables the header
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub number_format: NumberFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            accept_language: default_accept_language(),
            user_agent: None,
            number_format: NumberFormat::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_reader<R: io::Read>(rdr: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(rdr)?)
    }
}

fn default_search_url() -> String {
    String::from("https://www.reichelt.com/index.html?ACTION=446&LA=0&nbc=1")
}

fn default_accept_language() -> String {
    String::from("en-US;q=0.7,en;q=0.3")
}

/// Decimal notation of prices printed as text.
///
/// Prices read from item metadata always use a decimal point, this only
/// matters for display texts and the legacy result cards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum NumberFormat {
    /// `1,234.56`
    #[default]
    Point,
    /// `1.234,56`
    Comma,
}

impl NumberFormat {
    /// Parses a price text such as `"0,29 €"` or `"1.234,50"`.
    ///
    /// The text must hold a single number; group separators are only accepted
    /// between blocks of three digits.
    pub fn parse_price(&self, text: &str) -> Option<f64> {
        let (group, decimal) = match self {
            Self::Point => (',', '.'),
            Self::Comma => ('.', ','),
        };
        let mut tokens = text
            .split(|c: char| !(c.is_ascii_digit() || c == group || c == decimal || c == '-'))
            .map(|t| t.trim_end_matches(|c| c == group || c == decimal))
            .filter(|t| t.chars().any(|c| c.is_ascii_digit()));
        let token = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }

        let (integer, fraction) = match token.split_once(decimal) {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (token, None),
        };
        let (sign, integer) = match integer.strip_prefix('-') {
            Some(integer) => ("-", integer),
            None => ("", integer),
        };

        let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        let groups = integer.split(group).collect::<Vec<_>>();
        let grouped = match groups.split_first() {
            Some((head, [])) => digits(head),
            Some((head, rest)) => {
                digits(head) && head.len() <= 3 && rest.iter().all(|g| g.len() == 3 && digits(g))
            }
            None => false,
        };
        if !grouped || fraction.map_or(false, |f| !digits(f)) {
            return None;
        }

        let mut number = format!("{sign}{}", groups.concat());
        if let Some(fraction) = fraction {
            number.push('.');
            number.push_str(fraction);
        }
        number.parse().ok()
    }
}
