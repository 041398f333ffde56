use std::fs;
use std::path::Path;

use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ParseError, Result};
use crate::parse;
use crate::record::{ProductDetail, SearchResult};

/// Blocking client for the catalog pages.
///
/// Holds nothing but the configuration and the HTTP connection pool, every
/// call is an independent request/parse cycle.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    config: ClientConfig,
    http: Client,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.accept_language.is_empty() {
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&config.accept_language)?);
        }

        let mut builder = ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .default_headers(headers);
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua);
        }
        let http = builder.build().map_err(Error::Client)?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search URL for a keyword: whitespace collapsed, lower-cased and
    /// percent-encoded.
    pub fn search_url(&self, keyword: &str) -> Result<String> {
        let keyword = keyword
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if keyword.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let base = &self.config.search_url;
        let separator = match parse_url(base)?.query() {
            None => "?",
            Some(query) if query.is_empty() || query.ends_with('&') => "",
            Some(_) => "&",
        };
        Ok(format!(
            "{base}{separator}q={}",
            urlencoding::encode(&keyword)
        ))
    }

    pub fn search_results(&self, keyword: &str) -> Result<Vec<SearchResult>> {
        let url = self.search_url(keyword)?;
        let page = self.download_text(&url)?;
        let results = parse::search_results(&page, &parse_url(&url)?, self.config.number_format)?;
        log::debug!("Found {} result(s) for {keyword:?}", results.len());
        Ok(results)
    }

    pub fn part_detail(&self, detail_url: &str) -> Result<ProductDetail> {
        let page = self.download_text(detail_url)?;
        let detail =
            parse::product_detail(&page, &parse_url(detail_url)?, self.config.number_format)?;
        Ok(detail)
    }

    /// Writes the resource at `url` to `destination`, replacing any
    /// existing file.
    pub fn fetch_file<P: AsRef<Path>>(&self, url: &str, destination: P) -> Result<()> {
        let destination = destination.as_ref();
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|source| request_error(url, source))?;
        fs::write(destination, &bytes).map_err(|source| Error::Io {
            path: destination.to_path_buf(),
            source,
        })?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), destination.display());
        Ok(())
    }

    /// Searches `part` and fetches the detail page of the exact match.
    pub fn search_part(&self, part: &str) -> Result<Option<ProductDetail>> {
        let Some(result) = self
            .search_results(part)?
            .into_iter()
            .find(|r| r.matches_part(part))
        else {
            log::debug!("No exact match for {part:?}");
            return Ok(None);
        };

        let detail = self.part_detail(&result.url)?;
        Ok(Some(ProductDetail::merge(result, detail)))
    }

    fn get(&self, url: &str) -> Result<Response> {
        log::debug!("GET {url}");
        self.http
            .get(url)
            .send()
            .and_then(Response::error_for_status)
            .map_err(|source| request_error(url, source))
    }

    fn download_text(&self, url: &str) -> Result<String> {
        self.get(url)?
            .text()
            .map_err(|source| request_error(url, source))
    }
}

fn request_error(url: &str, source: reqwest::Error) -> Error {
    Error::Request {
        url: url.to_string(),
        source,
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| {
        ParseError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_normalizes_keyword() {
        let client = CatalogClient::new(ClientConfig::default()).unwrap();
        assert_eq!(
            client.search_url("  74HC   00 ").unwrap(),
            "https://www.reichelt.com/index.html?ACTION=446&LA=0&nbc=1&q=74hc%2000"
        );
        assert_eq!(
            client.search_url("R&D").unwrap(),
            "https://www.reichelt.com/index.html?ACTION=446&LA=0&nbc=1&q=r%26d"
        );
    }

    #[test]
    fn search_url_without_query() {
        let client = |search_url: &str| {
            CatalogClient::new(ClientConfig {
                search_url: search_url.into(),
                ..Default::default()
            })
            .unwrap()
        };
        assert_eq!(
            client("https://www.reichelt.com/search").search_url("74hc").unwrap(),
            "https://www.reichelt.com/search?q=74hc"
        );
        assert_eq!(
            client("https://www.reichelt.com/search?").search_url("74hc").unwrap(),
            "https://www.reichelt.com/search?q=74hc"
        );
        assert!(matches!(
            client("not a url").search_url("74hc"),
            Err(Error::Parse(ParseError::InvalidUrl { .. }))
        ));
    }

    #[test]
    fn empty_keyword() {
        let client = CatalogClient::new(ClientConfig::default()).unwrap();
        assert!(matches!(client.search_url(" \t "), Err(Error::EmptyQuery)));
        assert!(matches!(client.search_results(""), Err(Error::EmptyQuery)));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let config = ClientConfig {
            accept_language: "en\nUS".into(),
            ..Default::default()
        };
        assert!(matches!(CatalogClient::new(config), Err(Error::Header(_))));
    }

    #[test]
    fn invalid_user_agent_is_a_client_error() {
        let config = ClientConfig {
            user_agent: Some("reichelt\n0.1".into()),
            ..Default::default()
        };
        let err = CatalogClient::new(config).unwrap_err();
        assert!(matches!(err, Error::Client(_)), "{err:?}");
        assert!(err.to_string().starts_with("Couldn't build HTTP client"));
    }
}
