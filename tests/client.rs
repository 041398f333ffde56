use std::fs;

use reichelt::{CatalogClient, ClientConfig, Error};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SEARCH: &str = include_str!("fixtures/search.html");
const SEARCH_EMPTY: &str = include_str!("fixtures/search_empty.html");
const DETAIL: &str = include_str!("fixtures/detail.html");

struct AcceptLanguage(&'static str);

impl Match for AcceptLanguage {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("accept-language")
            .map_or(false, |v| v == self.0)
    }
}

/// Blocking clients can't be built nor dropped on the async runtime.
async fn with_client<T, F>(server: &MockServer, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(CatalogClient) -> T + Send + 'static,
{
    let config = ClientConfig {
        search_url: format!("{}/index.html?ACTION=446&LA=0&nbc=1", server.uri()),
        ..Default::default()
    };
    tokio::task::spawn_blocking(move || f(CatalogClient::new(config).unwrap()))
        .await
        .unwrap()
}

/// Search and detail pages served by `server`, links rewritten to point at it.
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .and(query_param("q", "74hc 00"))
        .and(AcceptLanguage("en-US;q=0.7,en;q=0.3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SEARCH, "text/html"))
        .mount(server)
        .await;

    let detail = DETAIL
        .replace("https://www.reichelt.com", &server.uri())
        .replace("https://www.ti.com", &server.uri());
    Mock::given(method("GET"))
        .and(path(
            "/gb/en/quad-2-input-nand-gate-2-6-v-dil-14-74hc-00-p3118.html",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(detail, "text/html"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/lit/ds/symlink/sn74hc00.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.4 sn74hc00".to_vec(), "application/pdf"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_results_from_server() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let results = with_client(&server, move |client| client.search_results("74HC 00"))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].part, "74HC 00");
    assert!(results[0].url.starts_with(&server.uri()));
}

#[tokio::test]
async fn no_results_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SEARCH_EMPTY, "text/html"))
        .mount(&server)
        .await;

    let results = with_client(&server, move |client| client.search_results("does not exist"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_part_exact_match() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let detail = with_client(&server, move |client| client.search_part("74hc 00"))
        .await
        .unwrap()
        .expect("part should be found");

    assert!(detail.part.eq_ignore_ascii_case("74HC 00"));
    assert_eq!(detail.categories, vec!["Semiconductors", "Logic ICs", "74HC"]);
    assert_eq!(detail.data["General"]["Package"], "DIP-14");
    assert_eq!(detail.datasheets.len(), 2);
    for url in &detail.datasheets {
        assert!(url.starts_with(&server.uri()), "{url} is not absolute");
    }
}

#[tokio::test]
async fn search_part_without_exact_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .and(query_param("q", "74hc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SEARCH, "text/html"))
        .mount(&server)
        .await;

    let found = with_client(&server, move |client| client.search_part("74HC"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn detail_failure_fails_search_part() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SEARCH, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/gb/en/quad-2-input-nand-gate-2-6-v-dil-14-74hc-00-p3118.html",
        ))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = with_client(&server, move |client| client.search_part("74HC 00"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request { .. }));
}

#[tokio::test]
async fn datasheet_download_round_trip() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("74HC 00.pdf");
    fs::write(&dest, b"stale content that is longer than the datasheet").unwrap();

    let dest_c = dest.clone();
    with_client(&server, move |client| -> reichelt::Result<()> {
        let detail = client.search_part("74HC 00")?.expect("part should be found");
        client.fetch_file(&detail.datasheets[1], &dest_c)
    })
    .await
    .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), b"%PDF-1.4 sn74hc00");
}

#[tokio::test]
async fn download_into_missing_directory() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("missing").join("out.pdf");
    let url = format!("{}/lit/ds/symlink/sn74hc00.pdf", server.uri());

    let err = with_client(&server, move |client| client.fetch_file(&url, &dest))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
