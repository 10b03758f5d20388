//! Unit tests for the content extractor: offline HTML strategies plus
//! fetches against a local one-shot HTTP stub.

use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use leto::services::content_extractor::{ContentExtractor, ExtractionStrategy};
use leto::types::errors::{ExtractionError, ScrapeError};
use leto::types::extraction::{ExtractionMethod, ExtractionRequest};
use leto::types::reading::{ReadingSource, ReadingState, DEFAULT_NEW_TITLE};
use serde_json::json;

fn doc(html: &str) -> scraper::Html {
    ContentExtractor::parse_html(html).expect("parse failed")
}

fn extractor() -> ContentExtractor {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client build failed");
    ContentExtractor::with_client(client)
}

/// Serves a single HTTP response on a random local port and returns its URL.
async fn serve_once(status: &'static str, content_type: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/article", addr)
}

// ─── Title ───

#[test]
fn test_extract_title_collapses_whitespace() {
    let page = doc("<html><head><title>  Hello \n  World </title></head><body>x</body></html>");
    assert_eq!(ContentExtractor::extract_title(&page), "Hello World");
}

#[test]
fn test_extract_title_missing_is_empty() {
    let page = doc("<html><body><p>no title</p></body></html>");
    assert_eq!(ContentExtractor::extract_title(&page), "");
}

#[test]
fn test_parse_empty_document_fails() {
    assert!(matches!(
        ContentExtractor::parse_html("   "),
        Err(ExtractionError::Parse(_))
    ));
}

// ─── Largest article subsection ───

#[test]
fn test_largest_article_wins() {
    let short = "s".repeat(50);
    let long = "word ".repeat(100).trim_end().to_string();
    let page = doc(&format!(
        "<html><body><article><p>{}</p></article><article><p>{}</p></article></body></html>",
        short, long
    ));

    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, long);
}

#[test]
fn test_largest_article_tie_goes_to_first() {
    let page = doc(
        "<html><body><article><p>first body</p></article><article><p>other body</p></article></body></html>",
    );
    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, "first body");
}

#[test]
fn test_largest_article_is_deterministic() {
    let html = "<html><body><article><p>alpha beta</p></article><article><p>gamma delta epsilon</p></article></body></html>";
    let first = ContentExtractor::extract_largest_article_subsection(&doc(html)).unwrap();
    let second = ContentExtractor::extract_largest_article_subsection(&doc(html)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_largest_article_falls_back_to_main() {
    let page = doc(
        "<html><body><nav>menu</nav><main><h1>Heading</h1><p>Main body text.</p></main></body></html>",
    );
    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, "Heading\nMain body text.");
}

#[test]
fn test_largest_article_skips_scripts() {
    let page = doc(
        "<html><body><article><p>Visible</p><script>var hidden = 1;</script><style>p{}</style></article></body></html>",
    );
    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, "Visible");
}

fn long_and_short() -> (String, String) {
    ("word ".repeat(100).trim_end().to_string(), "s".repeat(50))
}

#[rstest]
#[case::article_against_div(
    "<html><body><article><p>{short}</p></article><div><p>{long}</p></div></body></html>"
)]
#[case::bare_paragraphs("<html><body><p>{long}</p><p>{short}</p></body></html>")]
#[case::nested_divs(
    "<html><body><div><div>{long}</div><div>{short}</div></div></body></html>"
)]
#[case::short_paragraph_first("<html><body><section><p>{short}</p></section><p>{long}</p></body></html>")]
fn test_largest_article_picks_longest_node_across_containers(#[case] template: &str) {
    let (long, short) = long_and_short();
    let html = template.replace("{long}", &long).replace("{short}", &short);

    let text = ContentExtractor::extract_largest_article_subsection(&doc(&html)).unwrap();
    assert_eq!(text, long);
}

#[test]
fn test_largest_article_keeps_every_paragraph_of_the_article() {
    let page = doc(
        "<html><body><div class=\"page\"><article><p>One.</p><p>Two.</p><p>Three.</p></article>\
         <aside><p>Related</p></aside></div></body></html>",
    );
    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, "One.\nTwo.\nThree.");
}

#[test]
fn test_largest_article_falls_back_to_document_text() {
    let page = doc("<html><body><ul><li>alpha</li><li>beta</li></ul></body></html>");
    let text = ContentExtractor::extract_largest_article_subsection(&page).unwrap();
    assert_eq!(text, "alpha\nbeta");
}

#[test]
fn test_largest_article_empty_page_has_no_content() {
    let page = doc("<html><head><title>Only a title</title></head><body></body></html>");
    assert_eq!(
        ContentExtractor::extract_largest_article_subsection(&page),
        Err(ExtractionError::NoContentFound)
    );
}

// ─── Path select ───

const LISTING: &str = "<html><body>\
    <div class=\"story\"><p>First story</p></div>\
    <div class=\"story\"><p>Second story</p></div>\
    <div class=\"empty\"></div>\
    </body></html>";

#[test]
fn test_path_select_first_match() {
    let text = ContentExtractor::extract_by_path(&doc(LISTING), "div.story", false).unwrap();
    assert_eq!(text, "First story");
}

#[test]
fn test_path_select_all_joins_sections() {
    let text = ContentExtractor::extract_by_path(&doc(LISTING), "div.story", true).unwrap();
    assert_eq!(text, "First story\n\nSecond story");
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_path_select_zero_matches_is_path_not_found(#[case] select_all: bool) {
    assert_eq!(
        ContentExtractor::extract_by_path(&doc(LISTING), "section.missing", select_all),
        Err(ExtractionError::PathNotFound("section.missing".to_string()))
    );
}

#[test]
fn test_path_select_empty_match_has_no_content() {
    assert_eq!(
        ContentExtractor::extract_by_path(&doc(LISTING), "div.empty", false),
        Err(ExtractionError::NoContentFound)
    );
}

#[rstest]
#[case("div[")]
#[case("p:nth-child(")]
#[case("##id")]
fn test_path_select_invalid_selector(#[case] path: &str) {
    assert!(matches!(
        ContentExtractor::extract_by_path(&doc(LISTING), path, false),
        Err(ExtractionError::InvalidPath(_))
    ));
}

// ─── Requests and strategies ───

#[test]
fn test_request_from_surface() {
    let request = ExtractionRequest::from_surface(&json!({
        "url": "example.com/a",
        "method": "path-select",
        "path": "div.story",
        "selectAll": true
    }))
    .unwrap();
    assert_eq!(request, ExtractionRequest::path_select("example.com/a", "div.story", true));

    let request = ExtractionRequest::from_surface(&json!({
        "url": "example.com/b",
        "method": "largest-article"
    }))
    .unwrap();
    assert_eq!(request.method, ExtractionMethod::LargestArticleSubsection);
}

#[test]
fn test_request_surface_errors() {
    assert_eq!(
        ExtractionRequest::from_surface(&json!({"url": "x", "method": "summarize"})),
        Err(ScrapeError::UnknownMethod("summarize".to_string()))
    );
    assert_eq!(
        ExtractionRequest::from_surface(&json!({"url": "x", "method": "path-select"})),
        Err(ScrapeError::MissingPath)
    );
    assert!(matches!(
        ExtractionRequest::from_surface(&json!({"method": "largest-article"})),
        Err(ScrapeError::InvalidRequest(_))
    ));
}

#[test]
fn test_strategy_requires_path() {
    let request = ExtractionRequest::path_select("example.com", "  ", false);
    assert_eq!(
        ExtractionStrategy::from_request(&request),
        Err(ScrapeError::MissingPath)
    );
}

// ─── Fetching ───

#[tokio::test]
async fn test_scrape_from_web_builds_state() {
    let body = "<html><head><title>Stub Article</title></head>\
        <body><nav>menu</nav><article><p>Body of the stub article.</p></article></body></html>"
        .to_string();
    let url = serve_once("200 OK", "text/html; charset=utf-8", body).await;

    let request = ExtractionRequest::largest_article(url.clone());
    let state = ReadingState::scrape_from_web(&extractor(), &request).await.unwrap();

    assert_eq!(state.title(), "Stub Article");
    assert_eq!(state.text(), "Body of the stub article.");
    assert_eq!(state.source(), ReadingSource::WebsiteExtract);
    let expected_description = format!("Extracted from {}", url);
    assert_eq!(state.source_description(), Some(expected_description.as_str()));
    assert_eq!(state.position(), 0);
}

#[tokio::test]
async fn test_scrape_page_without_title_keeps_blank_title() {
    let body = "<html><body><p>Untitled text</p></body></html>".to_string();
    let url = serve_once("200 OK", "text/html", body).await;

    let request = ExtractionRequest::path_select(url, "p", false);
    let state = ReadingState::scrape_from_web(&extractor(), &request).await.unwrap();
    assert_eq!(state.title(), DEFAULT_NEW_TITLE);
    assert_eq!(state.text(), "Untitled text");
}

#[tokio::test]
async fn test_load_non_success_status_is_fetch_error() {
    let url = serve_once("404 Not Found", "text/html", "<p>gone</p>".to_string()).await;
    assert!(matches!(extractor().load(&url).await, Err(ExtractionError::Fetch(_))));
}

#[tokio::test]
async fn test_load_binary_content_is_parse_error() {
    let url = serve_once("200 OK", "image/png", "PNGDATA".to_string()).await;
    assert!(matches!(extractor().load(&url).await, Err(ExtractionError::Parse(_))));
}

#[tokio::test]
async fn test_extract_propagates_path_not_found() {
    let url = serve_once("200 OK", "text/html", "<html><body><p>x</p></body></html>".to_string()).await;
    let request = ExtractionRequest::path_select(url, "table", true);
    assert_eq!(
        extractor().extract(&request).await,
        Err(ScrapeError::Extraction(ExtractionError::PathNotFound("table".to_string())))
    );
}
