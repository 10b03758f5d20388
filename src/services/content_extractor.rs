//! Web content extraction for Leto.
//!
//! Fetches a page with `reqwest`, parses it with `scraper`, and pulls out a
//! title plus readable body text using one of two strategies: a heuristic
//! "largest article subsection" pick, or explicit CSS-selector paths.

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, warn};

use crate::types::errors::{ExtractionError, ScrapeError};
use crate::types::extraction::{ExtractedContent, ExtractionMethod, ExtractionRequest};
use crate::types::reading::{ReadingSource, ReadingState};

const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; Leto/", env!("CARGO_PKG_VERSION"), ")");

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: [&str; 5] = ["head", "script", "style", "noscript", "template"];

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: [&str; 32] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Containers ranked by the article heuristic.
const ARTICLE_CANDIDATES: &str =
    "article, main, [role=\"main\"], section, div, p, blockquote, pre, td";

/// The closed set of strategies for turning a document into body text.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionStrategy {
    LargestArticleSubsection,
    PathSelect { path: String, select_all: bool },
}

impl ExtractionStrategy {
    pub fn from_request(request: &ExtractionRequest) -> Result<Self, ScrapeError> {
        match request.method {
            ExtractionMethod::LargestArticleSubsection => {
                Ok(ExtractionStrategy::LargestArticleSubsection)
            }
            ExtractionMethod::PathSelect => {
                let options = &request.path_select_options;
                if options.path.trim().is_empty() {
                    return Err(ScrapeError::MissingPath);
                }
                Ok(ExtractionStrategy::PathSelect {
                    path: options.path.clone(),
                    select_all: options.select_all,
                })
            }
        }
    }

    pub fn extract(&self, doc: &Html) -> Result<String, ExtractionError> {
        match self {
            ExtractionStrategy::LargestArticleSubsection => {
                ContentExtractor::extract_largest_article_subsection(doc)
            }
            ExtractionStrategy::PathSelect { path, select_all } => {
                ContentExtractor::extract_by_path(doc, path, *select_all)
            }
        }
    }
}

/// Loads web pages and extracts readable text from them.
pub struct ContentExtractor {
    client: reqwest::Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractionError::Fetch(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and parses the response into a document.
    ///
    /// URLs without a scheme are fetched over https.
    pub async fn load(&self, url: &str) -> Result<Html, ExtractionError> {
        let url = Self::normalize_url(url)?;
        debug!(url = %url, "Loading page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Fetch(format!("HTTP {} for {}", status, url)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        if let Some(content_type) = content_type.as_deref() {
            if !Self::is_markup_content_type(content_type) {
                return Err(ExtractionError::Parse(format!(
                    "unsupported content type: {}",
                    content_type
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::Fetch(format!("Failed to read response body: {}", e)))?;

        Self::parse_html(&body)
    }

    /// Parses markup into a document. Fails only when there is nothing to parse.
    pub fn parse_html(html: &str) -> Result<Html, ExtractionError> {
        if html.trim().is_empty() {
            return Err(ExtractionError::Parse("document is empty".to_string()));
        }
        let doc = Html::parse_document(html);
        if !doc.errors.is_empty() {
            debug!(errors = doc.errors.len(), "Recovered from markup errors");
        }
        Ok(doc)
    }

    /// Returns the document's `<title>`, or an empty string.
    pub fn extract_title(doc: &Html) -> String {
        let Ok(selector) = Selector::parse("title") else {
            return String::new();
        };
        doc.select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// Picks the candidate container holding the most text of its own.
    ///
    /// A container is scored on its direct text, its inline children and its
    /// direct `<p>` children, so a wrapper does not outrank the block it wraps
    /// just by containing it. Ties go to the candidate that comes first in
    /// document order. A page with no scored container falls back to the
    /// whole document text.
    pub fn extract_largest_article_subsection(doc: &Html) -> Result<String, ExtractionError> {
        let selector = Selector::parse(ARTICLE_CANDIDATES)
            .map_err(|e| ExtractionError::InvalidPath(format!("{}: {:?}", ARTICLE_CANDIDATES, e)))?;

        let mut best: Option<(usize, ElementRef<'_>)> = None;
        for candidate in doc.select(&selector) {
            let score = own_text_len(candidate);
            if score > best.map_or(0, |(top, _)| top) {
                best = Some((score, candidate));
            }
        }

        let text = match best {
            Some((score, element)) => {
                debug!(
                    element = element.value().name(),
                    score, "Selected largest article subsection"
                );
                inner_text(element)
            }
            None => document_text(doc),
        };

        if text.is_empty() {
            return Err(ExtractionError::NoContentFound);
        }
        Ok(text)
    }

    /// Selects nodes by CSS selector.
    ///
    /// With `select_all` false the first match in document order wins; with
    /// `select_all` true every match is joined with a blank line between sections.
    pub fn extract_by_path(
        doc: &Html,
        path: &str,
        select_all: bool,
    ) -> Result<String, ExtractionError> {
        let selector = Selector::parse(path)
            .map_err(|e| ExtractionError::InvalidPath(format!("{}: {:?}", path, e)))?;

        let text = if select_all {
            let sections: Vec<String> = doc.select(&selector).map(inner_text).collect();
            if sections.is_empty() {
                return Err(ExtractionError::PathNotFound(path.to_string()));
            }
            debug!(path, matches = sections.len(), "Selected all path matches");
            sections
                .into_iter()
                .reduce(|acc, section| join_sections(&acc, &section))
                .unwrap_or_default()
        } else {
            let first = doc
                .select(&selector)
                .next()
                .ok_or_else(|| ExtractionError::PathNotFound(path.to_string()))?;
            inner_text(first)
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::NoContentFound);
        }
        Ok(text)
    }

    /// Loads the requested page and extracts its title and body text.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractedContent, ScrapeError> {
        let strategy = ExtractionStrategy::from_request(request)?;
        let doc = self.load(&request.url).await?;
        let title = Self::extract_title(&doc);
        let text = strategy.extract(&doc)?;

        info!(
            url = %request.url,
            method = request.method.as_str(),
            chars = text.len(),
            "Extracted page content"
        );

        Ok(ExtractedContent { title, text })
    }

    fn normalize_url(url: &str) -> Result<Url, ExtractionError> {
        let url = url.trim();
        let with_scheme = if url.contains("://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };

        let parsed = Url::parse(&with_scheme)
            .map_err(|e| ExtractionError::Fetch(format!("invalid url '{}': {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ExtractionError::Fetch(format!(
                "unsupported url scheme: {}",
                scheme
            ))),
        }
    }

    fn is_markup_content_type(content_type: &str) -> bool {
        content_type.contains("html") || content_type.contains("xml") || content_type.starts_with("text/")
    }
}

impl ReadingState {
    /// Builds a state from a web page.
    ///
    /// The state is tagged `WebsiteExtract` and described as "Extracted from <url>".
    /// A page without a title keeps the blank-state title; an empty page
    /// title is never assigned.
    pub async fn scrape_from_web(
        extractor: &ContentExtractor,
        request: &ExtractionRequest,
    ) -> Result<ReadingState, ScrapeError> {
        let content = extractor.extract(request).await?;

        let mut state = ReadingState::blank(
            ReadingSource::WebsiteExtract,
            Some(format!("Extracted from {}", request.url)),
        );
        if content.title.is_empty() {
            warn!(url = %request.url, "Page has no title");
        } else {
            state.set_title(content.title);
        }
        state.set_text(content.text);

        Ok(state)
    }
}

/// Visible text of an element, one line per block.
///
/// Hidden elements are skipped, whitespace inside a line is collapsed, and
/// blank lines are dropped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw, false);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Visible text of a whole document.
pub fn document_text(doc: &Html) -> String {
    inner_text(doc.root_element())
}

/// Joins two sections with a blank line between them.
pub fn join_sections(first: &str, second: &str) -> String {
    format!("{}\n\n{}", first, second)
}

fn collect_text(element: ElementRef<'_>, out: &mut String, preformatted: bool) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) if preformatted => out.push_str(text),
            Node::Text(text) => out.push_str(&text.replace(|c: char| c == '\n' || c == '\r', " ")),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out, preformatted || name == "pre");
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Length of the text a container holds itself: direct text, inline
/// children and direct paragraphs. Other blocks are candidates of their own.
fn own_text_len(element: ElementRef<'_>) -> usize {
    element
        .children()
        .map(|child| match child.value() {
            Node::Text(text) => collapse_whitespace(text).chars().count(),
            Node::Element(el) => {
                let name = el.name();
                let counted = name == "p" || !BLOCK_ELEMENTS.contains(&name);
                match ElementRef::wrap(child) {
                    Some(child_el) if counted && !HIDDEN_ELEMENTS.contains(&name) => {
                        inner_text(child_el).chars().count()
                    }
                    _ => 0,
                }
            }
            _ => 0,
        })
        .sum()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
