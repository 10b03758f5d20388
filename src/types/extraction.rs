use std::str::FromStr;

use serde::Deserialize;

use super::errors::ScrapeError;

/// Which strategy turns a parsed page into body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    LargestArticleSubsection,
    PathSelect,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::LargestArticleSubsection => "largest-article",
            ExtractionMethod::PathSelect => "path-select",
        }
    }
}

impl FromStr for ExtractionMethod {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "largest-article" => Ok(ExtractionMethod::LargestArticleSubsection),
            "path-select" => Ok(ExtractionMethod::PathSelect),
            other => Err(ScrapeError::UnknownMethod(other.to_string())),
        }
    }
}

/// Options for path-based selection. `path` is a CSS selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSelectOptions {
    pub path: String,
    pub select_all: bool,
}

/// A request to turn the page at `url` into a reading state.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub url: String,
    pub method: ExtractionMethod,
    pub path_select_options: PathSelectOptions,
}

impl ExtractionRequest {
    pub fn largest_article(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: ExtractionMethod::LargestArticleSubsection,
            path_select_options: PathSelectOptions::default(),
        }
    }

    pub fn path_select(url: impl Into<String>, path: impl Into<String>, select_all: bool) -> Self {
        Self {
            url: url.into(),
            method: ExtractionMethod::PathSelect,
            path_select_options: PathSelectOptions {
                path: path.into(),
                select_all,
            },
        }
    }

    /// Builds a request from the host-facing shape
    /// `{ url, method: "largest-article" | "path-select", path?, selectAll? }`.
    pub fn from_surface(value: &serde_json::Value) -> Result<Self, ScrapeError> {
        let surface: ExtractionRequestSurface = serde_json::from_value(value.clone())
            .map_err(|e| ScrapeError::InvalidRequest(e.to_string()))?;
        let method: ExtractionMethod = surface.method.parse()?;

        if method == ExtractionMethod::PathSelect
            && surface.path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(ScrapeError::MissingPath);
        }

        Ok(Self {
            url: surface.url,
            method,
            path_select_options: PathSelectOptions {
                path: surface.path.unwrap_or_default(),
                select_all: surface.select_all,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequestSurface {
    url: String,
    method: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    select_all: bool,
}

/// Title and body text pulled out of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub text: String,
}
