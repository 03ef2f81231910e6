//! MediaWiki Action API response shapes (`format=json&formatversion=2`).

use std::collections::HashMap;

use serde::Deserialize;
use wikiresearch_shared::ProviderError;

/// `{"error": {"code": ..., "info": ...}}` envelope returned on API errors.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl ApiErrorBody {
    /// Map an API error onto the provider taxonomy.
    pub(crate) fn into_provider_error(self, title: &str) -> ProviderError {
        match self.code.as_str() {
            "missingtitle" | "invalidtitle" => ProviderError::PageNotFound(title.to_string()),
            _ => ProviderError::Api(format!("{}: {}", self.code, self.info)),
        }
    }
}

// ---------------------------------------------------------------------------
// list=search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub query: Option<SearchQuery>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub title: String,
}

// ---------------------------------------------------------------------------
// prop=info|pageprops|extracts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PagesResponse {
    pub query: Option<PagesQuery>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagesQuery {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub fullurl: Option<String>,
    #[serde(default)]
    pub pageprops: HashMap<String, serde_json::Value>,
}

impl Page {
    pub(crate) fn is_disambiguation(&self) -> bool {
        self.pageprops.contains_key("disambiguation")
    }
}

// ---------------------------------------------------------------------------
// action=parse
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ParseResponse {
    pub parse: Option<ParsedPage>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParsedPage {
    #[allow(dead_code)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_flags_deserialize() {
        let json = r#"{"query":{"pages":[
            {"ns":0,"title":"Nope","missing":true},
            {"pageid":1,"ns":0,"title":"Mercury","pageprops":{"disambiguation":""},"fullurl":"https://en.wikipedia.org/wiki/Mercury"}
        ]}}"#;
        let resp: PagesResponse = serde_json::from_str(json).expect("parse");
        let pages = resp.query.expect("query").pages;
        assert!(pages[0].missing);
        assert!(!pages[0].is_disambiguation());
        assert!(pages[1].is_disambiguation());
        assert!(pages[1].extract.is_none());
    }

    #[test]
    fn missing_title_maps_to_not_found() {
        let body = ApiErrorBody {
            code: "missingtitle".into(),
            info: "The page you specified doesn't exist.".into(),
        };
        assert_eq!(
            body.into_provider_error("Nope"),
            ProviderError::PageNotFound("Nope".into())
        );
    }
}
