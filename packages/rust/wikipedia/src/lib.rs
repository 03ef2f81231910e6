//! Wikipedia search and article retrieval over the MediaWiki Action API.
//!
//! [`WikipediaClient`] implements both [`SearchProvider`] and
//! [`FetchProvider`]. Disambiguation pages are reported as
//! [`ProviderError::Disambiguation`] carrying the page's alternatives, and
//! missing pages as [`ProviderError::PageNotFound`], so the pipeline can
//! recover from either.

mod api;
mod disambiguation;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;
use wikiresearch_shared::{
    Article, FetchProvider, ProviderError, ProviderResult, Result, SearchProvider,
    WikiResearchError, WikipediaConfig,
};

use crate::api::{PagesResponse, ParseResponse, SearchResponse};

/// Maximum number of redirects to follow per request.
const MAX_REDIRECTS: usize = 5;

/// Build the API endpoint for a language edition.
pub fn api_url_for(language: &str) -> String {
    format!("https://{}.wikipedia.org/w/api.php", language.trim())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one Wikipedia language edition.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: Client,
    api_url: Url,
}

impl WikipediaClient {
    /// Build a client for `language`, honouring the `[wikipedia]` config.
    pub fn new(config: &WikipediaConfig, language: &str) -> Result<Self> {
        let raw = config
            .api_url
            .clone()
            .unwrap_or_else(|| api_url_for(language));
        let api_url = Url::parse(&raw)
            .map_err(|e| WikiResearchError::config(format!("invalid Wikipedia API URL '{raw}': {e}")))?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WikiResearchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_url })
    }

    /// The endpoint this client talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Issue a GET against the API and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> ProviderResult<T> {
        debug!(api = %self.api_url, ?params, "wikipedia request");

        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("{}: {e}", self.api_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api(format!("{}: HTTP {status}", self.api_url)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Api(format!("invalid API response: {e}")))
    }

    /// Lead-section plain-text summary of a page.
    async fn summary(&self, title: &str) -> ProviderResult<Option<String>> {
        let resp: PagesResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        if let Some(err) = resp.error {
            return Err(err.into_provider_error(title));
        }

        Ok(resp
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|p| p.extract)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// Alternatives listed on a disambiguation page.
    async fn disambiguation_options(&self, title: &str) -> ProviderResult<Vec<String>> {
        let resp: ParseResponse = self
            .get_json(&[
                ("action", "parse"),
                ("prop", "text"),
                ("redirects", "1"),
                ("page", title),
            ])
            .await?;

        if let Some(err) = resp.error {
            return Err(err.into_provider_error(title));
        }

        let html = resp.parse.map(|p| p.text).unwrap_or_default();
        Ok(disambiguation::extract_options(&html))
    }
}

// ---------------------------------------------------------------------------
// Provider impls
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl SearchProvider for WikipediaClient {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    #[instrument(skip(self), fields(api = %self.api_url))]
    async fn search(&self, term: &str, limit: usize) -> ProviderResult<Vec<String>> {
        let limit = limit.to_string();
        let resp: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srprop", ""),
                ("srlimit", limit.as_str()),
                ("srsearch", term),
            ])
            .await?;

        if let Some(err) = resp.error {
            return Err(ProviderError::Api(format!("{}: {}", err.code, err.info)));
        }

        let titles: Vec<String> = resp
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default();

        info!(hits = titles.len(), "wikipedia search complete");
        Ok(titles)
    }
}

#[async_trait::async_trait]
impl FetchProvider for WikipediaClient {
    #[instrument(skip(self), fields(api = %self.api_url))]
    async fn fetch(&self, title: &str) -> ProviderResult<Article> {
        let resp: PagesResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "info|pageprops|extracts"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        if let Some(err) = resp.error {
            return Err(err.into_provider_error(title));
        }

        let page = resp
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| ProviderError::PageNotFound(title.to_string()))?;

        if page.missing || page.invalid {
            return Err(ProviderError::PageNotFound(title.to_string()));
        }

        if page.is_disambiguation() {
            let options = self.disambiguation_options(&page.title).await?;
            debug!(resolved = %page.title, options = options.len(), "disambiguation page");
            return Err(ProviderError::Disambiguation {
                title: page.title,
                options,
            });
        }

        let url = page
            .fullurl
            .clone()
            .ok_or_else(|| ProviderError::Api(format!("no URL returned for \"{}\"", page.title)))?;
        let summary = match self.summary(&page.title).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(title = %page.title, error = %e, "summary unavailable, keeping full text");
                None
            }
        };

        Ok(Article {
            content: page.extract.unwrap_or_default(),
            title: page.title,
            url,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WikipediaClient {
        let config = WikipediaConfig {
            api_url: Some(format!("{}/w/api.php", server.uri())),
            ..Default::default()
        };
        WikipediaClient::new(&config, "en").expect("client")
    }

    #[test]
    fn api_url_uses_language_subdomain() {
        assert_eq!(api_url_for("de"), "https://de.wikipedia.org/w/api.php");
        let client = WikipediaClient::new(&WikipediaConfig::default(), "fr").unwrap();
        assert_eq!(client.api_url().host_str(), Some("fr.wikipedia.org"));
    }

    #[test]
    fn invalid_api_url_is_config_error() {
        let config = WikipediaConfig {
            api_url: Some("not a url".into()),
            ..Default::default()
        };
        let err = WikipediaClient::new(&config, "en").unwrap_err();
        assert!(err.to_string().contains("invalid Wikipedia API URL"));
    }

    #[tokio::test]
    async fn search_returns_titles_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "Quantum computing"))
            .and(query_param("srlimit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"search":[
                    {"ns":0,"title":"Quantum computing"},
                    {"ns":0,"title":"Qubit"},
                    {"ns":0,"title":"Quantum entanglement"}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let titles = client.search("Quantum computing", 3).await.unwrap();
        assert_eq!(titles, vec!["Quantum computing", "Qubit", "Quantum entanglement"]);
    }

    #[tokio::test]
    async fn search_with_no_hits_is_empty_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"batchcomplete":true,"query":{"search":[]}}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.search("asdkjhqwe123", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_http_error_is_api_fault() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.search("Qubit", 3).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn fetch_builds_article_with_summary() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("prop", "info|pageprops|extracts"))
            .and(query_param("titles", "Qubit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"pages":[{
                    "pageid":25284,"ns":0,"title":"Qubit",
                    "fullurl":"https://en.wikipedia.org/wiki/Qubit",
                    "extract":"In quantum computing, a qubit is a basic unit of quantum information.\n\n== General ==\nMore text."}]}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .and(query_param("exintro", "1"))
            .and(query_param("titles", "Qubit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"pages":[{
                    "pageid":25284,"ns":0,"title":"Qubit",
                    "extract":"In quantum computing, a qubit is a basic unit of quantum information."}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let article = client.fetch("Qubit").await.unwrap();
        assert_eq!(article.title, "Qubit");
        assert_eq!(article.url, "https://en.wikipedia.org/wiki/Qubit");
        assert!(article.content.contains("== General =="));
        assert_eq!(
            article.summary.as_deref(),
            Some("In quantum computing, a qubit is a basic unit of quantum information.")
        );
    }

    #[tokio::test]
    async fn fetch_keeps_article_when_summary_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("prop", "info|pageprops|extracts"))
            .and(query_param("titles", "Qubit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"pages":[{
                    "pageid":25284,"ns":0,"title":"Qubit",
                    "fullurl":"https://en.wikipedia.org/wiki/Qubit",
                    "extract":"A qubit is a two-state quantum system."}]}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("exintro", "1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let article = client.fetch("Qubit").await.unwrap();
        assert_eq!(article.content, "A qubit is a two-state quantum system.");
        assert_eq!(article.url, "https://en.wikipedia.org/wiki/Qubit");
        assert!(article.summary.is_none());
    }

    #[tokio::test]
    async fn fetch_missing_page_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("titles", "Asdkjhqwe123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"pages":[{"ns":0,"title":"Asdkjhqwe123","missing":true}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch("Asdkjhqwe123").await.unwrap_err();
        assert_eq!(err, ProviderError::PageNotFound("Asdkjhqwe123".into()));
    }

    #[tokio::test]
    async fn fetch_disambiguation_reports_options() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("action", "query"))
            .and(query_param("titles", "Mercury"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"batchcomplete":true,"query":{"pages":[{
                    "pageid":19694,"ns":0,"title":"Mercury",
                    "pageprops":{"disambiguation":""},
                    "fullurl":"https://en.wikipedia.org/wiki/Mercury"}]}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Mercury"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"parse":{"title":"Mercury","pageid":19694,"text":"<div class=\"mw-parser-output\"><ul><li><a href=\"/wiki/Mercury_(planet)\" title=\"Mercury (planet)\">Mercury (planet)</a></li><li><a href=\"/wiki/Mercury_(element)\" title=\"Mercury (element)\">Mercury (element)</a></li></ul></div>"}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.fetch("Mercury").await.unwrap_err() {
            ProviderError::Disambiguation { title, options } => {
                assert_eq!(title, "Mercury");
                assert_eq!(options, vec!["Mercury (planet)", "Mercury (element)"]);
            }
            other => panic!("expected Disambiguation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_api_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"error":{"code":"ratelimited","info":"You've exceeded your rate limit."}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch("Qubit").await.unwrap_err();
        assert!(matches!(err, ProviderError::Api(ref m) if m.starts_with("ratelimited")));
    }
}
