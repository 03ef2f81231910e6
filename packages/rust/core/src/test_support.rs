//! In-process provider stubs that record every call.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use wikiresearch_shared::{
    Article, Document, FetchProvider, GenerationProvider, GenerationRequest, ProviderError,
    ProviderResult, SearchProvider,
};

pub(crate) fn article(title: &str, content: &str) -> Article {
    Article {
        title: title.into(),
        content: content.into(),
        url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        summary: Some(format!("{title} in brief.")),
    }
}

pub(crate) fn document(title: &str, body: &str) -> Document {
    Document {
        title: title.into(),
        body: body.into(),
        url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        summary: format!("{title} in brief."),
    }
}

/// Replays scripted responses in order; returns no hits once exhausted.
pub(crate) struct StubSearch {
    script: Mutex<VecDeque<ProviderResult<Vec<String>>>>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl StubSearch {
    pub(crate) fn scripted(script: Vec<ProviderResult<Vec<String>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for StubSearch {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, term: &str, limit: usize) -> ProviderResult<Vec<String>> {
        self.calls.lock().unwrap().push((term.to_string(), limit));
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

/// Answers from a title → response map; unknown titles are not found.
pub(crate) struct StubFetch {
    pages: HashMap<String, ProviderResult<Article>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetch {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with(mut self, title: &str, response: ProviderResult<Article>) -> Self {
        self.pages.insert(title.to_string(), response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FetchProvider for StubFetch {
    async fn fetch(&self, title: &str) -> ProviderResult<Article> {
        self.calls.lock().unwrap().push(title.to_string());
        self.pages
            .get(title)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::PageNotFound(title.to_string())))
    }
}

/// Returns a fixed reply (or fault) and records each request.
pub(crate) struct StubGenerator {
    reply: ProviderResult<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerationProvider for StubGenerator {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}
