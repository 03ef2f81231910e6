//! End-to-end research pipeline: query → search → fetch → synthesize → answer.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument};

use wikiresearch_llm::OpenAiClient;
use wikiresearch_shared::{
    AppConfig, FetchProvider, GenerationProvider, ResearchSettings, ResearchState, Result,
    SearchProvider,
};
use wikiresearch_wikipedia::WikipediaClient;

use crate::fetch::FetchStage;
use crate::search::SearchStage;
use crate::stage::Stage;
use crate::synthesis::{SynthesisOptions, SynthesisStage};

/// Prefix of the answer when a stage fails outright.
pub const RESEARCH_FAILED_PREFIX: &str = "An error occurred during research: ";

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage starts, with its human-readable label.
    fn phase(&self, label: &str);
    /// Called with the final state, whatever the outcome.
    fn done(&self, state: &ResearchState);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _label: &str) {}
    fn done(&self, _state: &ResearchState) {}
}

/// The fixed search → fetch → synthesize sequence over one [`ResearchState`].
///
/// A pipeline is built once and reused across queries; each call to
/// [`research`](Self::research) starts from a fresh state.
pub struct ResearchPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl ResearchPipeline {
    /// Wire the three standard stages over the given providers.
    pub fn new(
        settings: &ResearchSettings,
        search: Arc<dyn SearchProvider>,
        fetch: Arc<dyn FetchProvider>,
        generator: Arc<dyn GenerationProvider>,
        options: SynthesisOptions,
    ) -> Self {
        Self::with_stages(vec![
            Box::new(SearchStage::new(search, settings.max_search_results)),
            Box::new(FetchStage::new(fetch, settings.max_content_length)),
            Box::new(SynthesisStage::new(generator, options)),
        ])
    }

    /// Run an arbitrary ordered list of stages.
    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Build the production pipeline: Wikipedia for search and fetch, the
    /// configured chat-completions endpoint for synthesis.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.research.validate()?;

        let wiki = Arc::new(WikipediaClient::new(
            &config.wikipedia,
            &config.research.language,
        )?);
        let generator = Arc::new(OpenAiClient::from_config(&config.llm)?);

        info!(
            api = %wiki.api_url(),
            model = %config.llm.model,
            max_results = config.research.max_search_results,
            max_content_length = config.research.max_content_length,
            "pipeline ready"
        );

        Ok(Self::new(
            &config.research,
            wiki.clone(),
            wiki,
            generator,
            SynthesisOptions::from(&config.llm),
        ))
    }

    /// Names of the stages, in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Answer `query` without progress reporting.
    pub async fn research(&self, query: &str) -> ResearchState {
        self.research_with_progress(query, &SilentProgress).await
    }

    /// Answer `query`, reporting each stage as it starts.
    ///
    /// Never fails: a stage error becomes a readable answer with `error` set.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn research_with_progress(
        &self,
        query: &str,
        progress: &dyn ProgressReporter,
    ) -> ResearchState {
        let start = Instant::now();
        let mut state = ResearchState::new(query);

        for stage in &self.stages {
            progress.phase(stage.label());
            if let Err(e) = stage.run(&mut state).await {
                error!(stage = stage.name(), error = %e, "stage failed");
                state = failed_state(query, e.to_string());
                break;
            }
        }

        // No stage set an answer; keep whatever was gathered.
        if state.answer.is_empty() {
            let message = state
                .error
                .clone()
                .unwrap_or_else(|| "no answer was produced".to_string());
            state.answer = format!("{RESEARCH_FAILED_PREFIX}{message}");
            state.error = Some(message);
        }

        progress.done(&state);

        info!(
            documents = state.documents.len(),
            sources = state.sources.len(),
            failed = state.error.is_some(),
            elapsed_ms = start.elapsed().as_millis(),
            "research complete"
        );

        state
    }
}

fn failed_state(query: &str, message: String) -> ResearchState {
    ResearchState {
        answer: format!("{RESEARCH_FAILED_PREFIX}{message}"),
        error: Some(message),
        ..ResearchState::new(query)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fetch::NO_SEARCH_RESULTS;
    use crate::search::NO_QUERY_PROVIDED;
    use crate::synthesis::{EMPTY_GENERATION, GENERATION_FAILED_PREFIX, NO_ARTICLES_ANSWER};
    use crate::test_support::{StubFetch, StubGenerator, StubSearch, article};
    use wikiresearch_shared::WikiResearchError;

    fn settings(max_results: usize) -> ResearchSettings {
        ResearchSettings {
            max_search_results: max_results,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        finished: Mutex<Option<ResearchState>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, label: &str) {
            self.phases.lock().unwrap().push(label.to_string());
        }

        fn done(&self, state: &ResearchState) {
            *self.finished.lock().unwrap() = Some(state.clone());
        }
    }

    struct Exploding;

    #[async_trait::async_trait]
    impl Stage for Exploding {
        fn name(&self) -> &'static str {
            "explode"
        }

        fn label(&self) -> &'static str {
            "Exploding..."
        }

        async fn run(&self, state: &mut ResearchState) -> Result<()> {
            state.search_results.push("partial".into());
            Err(WikiResearchError::validation("boom"))
        }
    }

    #[tokio::test]
    async fn answers_with_sources_in_fetch_order() {
        let search = Arc::new(StubSearch::scripted(vec![Ok(vec![
            "Quantum computing".into(),
            "Qubit".into(),
            "Quantum entanglement".into(),
        ])]));
        let fetch = Arc::new(
            StubFetch::new()
                .with("Quantum computing", Ok(article("Quantum computing", "QC body")))
                .with("Qubit", Ok(article("Qubit", "Qubit body")))
                .with("Quantum entanglement", Ok(article("Quantum entanglement", "QE body"))),
        );
        let generator = Arc::new(StubGenerator::replying("Quantum computers use qubits."));
        let pipeline = ResearchPipeline::new(
            &settings(3),
            search,
            fetch,
            generator.clone(),
            SynthesisOptions::default(),
        );

        let progress = RecordingProgress::default();
        let state = pipeline
            .research_with_progress("Quantum computing", &progress)
            .await;

        assert_eq!(state.answer, "Quantum computers use qubits.");
        assert!(state.error.is_none());
        let titles: Vec<_> = state.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Quantum computing", "Qubit", "Quantum entanglement"]);
        assert_eq!(
            state.sources[1].url,
            "https://en.wikipedia.org/wiki/Qubit"
        );
        assert!(generator.requests()[0].prompt.contains("**Qubit**:\nQubit body"));

        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec![
                "Searching Wikipedia articles...",
                "Extracting article content...",
                "Analyzing with the language model...",
            ]
        );
        assert_eq!(progress.finished.lock().unwrap().as_ref(), Some(&state));
    }

    #[tokio::test]
    async fn nonsense_query_gets_apology_and_records_why() {
        let search = Arc::new(StubSearch::scripted(vec![Ok(vec![]), Ok(vec![])]));
        let fetch = Arc::new(StubFetch::new());
        let generator = Arc::new(StubGenerator::replying("unused"));
        let pipeline = ResearchPipeline::new(
            &settings(3),
            search.clone(),
            fetch.clone(),
            generator.clone(),
            SynthesisOptions::default(),
        );

        let state = pipeline.research("asdkjhqwe123").await;

        assert_eq!(state.answer, NO_ARTICLES_ANSWER);
        assert!(state.search_results.is_empty());
        assert!(state.documents.is_empty());
        assert!(state.sources.is_empty());
        assert_eq!(state.error.as_deref(), Some(NO_SEARCH_RESULTS));
        assert_eq!(search.calls().len(), 2);
        assert!(fetch.calls().is_empty());
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn blank_query_touches_no_provider() {
        let search = Arc::new(StubSearch::scripted(vec![]));
        let fetch = Arc::new(StubFetch::new());
        let generator = Arc::new(StubGenerator::replying("unused"));
        let pipeline = ResearchPipeline::new(
            &settings(3),
            search.clone(),
            fetch.clone(),
            generator.clone(),
            SynthesisOptions::default(),
        );

        let state = pipeline.research("   ").await;

        assert_eq!(state.answer, NO_QUERY_PROVIDED);
        assert!(state.error.is_some());
        assert!(search.calls().is_empty());
        assert!(fetch.calls().is_empty());
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn stage_error_becomes_readable_answer() {
        let pipeline = ResearchPipeline::with_stages(vec![Box::new(Exploding)]);
        let state = pipeline.research("Qubit").await;

        assert_eq!(
            state.answer,
            "An error occurred during research: validation error: boom"
        );
        assert_eq!(state.error.as_deref(), Some("validation error: boom"));
        assert_eq!(state.query, "Qubit");
        assert!(state.search_results.is_empty());
        assert!(state.sources.is_empty());
    }

    #[tokio::test]
    async fn empty_answer_is_never_returned() {
        let pipeline = ResearchPipeline::with_stages(vec![]);
        let state = pipeline.research("Qubit").await;
        assert!(state.answer.starts_with(RESEARCH_FAILED_PREFIX));
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn empty_model_reply_keeps_documents_and_sources() {
        let search = Arc::new(StubSearch::scripted(vec![Ok(vec!["Qubit".into()])]));
        let fetch = Arc::new(StubFetch::new().with("Qubit", Ok(article("Qubit", "Qubit body"))));
        let generator = Arc::new(StubGenerator::replying(""));
        let pipeline = ResearchPipeline::new(
            &settings(3),
            search,
            fetch,
            generator,
            SynthesisOptions::default(),
        );

        let state = pipeline.research("What is a qubit?").await;

        assert_eq!(
            state.answer,
            format!("{GENERATION_FAILED_PREFIX}{EMPTY_GENERATION}")
        );
        assert_eq!(state.search_results, vec!["Qubit"]);
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.sources.len(), 1);
        assert_eq!(state.sources[0].title, "Qubit");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn skipped_titles_leave_fewer_documents_than_results() {
        let search = Arc::new(StubSearch::scripted(vec![Ok(vec![
            "Mercury".into(),
            "Gone".into(),
        ])]));
        let fetch = Arc::new(StubFetch::new().with("Mercury", Ok(article("Mercury", "Hot."))));
        let generator = Arc::new(StubGenerator::replying("Mercury is hot."));
        let pipeline = ResearchPipeline::new(
            &settings(2),
            search,
            fetch,
            generator,
            SynthesisOptions::default(),
        );

        let state = pipeline.research("Mercury").await;

        assert_eq!(state.search_results.len(), 2);
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.sources.len(), state.documents.len());
        assert!(state.error.is_none());
    }

    #[test]
    fn standard_stage_order() {
        let pipeline = ResearchPipeline::new(
            &settings(3),
            Arc::new(StubSearch::scripted(vec![])),
            Arc::new(StubFetch::new()),
            Arc::new(StubGenerator::replying("x")),
            SynthesisOptions::default(),
        );
        assert_eq!(pipeline.stage_names(), vec!["search", "fetch", "synthesize"]);
    }

    #[test]
    fn from_config_rejects_out_of_range_settings() {
        let mut config = AppConfig::default();
        config.research.max_search_results = 9;
        assert!(ResearchPipeline::from_config(&config).is_err());
    }
}
