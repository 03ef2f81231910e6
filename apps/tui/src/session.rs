//! Research session backing the TUI: runtime, pipeline, and history.
//!
//! The event loop stays synchronous. A query is spawned on the session's
//! tokio runtime and polled each frame, so the status bar can follow the
//! pipeline's progress while it runs.

use std::sync::{Arc, Mutex};

use color_eyre::eyre::Result;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use wikiresearch_core::pipeline::RESEARCH_FAILED_PREFIX;
use wikiresearch_core::{ProgressReporter, ResearchHistory, ResearchPipeline};
use wikiresearch_shared::{AppConfig, ResearchSettings, ResearchState, validate_api_key};

/// Records the label of the running stage for the status bar.
struct TuiProgress {
    label: Mutex<String>,
}

impl ProgressReporter for TuiProgress {
    fn phase(&self, label: &str) {
        if let Ok(mut current) = self.label.lock() {
            *current = label.to_string();
        }
    }

    fn done(&self, _state: &ResearchState) {}
}

struct PendingResearch {
    query: String,
    progress: Arc<TuiProgress>,
    handle: JoinHandle<ResearchState>,
}

pub(crate) struct Session {
    runtime: Runtime,
    config: AppConfig,
    /// Unavailable (with a reason) when the config cannot produce one,
    /// e.g. a missing API key.
    pipeline: std::result::Result<Arc<ResearchPipeline>, String>,
    history: ResearchHistory,
    pending: Option<PendingResearch>,
}

impl Session {
    pub(crate) fn new(config: AppConfig) -> Result<Self> {
        let runtime = Runtime::new()?;
        let pipeline = build_pipeline(&config);
        if let Err(reason) = &pipeline {
            warn!(%reason, "research pipeline unavailable");
        }
        Ok(Self {
            runtime,
            config,
            pipeline,
            history: ResearchHistory::new(),
            pending: None,
        })
    }

    pub(crate) fn settings(&self) -> &ResearchSettings {
        &self.config.research
    }

    pub(crate) fn history(&self) -> &ResearchHistory {
        &self.history
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Why research is unavailable, if it is.
    pub(crate) fn unavailable_reason(&self) -> Option<&str> {
        self.pipeline.as_ref().err().map(String::as_str)
    }

    /// Validate and adopt new settings, rebuilding the pipeline.
    pub(crate) fn apply_settings(
        &mut self,
        settings: ResearchSettings,
    ) -> std::result::Result<(), String> {
        settings.validate().map_err(|e| e.to_string())?;
        self.config.research = settings;
        self.pipeline = build_pipeline(&self.config);
        info!(
            max_results = self.config.research.max_search_results,
            max_content_length = self.config.research.max_content_length,
            language = %self.config.research.language,
            "settings applied"
        );
        self.pipeline.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    /// Start researching `query` in the background.
    pub(crate) fn start(&mut self, query: String) -> std::result::Result<(), String> {
        if self.pending.is_some() {
            return Err("A research request is already running.".into());
        }
        let pipeline = self.pipeline.as_ref().map_err(Clone::clone)?.clone();

        let progress = Arc::new(TuiProgress {
            label: Mutex::new("Starting research...".into()),
        });
        let reporter = progress.clone();
        let task_query = query.clone();
        let handle = self.runtime.spawn(async move {
            pipeline
                .research_with_progress(&task_query, reporter.as_ref())
                .await
        });

        self.pending = Some(PendingResearch {
            query,
            progress,
            handle,
        });
        Ok(())
    }

    /// Label of the stage currently running, if any.
    pub(crate) fn progress_label(&self) -> Option<String> {
        self.pending
            .as_ref()
            .and_then(|p| p.progress.label.lock().ok().map(|l| l.clone()))
    }

    /// Collect a finished research run, recording it in history.
    pub(crate) fn poll(&mut self) -> Option<ResearchState> {
        if !self.pending.as_ref()?.handle.is_finished() {
            return None;
        }
        let pending = self.pending.take()?;

        let state = match self.runtime.block_on(pending.handle) {
            Ok(state) => state,
            Err(e) => {
                let message = format!("research task failed: {e}");
                ResearchState {
                    answer: format!("{RESEARCH_FAILED_PREFIX}{message}"),
                    error: Some(message),
                    ..ResearchState::new(pending.query.as_str())
                }
            }
        };

        self.history.push(pending.query, state.clone());
        Some(state)
    }
}

fn build_pipeline(config: &AppConfig) -> std::result::Result<Arc<ResearchPipeline>, String> {
    validate_api_key(config).map_err(|e| e.to_string())?;
    ResearchPipeline::from_config(config)
        .map(Arc::new)
        .map_err(|e| e.to_string())
}
