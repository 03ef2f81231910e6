//! Synthesis stage: query + documents → cited answer.

use std::sync::Arc;

use tracing::{error, info, instrument};
use wikiresearch_shared::{
    Document, GenerationProvider, GenerationRequest, LlmConfig, ResearchState, Result,
};

use crate::search::NO_QUERY_PROVIDED;
use crate::stage::Stage;

/// Answer given when no article could be retrieved.
pub const NO_ARTICLES_ANSWER: &str = "I couldn't find any relevant Wikipedia articles for your query. Please try rephrasing your question or using different keywords.";

/// Prefix of the answer given when the generation call fails.
pub const GENERATION_FAILED_PREFIX: &str =
    "I encountered an error while processing your request: ";

/// Reason reported when the model replies with nothing.
pub const EMPTY_GENERATION: &str = "model returned an empty answer";

/// Sampling parameters for the single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 1000,
        }
    }
}

impl From<&LlmConfig> for SynthesisOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Asks the language model to answer strictly from the retrieved articles.
pub struct SynthesisStage {
    generator: Arc<dyn GenerationProvider>,
    options: SynthesisOptions,
}

impl SynthesisStage {
    pub fn new(generator: Arc<dyn GenerationProvider>, options: SynthesisOptions) -> Self {
        Self { generator, options }
    }
}

/// Build the grounded-answer prompt for `query` over `documents`.
pub fn build_prompt(query: &str, documents: &[Document]) -> String {
    let context = documents
        .iter()
        .map(|doc| format!("**{}**:\n{}", doc.title, doc.body))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a knowledgeable Wikipedia research assistant. Answer the user's question based ONLY on the provided Wikipedia content.

Guidelines:
- Provide a comprehensive but concise answer
- Use information from multiple sources when relevant
- If the information is insufficient, acknowledge the limitations instead of guessing
- Structure your response clearly with proper formatting
- Include specific details and examples when available

User Question: {query}

Wikipedia Content:
{context}

Please provide a detailed answer based on the above information:"
    )
}

#[async_trait::async_trait]
impl Stage for SynthesisStage {
    fn name(&self) -> &'static str {
        "synthesize"
    }

    fn label(&self) -> &'static str {
        "Analyzing with the language model..."
    }

    #[instrument(skip_all, fields(model = self.generator.model(), documents = state.documents.len()))]
    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        if state.has_blank_query() {
            state.answer = NO_QUERY_PROVIDED.into();
            state.sources.clear();
            return Ok(());
        }

        if state.documents.is_empty() {
            state.answer = NO_ARTICLES_ANSWER.into();
            state.sources.clear();
            return Ok(());
        }

        state.sources = state.sources_from_documents();

        let request = GenerationRequest {
            prompt: build_prompt(&state.query, &state.documents),
            temperature: self.options.temperature,
            max_output_tokens: self.options.max_output_tokens,
        };

        info!("generating answer");
        match self.generator.generate(&request).await {
            Ok(answer) if answer.trim().is_empty() => {
                error!("generation returned an empty answer");
                state.answer = format!("{GENERATION_FAILED_PREFIX}{EMPTY_GENERATION}");
            }
            Ok(answer) => state.answer = answer,
            Err(e) => {
                error!(error = %e, "generation failed");
                state.answer = format!("{GENERATION_FAILED_PREFIX}{e}");
            }
        }

        Ok(())
    }
}
