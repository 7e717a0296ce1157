//! Answer generation and the chat-handling flow

pub mod citation;
pub mod prompt;

use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::types::{QueryRequest, QueryResponse};

pub use citation::extract_citations;
pub use prompt::PromptBuilder;

/// Fixed refusal returned when retrieval produced no grounding context
pub const NO_CONTEXT_REFUSAL: &str =
    "I don't have any relevant information in the provided documents to answer this question.";

/// Fallback answer substituted when the backend succeeds with an empty
/// payload ("backend succeeded with nothing to say" is not an outage)
pub const EMPTY_COMPLETION_FALLBACK: &str = "I couldn't generate a response.";

/// The chat-handling flow: retrieve, ground, generate, cite
///
/// One request runs the stages strictly in sequence; no state is shared
/// between requests.
pub struct ChatEngine {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
}

impl ChatEngine {
    /// Create a new engine
    pub fn new(retriever: Retriever, llm: Arc<dyn LlmProvider>, temperature: f32) -> Self {
        Self {
            retriever,
            llm,
            temperature,
        }
    }

    /// Answer a question grounded in the corpus
    ///
    /// Zero retrieved chunks short-circuits to the fixed refusal with no
    /// citations; the prompt builder and the generation backend are never
    /// invoked in that case.
    pub async fn answer(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let start = Instant::now();

        let chunks = self
            .retriever
            .retrieve(&request.question, request.document_filter.as_deref())
            .await?;

        if chunks.is_empty() {
            tracing::info!("no grounding context retrieved, returning refusal");
            return Ok(QueryResponse::no_context(start.elapsed().as_millis() as u64));
        }

        let messages = PromptBuilder::build(&request.question, &chunks);

        tracing::info!(
            model = %self.llm.model(),
            chunks = chunks.len(),
            "generating grounded answer"
        );

        let answer = self.llm.complete(&messages, self.temperature).await?;
        let citations = extract_citations(&answer, &chunks);

        Ok(QueryResponse {
            answer,
            citations,
            chunks_retrieved: chunks.len(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            retrieved: request.include_chunks.then_some(chunks),
        })
    }
}
