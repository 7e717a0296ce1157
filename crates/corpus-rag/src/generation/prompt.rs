//! Grounded prompt construction

use crate::retrieval::RetrievedChunk;
use crate::types::ChatMessage;

/// Prompt builder for grounded chat requests
pub struct PromptBuilder;

const SYSTEM_PROMPT: &str = r#"You are a helpful assistant that answers questions based ONLY on the provided context documents.

CRITICAL RULES:
1. You MUST answer using ONLY the information provided in the context below.
2. If the answer is not in the context, you MUST say "I don't know" or "The information is not available in the provided documents."
3. DO NOT use any prior knowledge or information outside the provided context.
4. When you reference information from the context, cite the source using the citation format provided.
5. Be concise and accurate. If you're uncertain, say so.

You will receive:
- A user question
- Relevant context chunks from documents with citations

Format your response as:
1. Your answer based on the context
2. Citations in the format: [Document: Title, Chunk: N, Page: X] (Page is optional if not available)"#;

impl PromptBuilder {
    /// Build the message sequence for one request: exactly one system
    /// message followed by one user message. No history.
    ///
    /// Callers must not invoke this with an empty chunk list; the chat flow
    /// short-circuits to the fixed refusal before building a prompt.
    pub fn build(question: &str, chunks: &[RetrievedChunk]) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::build_user_prompt(question, chunks)),
        ]
    }

    fn build_user_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
        let context_parts: Vec<String> = chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let page_info = chunk
                    .page
                    .map(|p| format!(", Page: {}", p))
                    .unwrap_or_default();
                format!(
                    "[Context {}]\nDocument: {}\nChunk Index: {}{}\nContent: {}\n\n---",
                    idx + 1,
                    chunk.document_title,
                    chunk.chunk_index,
                    page_info,
                    chunk.content
                )
            })
            .collect();

        format!(
            "Question: {}\n\nContext:\n{}\n\nPlease answer the question using ONLY the information \
             from the context above. If the answer is not in the context, say you don't know. \
             Include citations for any information you use.",
            question,
            context_parts.join("\n\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use uuid::Uuid;

    fn retrieved(title: &str, index: u32, page: Option<u32>, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_title: title.to_string(),
            chunk_index: index,
            content: content.to_string(),
            page,
            similarity: 0.9,
        }
    }

    #[test]
    fn emits_system_then_user() {
        let chunks = vec![retrieved("Terms", 0, None, "refunds within 30 days")];
        let messages = PromptBuilder::build("What is the refund policy?", &chunks);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn system_message_carries_grounding_rules() {
        let chunks = vec![retrieved("Terms", 0, None, "c")];
        let messages = PromptBuilder::build("q", &chunks);
        let system = &messages[0].content;

        assert!(system.contains("ONLY the information provided in the context"));
        assert!(system.contains("DO NOT use any prior knowledge"));
        assert!(system.contains("[Document: Title, Chunk: N, Page: X]"));
    }

    #[test]
    fn user_message_contains_chunks_verbatim_with_labels() {
        let chunks = vec![
            retrieved("Terms", 0, Some(2), "Refunds are allowed within 30 days."),
            retrieved("Terms", 3, None, "Shipping costs are non-refundable."),
        ];
        let messages = PromptBuilder::build("What is the refund policy?", &chunks);
        let user = &messages[1].content;

        assert!(user.contains("Question: What is the refund policy?"));
        assert!(user.contains("[Context 1]"));
        assert!(user.contains("[Context 2]"));
        assert!(user.contains("Document: Terms"));
        assert!(user.contains("Chunk Index: 0, Page: 2"));
        assert!(user.contains("Refunds are allowed within 30 days."));
        assert!(user.contains("Shipping costs are non-refundable."));
        assert!(user.contains("---"));
    }

    #[test]
    fn page_segment_omitted_when_unknown() {
        let chunks = vec![retrieved("Terms", 3, None, "c")];
        let messages = PromptBuilder::build("q", &chunks);
        let user = &messages[1].content;

        assert!(user.contains("Chunk Index: 3\n"));
        assert!(!user.contains("Chunk Index: 3, Page"));
    }
}
