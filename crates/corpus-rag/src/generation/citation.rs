//! Citation extraction and verification
//!
//! Markers in the generated answer are only trusted if they resolve against
//! the chunks actually retrieved for the same request; anything else is a
//! model hallucination and is dropped.

use regex::Regex;
use std::sync::OnceLock;

use crate::retrieval::RetrievedChunk;
use crate::types::Citation;

const SNIPPET_LEN: usize = 150;

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\[Document:\s*([^,]+),\s*Chunk:\s*(\d+)(?:,\s*Page:\s*(\d+))?\]")
            .expect("citation marker pattern is valid")
    })
}

/// First 150 characters of the chunk content, always ellipsis-suffixed.
///
/// The suffix is applied even when nothing was truncated; observed behavior,
/// kept as-is.
fn snippet_of(content: &str) -> String {
    let head: String = content.chars().take(SNIPPET_LEN).collect();
    format!("{}...", head)
}

/// Extract citations from a generated answer
///
/// Every marker occurrence is matched case-insensitively and resolved by
/// exact (document title, chunk index) equality against `chunks`; citations
/// are returned in order of first appearance in the answer. Markers that do
/// not resolve are dropped. When no marker resolves and chunks were
/// retrieved, all retrieved chunks become citations in retrieval order so
/// the caller always has provenance for a grounded answer.
pub fn extract_citations(answer: &str, chunks: &[RetrievedChunk]) -> Vec<Citation> {
    let mut citations = Vec::new();

    for captures in marker_pattern().captures_iter(answer) {
        let title = captures
            .get(1)
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        let chunk_index: u32 = match captures.get(2).and_then(|m| m.as_str().parse().ok()) {
            Some(index) => index,
            None => continue,
        };
        let page: Option<u32> = captures.get(3).and_then(|m| m.as_str().parse().ok());

        let resolved = chunks
            .iter()
            .find(|c| c.document_title == title && c.chunk_index == chunk_index);

        match resolved {
            Some(chunk) => citations.push(Citation {
                document_title: title.to_string(),
                chunk_index,
                page,
                snippet: snippet_of(&chunk.content),
            }),
            None => {
                tracing::debug!(title, chunk_index, "dropping unresolved citation marker");
            }
        }
    }

    if citations.is_empty() && !chunks.is_empty() {
        return chunks
            .iter()
            .map(|chunk| Citation {
                document_title: chunk.document_title.clone(),
                chunk_index: chunk.chunk_index,
                page: chunk.page,
                snippet: snippet_of(&chunk.content),
            })
            .collect();
    }

    citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn retrieved(title: &str, index: u32, page: Option<u32>, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_title: title.to_string(),
            chunk_index: index,
            content: content.to_string(),
            page,
            similarity: 0.8,
        }
    }

    #[test]
    fn resolves_marker_against_retrieved_chunk() {
        let content = "x".repeat(200);
        let chunks = vec![retrieved("Report", 2, Some(5), &content)];
        let citations = extract_citations(
            "The answer is 42. [Document: Report, Chunk: 2, Page: 5]",
            &chunks,
        );

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].document_title, "Report");
        assert_eq!(citations[0].chunk_index, 2);
        assert_eq!(citations[0].page, Some(5));
        assert_eq!(citations[0].snippet, format!("{}...", "x".repeat(150)));
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let chunks = vec![retrieved("Report", 1, None, "content")];
        let citations = extract_citations("[document: Report, chunk: 1]", &chunks);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page, None);
    }

    #[test]
    fn title_resolution_is_exact() {
        let chunks = vec![retrieved("Report", 1, None, "content")];
        let citations = extract_citations("[Document: report, Chunk: 1]", &chunks);
        // Title equality is exact, so a lowercase title falls through to
        // the all-chunks fallback.
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].document_title, "Report");
    }

    #[test]
    fn hallucinated_markers_are_dropped() {
        let chunks = vec![retrieved("Terms", 0, None, "real content")];
        let citations = extract_citations(
            "See [Document: Terms, Chunk: 0] and [Document: Ghost, Chunk: 7].",
            &chunks,
        );

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].document_title, "Terms");
    }

    #[test]
    fn falls_back_to_all_chunks_in_retrieval_order() {
        let chunks = vec![
            retrieved("A", 0, Some(1), "first"),
            retrieved("B", 2, None, "second"),
            retrieved("C", 5, Some(3), "third"),
        ];
        let citations = extract_citations("No markers here.", &chunks);

        assert_eq!(citations.len(), 3);
        assert_eq!(citations[0].document_title, "A");
        assert_eq!(citations[1].document_title, "B");
        assert_eq!(citations[2].document_title, "C");
        assert_eq!(citations[0].page, Some(1));
        assert_eq!(citations[1].snippet, "second...");
    }

    #[test]
    fn no_chunks_and_no_markers_yields_no_citations() {
        assert!(extract_citations("answer", &[]).is_empty());
    }

    #[test]
    fn citations_follow_first_appearance_order() {
        let chunks = vec![
            retrieved("A", 0, None, "alpha"),
            retrieved("B", 1, None, "beta"),
        ];
        let citations = extract_citations(
            "[Document: B, Chunk: 1] then [Document: A, Chunk: 0]",
            &chunks,
        );

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].document_title, "B");
        assert_eq!(citations[1].document_title, "A");
    }

    #[test]
    fn short_snippet_still_gets_ellipsis() {
        let chunks = vec![retrieved("A", 0, None, "short")];
        let citations = extract_citations("[Document: A, Chunk: 0]", &chunks);
        assert_eq!(citations[0].snippet, "short...");
    }

    #[test]
    fn marker_page_wins_over_chunk_page() {
        let chunks = vec![retrieved("A", 0, Some(9), "content")];
        let citations = extract_citations("[Document: A, Chunk: 0, Page: 4]", &chunks);
        assert_eq!(citations[0].page, Some(4));
    }
}
