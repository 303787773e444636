//! Prompt assembly: retrieved context ahead of the question, in rank order.

use crate::reranker::ScoredChunk;

/// Builds the grounding prompt from ranked chunks and the question.
///
/// Chunks appear in relevance order, numbered, so the most relevant
/// context comes first. The instruction pins the answer to the provided
/// context.
pub fn build_prompt(question: &str, chunks: &[ScoredChunk]) -> String {
    let mut prompt = String::with_capacity(
        256 + chunks.iter().map(|c| c.content().len() + 16).sum::<usize>() + question.len(),
    );

    prompt.push_str(
        "Answer the question using only the context below. \
         If the context does not contain the answer, say so.\n\nContext:\n",
    );

    for (i, chunk) in chunks.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", i + 1, chunk.content()));
    }

    prompt.push_str("\nQuestion: ");
    prompt.push_str(question);
    prompt.push_str("\nAnswer:");

    prompt
}
