//! Lexical overlap scorer used when the cross-encoder is degraded or
//! unavailable. Pure string computation: never fails, never loads a model.

use std::collections::HashSet;

/// Function words ignored when comparing query and candidate content.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "but", "by", "can", "could", "did",
    "do", "does", "during", "each", "few", "for", "from", "further", "had", "has", "have", "he",
    "her", "here", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "may",
    "me", "might", "more", "most", "must", "my", "need", "no", "nor", "not", "of", "on", "once",
    "only", "or", "other", "ought", "our", "own", "same", "shall", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "us", "used", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your",
];

/// Lowercased content words of a text, stop words removed.
fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Scores query/candidate relevance from shared content words.
///
/// Blends recall of the query's content words with Jaccard overlap, then
/// squashes through a sigmoid into [0, 1]. Scores are only comparable to
/// other keyword-fallback scores from the same call, never to
/// cross-encoder logits.
pub fn overlap_score(query: &str, candidate: &str) -> f32 {
    let query_words = content_words(query);

    if query_words.is_empty() {
        // Stop-word-only query: fall back to a weak length-ratio signal.
        let len_ratio = (query.len().min(candidate.len()) as f32)
            / (query.len().max(candidate.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let candidate_words = content_words(candidate);

    let matches = query_words.intersection(&candidate_words).count();
    let union = query_words.union(&candidate_words).count();

    let recall = matches as f32 / query_words.len() as f32;
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;

    let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

    normalized.clamp(0.0, 1.0)
}
