//! KnowledgeLookup trait: the abstraction over summary sources.
//!
//! A lookup takes a short query (typically an entity title) and returns the
//! leading sentences of the best-matching entry's descriptive text.
//!
//! Implementations: Wikipedia extracts, an in-memory static table.

use async_trait::async_trait;

use crate::error::LookupError;

/// Number of leading sentences a lookup returns.
pub const SUMMARY_SENTENCES: usize = 2;

/// Sentence delimiter used to split and re-join extracts.
pub const SENTENCE_DELIMITER: char = '.';

#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    /// A human-readable name for this source (e.g., "wikipedia").
    fn name(&self) -> &str;

    /// Fetch the summary for `query`. One request, no caching, no retries.
    async fn lookup(&self, query: &str) -> std::result::Result<String, LookupError>;
}

/// Keep the first `count` sentences of `text`, re-joined by the delimiter.
///
/// Splitting is on the bare delimiter, so the trailing period of the last
/// kept sentence is dropped: `"A. B. C."` becomes `"A. B"`.
pub fn leading_sentences(text: &str, count: usize) -> String {
    let delimiter = SENTENCE_DELIMITER.to_string();
    text.split(SENTENCE_DELIMITER)
        .take(count)
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_two_sentences() {
        let extract = "Apple Inc. is an American company. It is headquartered in Cupertino. It was founded in 1976.";
        // "Inc." counts as a sentence break, exactly like a plain split would.
        assert_eq!(
            leading_sentences(extract, SUMMARY_SENTENCES),
            "Apple Inc. is an American company"
        );
    }

    #[test]
    fn short_text_is_returned_whole() {
        assert_eq!(leading_sentences("No delimiter here", 2), "No delimiter here");
        assert_eq!(leading_sentences("One. Two", 2), "One. Two");
        assert_eq!(leading_sentences("", 2), "");
    }

    #[test]
    fn drops_trailing_delimiter_of_last_kept_sentence() {
        assert_eq!(leading_sentences("A. B. C.", 2), "A. B");
    }
}
