//! Free-text generation bounded by stop markers and a token budget.

use std::sync::Arc;
use stepwise_core::error::Result;
use stepwise_core::provider::Provider;

use super::Backend;

pub struct FreeTextGenerator {
    backend: Backend,
}

impl FreeTextGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            backend: Backend::new(provider, model, temperature),
        }
    }

    pub fn tokens_used(&self) -> u32 {
        self.backend.tokens_used()
    }

    /// Generate text, cut at the first occurrence of any `stop` marker.
    ///
    /// The markers are also sent to the backend as stop sequences; the local
    /// cut covers backends that ignore them or echo the marker back.
    pub async fn generate(&self, prompt: &str, stop: &[&str], max_tokens: u32) -> Result<String> {
        let mut request = self.backend.request(prompt, max_tokens);
        request.stop = stop.iter().map(|s| s.to_string()).collect();

        let raw = self.backend.complete(request).await?;
        Ok(truncate_at_stop(&raw, stop).to_string())
    }
}

/// The prefix of `text` before the earliest stop marker.
pub fn truncate_at_stop<'a>(text: &'a str, stop: &[&str]) -> &'a str {
    let cut = stop
        .iter()
        .filter(|marker| !marker.is_empty())
        .filter_map(|marker| text.find(marker))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;

    #[test]
    fn cuts_at_earliest_marker() {
        assert_eq!(truncate_at_stop("Apple Inc' and more\n", &["\n", "'"]), "Apple Inc");
        assert_eq!(truncate_at_stop("one line\ntwo", &["\n"]), "one line");
        assert_eq!(truncate_at_stop("no marker", &["'"]), "no marker");
        assert_eq!(truncate_at_stop("empty markers", &[""]), "empty markers");
        assert_eq!(truncate_at_stop("'leading", &["'"]), "");
    }

    #[tokio::test]
    async fn sends_stop_sequences_and_no_schema() {
        let provider = Arc::new(ScriptedProvider::new(["I should search Apple.\nTho 2: more"]));
        let generator = FreeTextGenerator::new(provider.clone(), "mock-model", 0.7);

        let text = generator.generate("prompt", &["\n"], 64).await.unwrap();
        assert_eq!(text, "I should search Apple.");

        let requests = provider.requests();
        assert_eq!(requests[0].stop, vec!["\n".to_string()]);
        assert_eq!(requests[0].max_tokens, Some(64));
        assert!(requests[0].response_format.is_none());
        assert_eq!(generator.tokens_used(), 15);
    }
}
