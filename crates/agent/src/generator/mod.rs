//! The two generation disciplines the controller alternates between.
//!
//! Both wrap a single [`Provider::complete`] call over the rendered
//! transcript. They differ only in the constraint attached to the request:
//!
//! - [`ConstrainedGenerator`] attaches a strict enum JSON schema and parses
//!   the one declared field back out
//! - [`FreeTextGenerator`] attaches stop sequences and returns raw text

pub mod constrained;
pub mod free_text;

pub use constrained::ConstrainedGenerator;
pub use free_text::FreeTextGenerator;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use stepwise_core::error::Result;
use stepwise_core::provider::{Provider, ProviderRequest};
use tracing::debug;

/// Provider, model and sampling settings shared by both generators.
pub(crate) struct Backend {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    tokens_used: AtomicU32,
}

impl Backend {
    pub(crate) fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            tokens_used: AtomicU32::new(0),
        }
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn tokens_used(&self) -> u32 {
        self.tokens_used.load(Ordering::Relaxed)
    }

    /// A request carrying `prompt` as a single user message.
    pub(crate) fn request(&self, prompt: &str, max_tokens: u32) -> ProviderRequest {
        let mut request = ProviderRequest::prompt(&self.model, prompt, self.temperature);
        request.max_tokens = Some(max_tokens);
        request
    }

    /// Send the request and return the completion text.
    pub(crate) async fn complete(&self, request: ProviderRequest) -> Result<String> {
        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            self.tokens_used
                .fetch_add(usage.total_tokens, Ordering::Relaxed);
        }
        debug!(
            provider = self.provider.name(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            chars = response.message.content.len(),
            "Completion received"
        );

        Ok(response.message.content)
    }
}
