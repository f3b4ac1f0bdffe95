//! Constrained generation: the model must answer with one enum value.

use std::sync::Arc;
use stepwise_core::error::{Error, Result};
use stepwise_core::provider::Provider;
use stepwise_core::schema::{Choice, EnumSchema};

use super::Backend;

pub struct ConstrainedGenerator {
    backend: Backend,
}

impl ConstrainedGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            backend: Backend::new(provider, model, temperature),
        }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Total tokens reported by the backend across all calls so far.
    pub fn tokens_used(&self) -> u32 {
        self.backend.tokens_used()
    }

    /// Generate under `schema` and return the value of its single field.
    ///
    /// Output that is not JSON, lacks the field, or holds a value outside
    /// the declared set fails with [`SchemaViolation`]. Nothing is retried.
    ///
    /// [`SchemaViolation`]: stepwise_core::error::SchemaViolation
    pub async fn generate(
        &self,
        prompt: &str,
        schema: &EnumSchema,
        max_tokens: u32,
    ) -> Result<String> {
        let mut request = self.backend.request(prompt, max_tokens);
        request.response_format = Some(schema.response_format());

        let raw = self.backend.complete(request).await?;
        Ok(schema.parse(&raw)?)
    }

    /// Generate one variant of a closed enum.
    pub async fn choose<C: Choice>(&self, prompt: &str, max_tokens: u32) -> Result<C> {
        let schema = C::schema();
        let tag = self.generate(prompt, &schema, max_tokens).await?;
        // `parse` already checked membership against the variant tags
        C::from_tag(&tag).ok_or_else(|| {
            Error::Internal(format!(
                "tag '{tag}' admitted by schema '{}' has no variant",
                schema.name()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, choice};
    use stepwise_core::error::SchemaViolation;
    use stepwise_core::provider::ResponseFormat;
    use stepwise_core::step::{Action, Mode};

    fn generator(provider: &Arc<ScriptedProvider>) -> ConstrainedGenerator {
        ConstrainedGenerator::new(provider.clone(), "mock-model", 0.0)
    }

    #[tokio::test]
    async fn request_carries_strict_schema_and_prompt() {
        let provider = Arc::new(ScriptedProvider::new([choice("Act")]));
        let mode: Mode = generator(&provider).choose("Question?", 128).await.unwrap();
        assert_eq!(mode, Mode::Act);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt_text(), "Question?");
        assert_eq!(requests[0].max_tokens, Some(128));
        assert!(requests[0].stop.is_empty());
        match &requests[0].response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, "mode");
                assert!(json_schema.strict);
                assert_eq!(
                    json_schema.schema["properties"]["result"]["enum"],
                    serde_json::json!(["Tho", "Act"])
                );
            }
            other => panic!("expected json_schema format, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chooses_actions() {
        let provider = Arc::new(ScriptedProvider::new([choice("Finish"), choice("Search")]));
        let generator = generator(&provider);
        assert_eq!(generator.choose::<Action>("p", 16).await.unwrap(), Action::Finish);
        assert_eq!(generator.choose::<Action>("p", 16).await.unwrap(), Action::Search);
        assert_eq!(generator.tokens_used(), 30);
    }

    #[tokio::test]
    async fn value_outside_enum_is_a_violation() {
        let provider = Arc::new(ScriptedProvider::new([choice("Obs")]));
        let err = generator(&provider).choose::<Mode>("p", 16).await.unwrap_err();
        match err {
            Error::SchemaViolation(SchemaViolation::NotAllowed { value, allowed, .. }) => {
                assert_eq!(value, "Obs");
                assert_eq!(allowed, vec!["Tho", "Act"]);
            }
            other => panic!("expected NotAllowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_output_is_a_violation() {
        let provider = Arc::new(ScriptedProvider::new(["Act"]));
        let err = generator(&provider).choose::<Mode>("p", 16).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaViolation(SchemaViolation::Unparseable { .. })
        ));
    }

    #[tokio::test]
    async fn generate_accepts_ad_hoc_schemas() {
        let provider = Arc::new(ScriptedProvider::new([r#"{"verdict": "yes"}"#]));
        let schema = EnumSchema::new("verdict", ["yes", "no"]).with_field("verdict");
        let value = generator(&provider).generate("p", &schema, 8).await.unwrap();
        assert_eq!(value, "yes");
    }
}
