//! Provider router: turns the `[providers]` config into live backends.
//!
//! Every entry speaks the OpenAI chat-completions protocol. The router only
//! resolves names to endpoints; it never retries or falls back.

use crate::openai_compat::OpenAiCompatProvider;
use std::collections::HashMap;
use std::sync::Arc;
use stepwise_config::AppConfig;
use stepwise_core::error::ProviderError;
use stepwise_core::provider::Provider;

/// Named providers plus the one a run uses by default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// The provider runs are sent to.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Build one provider per `[providers.<name>]` section, plus the default
/// provider if it has no section of its own.
///
/// A provider without `api_url` must be one of the built-in names; anything
/// else is [`ProviderError::NotConfigured`].
pub fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .as_deref()
            .or(config.api_key.as_deref())
            .unwrap_or_default();
        let base_url = resolve_base_url(name, provider_config.api_url.as_deref())?;
        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)),
        );
    }

    if router.get(&config.default_provider).is_none() {
        let name = &config.default_provider;
        let base_url = resolve_base_url(name, None)?;
        let api_key = config.api_key.as_deref().unwrap_or_default();
        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)),
        );
    }

    Ok(router)
}

fn resolve_base_url(name: &str, api_url: Option<&str>) -> Result<String, ProviderError> {
    match api_url.or_else(|| known_base_url(name)) {
        Some(url) => Ok(url.to_string()),
        None => Err(ProviderError::NotConfigured(format!(
            "unknown provider '{name}': set [providers.{name}].api_url"
        ))),
    }
}

/// Base URL of a built-in provider, or `None` for names we don't know.
pub fn known_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_config::ProviderConfig;

    fn section(api_url: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: None,
            api_url: api_url.map(str::to_string),
            default_model: None,
        }
    }

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("vllm");
        router.register(
            "vllm",
            Arc::new(OpenAiCompatProvider::new("vllm", "http://gpu-box:8000/v1", "")),
        );

        assert!(router.get("vllm").is_some());
        assert!(router.get("nonexistent").is_none());
        assert_eq!(router.default().unwrap().name(), "vllm");
        assert_eq!(router.names(), vec!["vllm"]);
    }

    #[test]
    fn built_in_base_urls() {
        assert!(known_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(known_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(known_base_url("ollama").unwrap().contains("localhost:11434"));
        assert_eq!(known_base_url("opnai"), None);
    }

    #[test]
    fn build_from_default_config() {
        let router = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(router.default().unwrap().name(), "openai");
        assert_eq!(router.names(), vec!["openai"]);
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig {
            default_provider: "vllm".into(),
            ..AppConfig::default()
        };
        config
            .providers
            .insert("vllm".into(), section(Some("http://gpu-box:8000/v1")));
        config.providers.insert("groq".into(), section(None));

        let router = build_from_config(&config).unwrap();
        assert_eq!(router.names(), vec!["groq", "vllm"]);
        assert_eq!(router.default().unwrap().name(), "vllm");
    }

    #[test]
    fn unknown_default_provider_is_not_configured() {
        let config = AppConfig {
            default_provider: "opnai".into(),
            ..AppConfig::default()
        };
        match build_from_config(&config) {
            Err(ProviderError::NotConfigured(message)) => assert!(message.contains("opnai")),
            Err(other) => panic!("expected NotConfigured, got {other:?}"),
            Ok(_) => panic!("expected NotConfigured for an unknown provider"),
        }
    }

    #[test]
    fn unknown_provider_with_url_is_accepted() {
        let mut config = AppConfig {
            default_provider: "internal".into(),
            ..AppConfig::default()
        };
        config
            .providers
            .insert("internal".into(), section(Some("https://llm.corp/v1")));

        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "internal");
    }

    #[test]
    fn unknown_provider_section_without_url_fails() {
        let mut config = AppConfig::default();
        config.providers.insert("mystery".into(), section(None));
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
