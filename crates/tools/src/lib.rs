//! Knowledge lookup implementations for Stepwise.
//!
//! A lookup is the agent's only way to observe the world: given a short
//! subject it returns the first two sentences of a descriptive summary.
//!
//! - [`WikipediaLookup`] queries the MediaWiki extracts API
//! - [`StaticLookup`] answers from an in-memory table (offline runs, tests)

pub mod static_lookup;
pub mod wikipedia;

use std::sync::Arc;
use stepwise_config::LookupConfig;
use stepwise_core::lookup::KnowledgeLookup;

pub use static_lookup::StaticLookup;
pub use wikipedia::WikipediaLookup;

/// Create the lookup selected by `config.backend`.
pub fn build_lookup(config: &LookupConfig) -> Arc<dyn KnowledgeLookup> {
    match config.backend.as_str() {
        "static" => Arc::new(StaticLookup::from_entries(config.entries.clone())),
        _ => Arc::new(WikipediaLookup::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_wikipedia() {
        let lookup = build_lookup(&LookupConfig::default());
        assert_eq!(lookup.name(), "wikipedia");
    }

    #[tokio::test]
    async fn static_backend_uses_configured_entries() {
        let mut config = LookupConfig {
            backend: "static".into(),
            ..LookupConfig::default()
        };
        config.entries.insert(
            "Apple Inc".into(),
            "Apple Inc. is an American company. It is in Cupertino. Founded 1976.".into(),
        );

        let lookup = build_lookup(&config);
        assert_eq!(lookup.name(), "static");
        let summary = lookup.lookup("apple inc").await.unwrap();
        assert_eq!(summary, "Apple Inc. is an American company");
    }
}
