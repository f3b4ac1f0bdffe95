//! Static lookup: answers from an in-memory title table.
//!
//! Titles match case-insensitively after trimming. The same two-sentence
//! rule as the network lookup is applied to the stored text.

use async_trait::async_trait;
use std::collections::HashMap;
use stepwise_core::error::LookupError;
use stepwise_core::lookup::{KnowledgeLookup, SUMMARY_SENTENCES, leading_sentences};

#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    entries: HashMap<String, String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(title, extract)| (normalize(title.as_ref()), extract.into()))
                .collect(),
        }
    }

    /// Add or replace an entry.
    pub fn with_entry(mut self, title: &str, extract: impl Into<String>) -> Self {
        self.entries.insert(normalize(title), extract.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

#[async_trait]
impl KnowledgeLookup for StaticLookup {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        match self.entries.get(&normalize(query)) {
            Some(extract) if !extract.trim().is_empty() => {
                Ok(leading_sentences(extract, SUMMARY_SENTENCES))
            }
            _ => Err(LookupError::NotFound {
                query: query.to_string(),
            }),
        }
    }
}
