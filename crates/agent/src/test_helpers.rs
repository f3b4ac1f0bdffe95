//! Shared test helpers for generator and controller tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use stepwise_core::error::{LookupError, ProviderError};
use stepwise_core::lookup::KnowledgeLookup;
use stepwise_core::message::Message;
use stepwise_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// A mock provider that replays a script of completions.
///
/// Each call to `complete` pops the next entry and records the request.
/// Panics if more calls are made than entries provided.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(completions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(completions.into_iter().map(|s| Ok(s.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a failing call to the script.
    pub fn then_fail(self, error: ProviderError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no completion left for call #{call}"));

        next.map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
            finish_reason: Some("stop".into()),
        })
    }
}

/// The JSON a constrained call returns when the model picks `tag`.
pub fn choice(tag: &str) -> String {
    format!(r#"{{"result": "{tag}"}}"#)
}

/// A lookup answering from a fixed table and recording every query.
#[derive(Default)]
pub struct ScriptedLookup {
    answers: HashMap<String, Result<String, LookupError>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: &str, extract: &str) -> Self {
        self.answers.insert(query.into(), Ok(extract.into()));
        self
    }

    pub fn fail(mut self, query: &str, error: LookupError) -> Self {
        self.answers.insert(query.into(), Err(error));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeLookup for ScriptedLookup {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answers
            .get(query)
            .cloned()
            .unwrap_or_else(|| {
                Err(LookupError::NotFound {
                    query: query.to_string(),
                })
            })
    }
}
