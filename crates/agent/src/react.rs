//! ReAct controller: Thought, Act, Observe over one growing transcript.
//!
//! Each step the model first picks a [`Mode`] under a constrained schema.
//! A thought step then generates one free line. An act step picks an
//! [`Action`] under a second schema and generates its quoted argument;
//! `Search` feeds the argument to the knowledge lookup and appends the
//! observation, `Finish` ends the run with the argument as the answer.
//!
//! # Trace Format
//!
//! ```text
//! <seed>
//! Tho 1: I need to search Apple Computers.
//! Act 2: Search 'Apple Computers'
//! Obs 2: Apple Inc. is an American multinational technology company...
//! Act 3: Finish 'Cupertino California'
//! ```
//!
//! Every model call sees exactly the rendered transcript at that moment.
//! Failures of the model or the lookup end the run immediately; nothing is
//! retried and no partial transcript is returned.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use stepwise_config::AppConfig;
use stepwise_core::error::{Error, Result};
use stepwise_core::event::{DomainEvent, EventBus};
use stepwise_core::lookup::KnowledgeLookup;
use stepwise_core::provider::Provider;
use stepwise_core::step::{Action, Mode, Step, StepPayload};
use stepwise_core::transcript::{ARGUMENT_QUOTE, Transcript};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::generator::{ConstrainedGenerator, FreeTextGenerator};
use crate::prompt::seed_prompt;

/// Words kept from every generated action argument.
pub const ARGUMENT_WORDS: usize = 2;

/// Thoughts run to the end of their line.
const THOUGHT_STOP: &str = "\n";

pub const DEFAULT_MAX_STEPS: u32 = 9;
pub const DEFAULT_MAX_TOKENS: u32 = 128;

pub struct ReactController {
    constrained: ConstrainedGenerator,
    free_text: FreeTextGenerator,
    lookup: Arc<dyn KnowledgeLookup>,
    /// Step budget; the loop never runs more steps than this.
    max_steps: u32,
    /// Token budget applied to every model call.
    max_tokens: u32,
    few_shot: bool,
    event_bus: Option<Arc<EventBus>>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A `Finish` action was produced.
    Answered { answer: String },
    /// The step budget ran out first.
    Exhausted { max_steps: u32 },
}

/// The result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    /// One entry per executed step, in order.
    pub steps: Vec<Step>,
    /// The frozen transcript.
    pub transcript: Transcript,
}

impl RunReport {
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Answered { answer } => Some(answer),
            RunOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.outcome, RunOutcome::Answered { .. })
    }

    /// The answer, or [`Error::StepBudgetExhausted`] if there is none.
    pub fn into_answer(self) -> Result<String> {
        match self.outcome {
            RunOutcome::Answered { answer } => Ok(answer),
            RunOutcome::Exhausted { max_steps } => Err(Error::StepBudgetExhausted { max_steps }),
        }
    }
}

impl ReactController {
    /// Create a controller with the default step and token budgets.
    pub fn new(
        provider: Arc<dyn Provider>,
        lookup: Arc<dyn KnowledgeLookup>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let model = model.into();
        Self {
            constrained: ConstrainedGenerator::new(provider.clone(), model.clone(), temperature),
            free_text: FreeTextGenerator::new(provider, model, temperature),
            lookup,
            max_steps: DEFAULT_MAX_STEPS,
            max_tokens: DEFAULT_MAX_TOKENS,
            few_shot: true,
            event_bus: None,
        }
    }

    /// Create a controller using the model, sampling and budget settings in `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        lookup: Arc<dyn KnowledgeLookup>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            provider,
            lookup,
            &config.default_model,
            config.default_temperature,
        )
        .with_max_steps(config.react.max_steps)
        .with_max_tokens(config.default_max_tokens)
        .with_few_shot(config.react.few_shot)
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    /// Set the token budget of each model call.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Whether [`ask`](Self::ask) prepends the worked example.
    pub fn with_few_shot(mut self, enabled: bool) -> Self {
        self.few_shot = enabled;
        self
    }

    /// Publish run progress to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn model(&self) -> &str {
        self.constrained.model()
    }

    /// Answer `question`, seeding the transcript with the configured prompt.
    pub async fn ask(&self, question: &str) -> Result<RunReport> {
        self.run(seed_prompt(question, self.few_shot)).await
    }

    /// Run the loop over a transcript starting from `seed`.
    pub async fn run(&self, seed: impl Into<String>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let mut transcript = Transcript::new(seed);
        let mut steps = Vec::new();
        let tokens_before = self.tokens_used();

        info!(
            %run_id,
            model = self.model(),
            max_steps = self.max_steps,
            lookup = self.lookup.name(),
            "Starting ReAct run"
        );
        self.publish(DomainEvent::RunStarted {
            run_id: run_id.to_string(),
            model: self.model().to_string(),
            max_steps: self.max_steps,
            timestamp: Utc::now(),
        });

        let outcome = match self.drive(run_id, &mut transcript, &mut steps).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%run_id, step = steps.len() + 1, "ReAct run aborted: {e}");
                self.publish(DomainEvent::ErrorOccurred {
                    context: format!("react run {run_id}"),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        self.publish(DomainEvent::ResponseGenerated {
            run_id: run_id.to_string(),
            model: self.model().to_string(),
            tokens_used: self.tokens_used().saturating_sub(tokens_before),
            timestamp: Utc::now(),
        });
        self.publish(DomainEvent::RunFinished {
            run_id: run_id.to_string(),
            answered: matches!(outcome, RunOutcome::Answered { .. }),
            steps: steps.len() as u32,
            timestamp: Utc::now(),
        });

        Ok(RunReport {
            run_id,
            outcome,
            steps,
            transcript,
        })
    }

    async fn drive(
        &self,
        run_id: Uuid,
        transcript: &mut Transcript,
        steps: &mut Vec<Step>,
    ) -> Result<RunOutcome> {
        let run = run_id.to_string();

        for index in 1..=self.max_steps {
            let mode: Mode = self
                .constrained
                .choose(&transcript.render(), self.max_tokens)
                .await?;
            debug!(step = index, %mode, "Mode chosen");
            transcript.open_step(index, mode);
            self.publish(DomainEvent::ModeChosen {
                run_id: run.clone(),
                step: index,
                mode,
                timestamp: Utc::now(),
            });

            match mode {
                Mode::Thought => {
                    let thought = self
                        .free_text
                        .generate(&transcript.render(), &[THOUGHT_STOP], self.max_tokens)
                        .await?;
                    transcript.record_thought(index, &thought);
                    self.publish(DomainEvent::ThoughtRecorded {
                        run_id: run.clone(),
                        step: index,
                        thought: thought.clone(),
                        timestamp: Utc::now(),
                    });
                    steps.push(Step {
                        index,
                        payload: StepPayload::Thought { text: thought },
                    });
                }
                Mode::Act => {
                    let action: Action = self
                        .constrained
                        .choose(&transcript.render(), self.max_tokens)
                        .await?;
                    transcript.record_action(index, action);

                    let quote = ARGUMENT_QUOTE.to_string();
                    let raw = self
                        .free_text
                        .generate(&transcript.render(), &[quote.as_str()], self.max_tokens)
                        .await?;
                    let argument = truncate_words(&raw, ARGUMENT_WORDS);
                    transcript.record_argument(index, &argument);

                    debug!(step = index, %action, argument = %argument, "Action chosen");
                    self.publish(DomainEvent::ActionChosen {
                        run_id: run.clone(),
                        step: index,
                        action,
                        argument: argument.clone(),
                        timestamp: Utc::now(),
                    });

                    match action {
                        Action::Search => {
                            let started = Instant::now();
                            let observation = self.lookup.lookup(&argument).await?;
                            transcript.record_observation(index, &observation);
                            self.publish(DomainEvent::ObservationRecorded {
                                run_id: run.clone(),
                                step: index,
                                chars: observation.chars().count(),
                                duration_ms: started.elapsed().as_millis() as u64,
                                timestamp: Utc::now(),
                            });
                            steps.push(Step {
                                index,
                                payload: StepPayload::Act {
                                    action,
                                    argument,
                                    observation: Some(observation),
                                },
                            });
                        }
                        Action::Finish => {
                            info!(%run_id, steps = index, answer = %argument, "ReAct run answered");
                            steps.push(Step {
                                index,
                                payload: StepPayload::Act {
                                    action,
                                    argument: argument.clone(),
                                    observation: None,
                                },
                            });
                            return Ok(RunOutcome::Answered { answer: argument });
                        }
                    }
                }
            }
        }

        warn!(
            %run_id,
            max_steps = self.max_steps,
            "Step budget exhausted without a Finish action"
        );
        Ok(RunOutcome::Exhausted {
            max_steps: self.max_steps,
        })
    }

    fn tokens_used(&self) -> u32 {
        self.constrained
            .tokens_used()
            .saturating_add(self.free_text.tokens_used())
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

/// The first `count` whitespace-delimited words of `raw`, joined by single spaces.
pub fn truncate_words(raw: &str, count: usize) -> String {
    raw.split_whitespace()
        .take(count)
        .collect::<Vec<_>>()
        .join(" ")
}
