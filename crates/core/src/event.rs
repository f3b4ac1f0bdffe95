//! Domain event system: decoupled observation of a run.
//!
//! The controller publishes an event at every state transition. Subscribers
//! (the CLI progress printer, tests) can follow a run without touching the
//! transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::step::{Action, Mode};

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A run began
    RunStarted {
        run_id: String,
        model: String,
        max_steps: u32,
        timestamp: DateTime<Utc>,
    },

    /// Constrained generation picked the mode of a step
    ModeChosen {
        run_id: String,
        step: u32,
        mode: Mode,
        timestamp: DateTime<Utc>,
    },

    /// A thought was appended
    ThoughtRecorded {
        run_id: String,
        step: u32,
        thought: String,
        timestamp: DateTime<Utc>,
    },

    /// An action and its (truncated) argument were appended
    ActionChosen {
        run_id: String,
        step: u32,
        action: Action,
        argument: String,
        timestamp: DateTime<Utc>,
    },

    /// A lookup result was appended
    ObservationRecorded {
        run_id: String,
        step: u32,
        chars: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The model produced a completion
    ResponseGenerated {
        run_id: String,
        model: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// The run ended, answered or not
    RunFinished {
        run_id: String,
        answered: bool,
        steps: u32,
        timestamp: DateTime<Utc>,
    },

    /// An error occurred
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
