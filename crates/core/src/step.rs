//! Step types: what happened in one iteration of the ReAct loop.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::Choice;

/// Per-step choice between reasoning and tool use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Thought,
    Act,
}

impl Choice for Mode {
    const SCHEMA_NAME: &'static str = "mode";
    const VARIANTS: &'static [Self] = &[Mode::Thought, Mode::Act];

    fn tag(self) -> &'static str {
        match self {
            Mode::Thought => "Tho",
            Mode::Act => "Act",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-Act-step choice between querying the lookup and answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Search,
    Finish,
}

impl Choice for Action {
    const SCHEMA_NAME: &'static str = "action";
    const VARIANTS: &'static [Self] = &[Action::Search, Action::Finish];

    fn tag(self) -> &'static str {
        match self {
            Action::Search => "Search",
            Action::Finish => "Finish",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single iteration of the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based sequence number.
    pub index: u32,
    pub payload: StepPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StepPayload {
    Thought {
        text: String,
    },
    Act {
        action: Action,
        argument: String,
        /// Present only for [`Action::Search`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        observation: Option<String>,
    },
}

impl Step {
    pub fn mode(&self) -> Mode {
        match self.payload {
            StepPayload::Thought { .. } => Mode::Thought,
            StepPayload::Act { .. } => Mode::Act,
        }
    }
}
