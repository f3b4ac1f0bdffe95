//! # Stepwise Core
//!
//! Domain types, traits, and error definitions for the Stepwise ReAct
//! controller. This crate has **no I/O of its own**; it defines the domain
//! model that the provider, lookup and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: the language-model backend
//! - [`KnowledgeLookup`]: the title-keyed summary source
//!
//! Implementations live in their respective crates, which keeps the
//! controller testable with scripted stand-ins.

pub mod error;
pub mod event;
pub mod lookup;
pub mod message;
pub mod provider;
pub mod schema;
pub mod step;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use error::{Error, LookupError, ProviderError, Result, SchemaViolation};
pub use event::{DomainEvent, EventBus};
pub use lookup::{KnowledgeLookup, leading_sentences};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
pub use schema::{Choice, EnumSchema};
pub use step::{Action, Mode, Step, StepPayload};
pub use transcript::{Segment, SegmentKind, Transcript};
