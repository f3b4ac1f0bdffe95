//! The ReAct controller: the heart of Stepwise.
//!
//! A run alternates the model between two modes over a single transcript:
//!
//! 1. **Choose a mode** with constrained generation (`Tho` or `Act`)
//! 2. **Think**: generate one free line and append it
//! 3. **Act**: choose `Search` or `Finish`, generate the quoted argument
//! 4. **Observe**: for `Search`, append the lookup's summary
//!
//! The loop ends on the first `Finish` or when the step budget runs out.

pub mod generator;
pub mod prompt;
pub mod react;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use generator::{ConstrainedGenerator, FreeTextGenerator};
pub use prompt::{FEW_SHOT_PREAMBLE, seed_prompt};
pub use react::{ARGUMENT_WORDS, ReactController, RunOutcome, RunReport, truncate_words};
