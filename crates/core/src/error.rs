//! Error types for the Stepwise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum; the controller
//! propagates them unchanged through the top-level [`Error`].

use thiserror::Error;

/// The top-level error type for all Stepwise operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model backend errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Constrained generation ---
    #[error("Schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    // --- Knowledge lookup ---
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    // --- Run outcome ---
    #[error("Step budget exhausted after {max_steps} steps without a Finish action")]
    StepBudgetExhausted { max_steps: u32 },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Constrained output that does not fit its declared enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("output is not valid JSON ({reason}): {raw:?}")]
    Unparseable { raw: String, reason: String },

    #[error("field '{field}' missing or not a string in {raw:?}")]
    MissingField { field: String, raw: String },

    #[error("value {value:?} for '{field}' is not one of {allowed:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no entry found for '{query}'")]
    NotFound { query: String },

    #[error("malformed lookup response: {0}")]
    Malformed(String),

    #[error("lookup request failed: {0}")]
    Network(String),

    #[error("lookup service returned status {status_code}: {message}")]
    Api { status_code: u16, message: String },
}
