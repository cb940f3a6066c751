//! Unified Error Type System
//!
//! Centralized error types for the classification core.
//!
//! ## Error Taxonomy
//!
//! - **ServiceError** (`Llm` / `LlmApi`): the generative service call failed.
//!   Never retried by the core.
//! - **ParseError** (`Parse`): model output did not match the record schema.
//!   Handled once by the repair loop, then surfaced unchanged.
//! - **ConfigError** (`Config`): missing or malformed configuration or
//!   keyword dictionary. Fatal at startup.
//!
//! Front-ends never see a raw `BankscopeError` from the generative entry
//! point: it is flattened into an [`ErrorInfo`] value first.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used to label failures for callers and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Rate limited or quota exhausted
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Model output did not conform to the schema
    ParseError,
    /// Configuration or dictionary problem
    Config,
    /// Operation exceeded its deadline
    Timeout,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Config => write!(f, "CONFIG"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error (ServiceError)
// =============================================================================

/// Generative service failure with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for reporting
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Assigns categories to raw provider failures
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("auth")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connect")
            || lower.contains("dns")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("500")
            || lower.contains("service unavailable")
            || lower.contains("server error")
            || lower.contains("not found")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("invalid") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("overloaded") || lower.contains("temporar") {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }
}

// =============================================================================
// Parse Error
// =============================================================================

/// Model output that does not conform to the record schema.
///
/// Carries the raw text verbatim so the repair prompt can quote it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The text that failed to parse
    pub raw: String,
    /// Human-readable reason
    pub reason: String,
}

impl ParseError {
    pub fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Short preview of the offending text for log lines
    pub fn preview(&self) -> String {
        let preview: String = self.raw.chars().take(120).collect();
        if self.raw.chars().count() > 120 {
            format!("{}...", preview)
        } else {
            preview
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to parse classification from completion: {}. Got: {}",
            self.reason,
            self.preview()
        )
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum BankscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Structured generative service error
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Simple generative service error (transport-level)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("{0}")]
    Parse(ParseError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

impl From<LlmError> for BankscopeError {
    fn from(err: LlmError) -> Self {
        BankscopeError::Llm(err)
    }
}

impl From<ParseError> for BankscopeError {
    fn from(err: ParseError) -> Self {
        BankscopeError::Parse(err)
    }
}

pub type Result<T> = std::result::Result<T, BankscopeError>;

impl BankscopeError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Category used when the error crosses the public boundary
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Llm(e) => e.category,
            Self::LlmApi(msg) => ErrorClassifier::classify(msg, "unknown").category,
            Self::Parse(_) => ErrorCategory::ParseError,
            Self::Config(_) | Self::Yaml(_) => ErrorCategory::Config,
            Self::Json(_) => ErrorCategory::ParseError,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Wrap any error as a configuration error with context
    fn config_context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn config_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| BankscopeError::Config(format!("{}: {}", context.into(), e)))
    }
}

// =============================================================================
// Boundary Error Value
// =============================================================================

/// Error value returned across the public boundary instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub category: ErrorCategory,
    pub message: String,
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

impl From<BankscopeError> for ErrorInfo {
    fn from(err: BankscopeError) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
