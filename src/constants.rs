//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Page content limits
pub mod content {
    /// Maximum characters of page text sent to the generative pipeline
    pub const MAX_SITE_CONTENT_CHARS: usize = 10_000;

    /// Advisory word limit per field stated in the classification prompts
    pub const MAX_WORDS_PER_FIELD: usize = 4;
}

/// Heuristic classifier literals
pub mod heuristic {
    /// Sector reported by the keyword heuristic, independent of content
    pub const SECTOR: &str = "Private";

    /// Product and detail value used when no keyword matched
    pub const UNKNOWN: &str = "Unknown";
}

/// Schema literals
pub mod schema {
    /// Sentinel product value allowed alongside a closed product catalog
    pub const NOT_APPLICABLE: &str = "Not applicable";
}

/// Network constants
pub mod network {
    /// Default request timeout for generative service calls (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// OpenAI list prices
pub mod pricing {
    /// `(model prefix, input USD per 1M tokens, output USD per 1M tokens)`.
    /// Dated snapshots resolve to their longest matching prefix.
    pub const OPENAI_MODEL_PRICES: &[(&str, f64, f64)] = &[
        ("gpt-4o-mini", 0.15, 0.60),
        ("gpt-4o", 2.50, 10.00),
        ("gpt-4.1-nano", 0.10, 0.40),
        ("gpt-4.1-mini", 0.40, 1.60),
        ("gpt-4.1", 2.00, 8.00),
        ("gpt-4-turbo", 10.00, 30.00),
        ("gpt-4", 30.00, 60.00),
        ("gpt-3.5-turbo", 0.50, 1.50),
    ];
}
