//! Shared utility functions for text handling.

// =============================================================================
// Text Truncation
// =============================================================================

/// Keep at most `max_chars` characters, never splitting a code point.
///
/// Mirrors the plain slice cap callers apply to page text before
/// classification; no ellipsis or marker is appended.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    }
}

// =============================================================================
// Token Estimation
// =============================================================================

/// Rough token estimation used when a provider does not report usage
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    /// Characters per token for ASCII text (default: 4.0)
    pub ascii_chars_per_token: f32,
    /// Characters per token for non-ASCII text (default: 1.5)
    pub non_ascii_chars_per_token: f32,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            ascii_chars_per_token: 4.0,
            non_ascii_chars_per_token: 1.5,
        }
    }
}

impl TokenEstimator {
    /// Estimate token count for content
    pub fn estimate(&self, content: &str) -> usize {
        if content.is_empty() {
            return 0;
        }

        let (ascii_chars, non_ascii_chars) =
            content
                .chars()
                .fold((0usize, 0usize), |(a, n), c| {
                    if c.is_ascii() { (a + 1, n) } else { (a, n + 1) }
                });

        let ascii_tokens = (ascii_chars as f32 / self.ascii_chars_per_token) as usize;
        let non_ascii_tokens = (non_ascii_chars as f32 / self.non_ascii_chars_per_token) as usize;

        (ascii_tokens + non_ascii_tokens).max(1)
    }
}

/// Estimate token count from content (convenience function)
#[inline]
pub fn estimate_tokens(content: &str) -> usize {
    TokenEstimator::default().estimate(content)
}
