//! Classification Record
//!
//! The single output contract shared by the generative pipeline and the
//! keyword heuristic.

use serde::{Deserialize, Serialize};

/// Sector, product and supporting details extracted from a bank page.
///
/// `details` is always a list internally; single-string answers are
/// normalized at the parser boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Coarse category, e.g. "Personal Banking" or "Businesses"
    pub sector: String,
    /// Specific offering, e.g. "Credit Cards"
    pub product: String,
    /// Supporting evidence or feature summary
    pub details: Vec<String>,
}

impl ClassificationRecord {
    pub fn new(sector: impl Into<String>, product: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            sector: sector.into(),
            product: product.into(),
            details,
        }
    }

    /// Details joined for single-line display
    pub fn details_line(&self) -> String {
        self.details.join(", ")
    }

    /// Fields whose text exceeds `max_words` words.
    ///
    /// Prompts ask for short answers, but the limit is advisory only.
    pub fn word_limit_violations(&self, max_words: usize) -> Vec<&'static str> {
        let over = |s: &str| s.split_whitespace().count() > max_words;
        let mut fields = Vec::new();
        if over(&self.sector) {
            fields.push("sector");
        }
        if over(&self.product) {
            fields.push("product");
        }
        if self.details.iter().any(|d| over(d)) {
            fields.push("details");
        }
        fields
    }
}

impl std::fmt::Display for ClassificationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sector: {}\nProduct: {}\nDetails: {}",
            self.sector,
            self.product,
            self.details_line()
        )
    }
}
