use console::style;

use crate::types::{ClassificationRecord, ErrorInfo};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn record(&self, record: &ClassificationRecord) {
        println!("  {:<8} {}", style("Sector").dim(), record.sector);
        println!("  {:<8} {}", style("Product").dim(), style(&record.product).cyan());
        println!("  {:<8} {}", style("Details").dim(), record.details_line());
    }

    pub fn failure(&self, error: &ErrorInfo) {
        self.error(&format!("{} {}", style(error.category).yellow(), error.message));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
