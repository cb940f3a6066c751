//! Prompt Templates
//!
//! Immutable `{placeholder}` templates for the classification prompts.
//!
//! Templates are parsed once into literal and variable segments, so values
//! containing braces (JSON format instructions, page text) are inserted
//! verbatim and never re-scanned. Literal braces are written `{{` and `}}`.

mod templates;

pub use templates::PromptTemplates;

use crate::types::{BankscopeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A template plus the named placeholders it requires
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    input_variables: Vec<String>,
    partial_variables: Vec<(String, String)>,
}

impl PromptTemplate {
    /// Parse a template, collecting its placeholders in first-use order
    pub fn new(template: &str) -> Result<Self> {
        let segments = parse_segments(template)?;
        let mut input_variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment
                && !input_variables.contains(name)
            {
                input_variables.push(name.clone());
            }
        }

        Ok(Self {
            segments,
            input_variables,
            partial_variables: Vec::new(),
        })
    }

    /// Pre-bind a variable (e.g. `format_instructions`)
    pub fn partial(mut self, name: &str, value: impl Into<String>) -> Result<Self> {
        if !self.input_variables.iter().any(|v| v == name) {
            return Err(BankscopeError::Config(format!(
                "Template has no placeholder '{}'",
                name
            )));
        }
        self.partial_variables.retain(|(n, _)| n != name);
        self.partial_variables.push((name.to_string(), value.into()));
        Ok(self)
    }

    /// Placeholders still required at format time
    pub fn input_variables(&self) -> Vec<&str> {
        self.input_variables
            .iter()
            .filter(|v| !self.partial_variables.iter().any(|(n, _)| n == *v))
            .map(String::as_str)
            .collect()
    }

    /// Render the template. Call-site values override partials.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut prompt = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .iter()
                        .find(|(n, _)| *n == name.as_str())
                        .map(|(_, v)| *v)
                        .or_else(|| {
                            self.partial_variables
                                .iter()
                                .find(|(n, _)| n == name)
                                .map(|(_, v)| v.as_str())
                        })
                        .ok_or_else(|| {
                            BankscopeError::Config(format!(
                                "Missing value for prompt variable '{}'",
                                name
                            ))
                        })?;
                    prompt.push_str(value);
                }
            }
        }

        Ok(prompt)
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
                        Some(c) => {
                            return Err(BankscopeError::Config(format!(
                                "Invalid character '{}' in placeholder '{{{}'",
                                c, name
                            )));
                        }
                        None => {
                            return Err(BankscopeError::Config(format!(
                                "Unclosed placeholder '{{{}'",
                                name
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(BankscopeError::Config("Empty placeholder '{}'".to_string()));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(BankscopeError::Config(
                    "Unmatched '}' in template (use '}}' for a literal brace)".to_string(),
                ));
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
