//! JSON Extraction
//!
//! Locates the JSON object inside a raw completion. Models commonly wrap
//! their answer in markdown fences or surround it with a sentence of prose;
//! both are tolerated here. Broken JSON is not patched: that is left to the
//! repair prompt.

/// Normalize raw completion text: trim, drop BOM and code fences.
pub fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    strip_code_fences(s).trim().to_string()
}

/// Strip a leading ```` ```json ```` line and a trailing ```` ``` ````
fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = &result[first_newline + 1..];
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped.trim_end();
    }

    result
}

/// Find the first balanced `{ ... }` in mixed content that decodes as a
/// JSON object.
///
/// Each `{` is tried in turn, so a stray brace in leading prose does not hide
/// a later object. Brace counting ignores braces inside string literals.
pub fn extract_object_from_mixed(s: &str) -> Option<&str> {
    s.match_indices('{')
        .filter_map(|(start, _)| balanced_object_at(s, start))
        .find(|candidate| {
            serde_json::from_str::<serde_json::Value>(candidate).is_ok_and(|v| v.is_object())
        })
}

/// The balanced `{ ... }` starting at byte `start`, if it closes
fn balanced_object_at(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_strips_fences() {
        let input = "```json\n{\"sector\": \"Retail\"}\n```";
        assert_eq!(preprocess(input), "{\"sector\": \"Retail\"}");
    }

    #[test]
    fn test_preprocess_strips_bom_and_whitespace() {
        let input = "\u{feff}  {\"a\": 1}  \n";
        assert_eq!(preprocess(input), "{\"a\": 1}");
    }

    #[test]
    fn test_preprocess_plain_text_unchanged() {
        assert_eq!(preprocess("no json here"), "no json here");
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = r#"Sure! Here is the answer: {"sector": "Retail", "details": ["a}b"]} Hope this helps!"#;
        assert_eq!(
            extract_object_from_mixed(input),
            Some(r#"{"sector": "Retail", "details": ["a}b"]}"#)
        );
    }

    #[test]
    fn test_extract_nested() {
        let input = r#"x {"a": {"b": 1}} y"#;
        assert_eq!(extract_object_from_mixed(input), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_extract_unbalanced_returns_none() {
        assert_eq!(extract_object_from_mixed(r#"{"a": 1"#), None);
        assert_eq!(extract_object_from_mixed("no braces"), None);
    }

    #[test]
    fn test_extract_skips_stray_brace_in_prose() {
        let input = r#"Note {see below: {"sector": "A", "product": "B", "details": []}"#;
        assert_eq!(
            extract_object_from_mixed(input),
            Some(r#"{"sector": "A", "product": "B", "details": []}"#)
        );
    }

    #[test]
    fn test_extract_skips_balanced_non_json() {
        let input = r#"Use {placeholders} like this: {"sector": "A"}"#;
        assert_eq!(extract_object_from_mixed(input), Some(r#"{"sector": "A"}"#));
    }
}
