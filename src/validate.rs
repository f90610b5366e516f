//! Semantic validation of PXL text.
//!
//! Validation parses the input literal by literal and cross-checks the
//! resulting objects in source order: color literals, palette references,
//! region tokens, duplicate names. Problems are collected as diagnostics,
//! never raised - a corpus with some malformed objects still validates the
//! rest.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::color::parse_rgba;
use crate::models::PxlObject;
use crate::parser::split_literals;

const KNOWN_TYPES: [&str; 4] = ["palette", "sprite", "variant", "animation"];

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// One diagnostic: severity, message, optional 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub line: Option<usize>,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, line: Some(line), message: message.into() }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, line: Some(line), message: message.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: line {}: {}", self.severity, line, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Validate PXL text, returning formatted diagnostics in source order.
/// Valid input yields an empty list.
pub fn validate(input: &str) -> Vec<String> {
    validate_issues(input).iter().map(ToString::to_string).collect()
}

/// Validate PXL text, returning structured diagnostics.
pub fn validate_issues(input: &str) -> Vec<ValidationIssue> {
    let mut validator = Validator::default();
    let mut issues = Vec::new();
    for literal in split_literals(input) {
        validator.check_literal(literal.line, &literal.text, &mut issues);
    }
    issues
}

/// Validate a file's contents. An unreadable path is a filesystem error,
/// not a diagnostic.
pub fn validate_file(path: &Path) -> std::io::Result<Vec<String>> {
    let input = std::fs::read_to_string(path)?;
    Ok(validate(&input))
}

/// Single-pass validator state: palettes and names seen so far.
#[derive(Debug, Default)]
struct Validator {
    /// palette name -> its token set
    palettes: HashMap<String, HashSet<String>>,
    sprites: HashSet<String>,
    variants: HashSet<String>,
    animations: HashSet<String>,
}

impl Validator {
    fn check_literal(&mut self, line: usize, text: &str, issues: &mut Vec<ValidationIssue>) {
        let value: Value = match json5::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                issues.push(ValidationIssue::error(line, e.to_string()));
                return;
            }
        };

        let Some(object) = value.as_object() else {
            issues.push(ValidationIssue::error(line, "Expected an object literal"));
            return;
        };

        let type_name = match object.get("type") {
            None => {
                issues.push(ValidationIssue::error(line, "Missing required \"type\" field"));
                return;
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                issues.push(ValidationIssue::error(line, "\"type\" field must be a string"));
                return;
            }
        };

        if !KNOWN_TYPES.contains(&type_name.as_str()) {
            issues.push(ValidationIssue::warning(
                line,
                format!(
                    "Unknown type \"{}\" (expected one of: {})",
                    type_name,
                    KNOWN_TYPES.join(", ")
                ),
            ));
            return;
        }

        let typed: PxlObject = match json5::from_str(text) {
            Ok(typed) => typed,
            Err(e) => {
                issues.push(ValidationIssue::error(line, e.to_string()));
                return;
            }
        };

        match typed {
            PxlObject::Palette(palette) => {
                if self.palettes.contains_key(&palette.name) {
                    issues.push(ValidationIssue::warning(
                        line,
                        format!("Duplicate palette name \"{}\"", palette.name),
                    ));
                }
                for (token, literal) in &palette.colors {
                    if let Err(e) = parse_rgba(literal) {
                        issues.push(ValidationIssue::error(
                            line,
                            format!("Invalid color \"{}\" for token {}: {}", literal, token, e),
                        ));
                    }
                }
                self.palettes
                    .insert(palette.name.clone(), palette.colors.keys().cloned().collect());
            }
            PxlObject::Sprite(sprite) => {
                if !self.sprites.insert(sprite.name.clone()) {
                    issues.push(ValidationIssue::warning(
                        line,
                        format!("Duplicate sprite name \"{}\"", sprite.name),
                    ));
                }
                let tokens: Option<HashSet<String>> = match &sprite.palette {
                    crate::models::PaletteRef::Named(name) => {
                        if let Some(tokens) = self.palettes.get(name) {
                            Some(tokens.clone())
                        } else {
                            issues.push(ValidationIssue::warning(
                                line,
                                format!("Palette \"{}\" not defined", name),
                            ));
                            None
                        }
                    }
                    crate::models::PaletteRef::Inline(colors) => {
                        for (token, literal) in colors {
                            if let Err(e) = parse_rgba(literal) {
                                issues.push(ValidationIssue::error(
                                    line,
                                    format!(
                                        "Invalid color \"{}\" for token {}: {}",
                                        literal, token, e
                                    ),
                                ));
                            }
                        }
                        Some(colors.keys().cloned().collect())
                    }
                };
                if let Some(tokens) = tokens {
                    for token in sprite.regions.keys() {
                        if !tokens.contains(token) {
                            let mut message = format!("Undefined token {}", token);
                            if let Some(suggestion) = suggest_token(token, &tokens) {
                                message.push_str(&format!(" (did you mean {}?)", suggestion));
                            }
                            issues.push(ValidationIssue::warning(line, message));
                        }
                    }
                }
            }
            PxlObject::Variant(variant) => {
                if !self.variants.insert(variant.name.clone()) {
                    issues.push(ValidationIssue::warning(
                        line,
                        format!("Duplicate variant name \"{}\"", variant.name),
                    ));
                }
                if !self.sprites.contains(&variant.base) && !self.variants.contains(&variant.base)
                {
                    issues.push(ValidationIssue::warning(
                        line,
                        format!("Sprite \"{}\" not defined", variant.base),
                    ));
                }
                for (token, literal) in &variant.palette {
                    if let Err(e) = parse_rgba(literal) {
                        issues.push(ValidationIssue::error(
                            line,
                            format!("Invalid color \"{}\" for token {}: {}", literal, token, e),
                        ));
                    }
                }
            }
            PxlObject::Animation(animation) => {
                if !self.animations.insert(animation.name.clone()) {
                    issues.push(ValidationIssue::warning(
                        line,
                        format!("Duplicate animation name \"{}\"", animation.name),
                    ));
                }
                for frame in &animation.frames {
                    if !self.sprites.contains(frame) && !self.variants.contains(frame) {
                        issues.push(ValidationIssue::warning(
                            line,
                            format!("Sprite \"{}\" not defined", frame),
                        ));
                    }
                }
            }
        }
    }
}

/// Suggest the closest known token (edit distance at most 2).
fn suggest_token(token: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|candidate| (edit_distance(token, candidate), candidate))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, candidate)| (*distance, candidate.to_string()))
        .map(|(_, candidate)| candidate.clone())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_corpus_yields_no_diagnostics() {
        let input = concat!(
            r##"{"type": "palette", "name": "p", "colors": {"x": "#ff0000"}}"##,
            "\n",
            r##"{"type": "sprite", "name": "s", "size": [2, 2], "palette": "p", "regions": {"x": {"rect": [0, 0, 2, 2]}}}"##,
        );
        assert!(validate(input).is_empty());
    }

    #[test]
    fn missing_type_is_an_error() {
        let diagnostics = validate(r#"{"name": "test"}"#);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("ERROR"));
        assert!(diagnostics[0].contains("type"));
    }

    #[test]
    fn unknown_type_is_a_warning_with_value() {
        let diagnostics = validate(r#"{"type": "widget", "name": "w"}"#);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("WARNING"));
        assert!(diagnostics[0].contains("widget"));
    }

    #[test]
    fn bad_color_names_the_token() {
        let diagnostics =
            validate(r##"{"type": "palette", "name": "p", "colors": {"x": "#zzz"}}"##);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("ERROR"));
        assert!(diagnostics[0].contains("token x"));
    }

    #[test]
    fn undefined_token_warns() {
        let input = r##"{"type": "sprite", "name": "s", "size": [1, 1], "palette": {"body": "#ff0000"}, "regions": {"bodi": {"points": [[0, 0]]}}}"##;
        let diagnostics = validate(input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Undefined token bodi"));
        assert!(diagnostics[0].contains("did you mean body"));
    }

    #[test]
    fn missing_named_palette_warns() {
        let input = r##"{"type": "sprite", "name": "s", "size": [1, 1], "palette": "ghost", "regions": {}}"##;
        let diagnostics = validate(input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Palette \"ghost\" not defined"));
    }

    #[test]
    fn duplicate_names_warn() {
        let input = concat!(
            r##"{"type": "palette", "name": "dup", "colors": {}}"##,
            "\n",
            r##"{"type": "palette", "name": "dup", "colors": {}}"##,
        );
        let diagnostics = validate(input);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Duplicate"));
    }

    #[test]
    fn diagnostics_carry_line_numbers_in_source_order() {
        let input = concat!(
            r#"{"name": "no-type"}"#,
            "\n",
            r##"{"type": "sprite", "name": "s", "size": [1, 1], "palette": "ghost", "regions": {}}"##,
        );
        let issues = validate_issues(input);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, Some(1));
        assert_eq!(issues[1].line, Some(2));
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[1].severity, Severity::Warning);
    }

    #[test]
    fn variant_base_and_animation_frames_are_checked() {
        let input = concat!(
            r##"{"type": "variant", "name": "v", "base": "missing", "palette": {}}"##,
            "\n",
            r##"{"type": "animation", "name": "a", "frames": ["also_missing"], "duration": 100}"##,
        );
        let diagnostics = validate(input);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.contains("not defined")));
    }

    #[test]
    fn empty_input_is_valid() {
        assert!(validate("").is_empty());
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("body", "body"), 0);
        assert_eq!(edit_distance("bodi", "body"), 1);
        assert_eq!(edit_distance("a", "xyz"), 3);
    }
}
