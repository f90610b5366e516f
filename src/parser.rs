//! Tolerant parsing of PXL text into typed objects.
//!
//! Input is a sequence of whitespace-separated relaxed-JSON (JSON5) object
//! literals, each carrying a `type` discriminator. Literals may be
//! pretty-printed across lines; boundary detection tracks brace/bracket
//! nesting, string state and comments to find the end of each top-level
//! literal. A malformed literal becomes one warning at its starting line
//! and scanning resumes at the next literal - one bad object never aborts
//! the batch.

use std::io::Read;

use thiserror::Error;

use crate::models::{PxlObject, Warning};

/// Error for a single literal that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Result of parsing a PXL stream: objects in source order plus warnings
/// for literals that could not be parsed.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub objects: Vec<PxlObject>,
    pub warnings: Vec<Warning>,
}

/// One top-level literal, with the 1-based line where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Literal {
    pub line: usize,
    pub text: String,
}

/// Parse a single object literal known to sit on `line_number`.
pub fn parse_line(line: &str, line_number: usize) -> Result<PxlObject, ParseError> {
    json5::from_str(line)
        .map_err(|e| ParseError { line: line_number, message: e.to_string() })
}

/// Parse a full PXL text. Empty input yields an empty result.
pub fn parse(input: &str) -> ParseResult {
    let mut result = ParseResult::default();
    for literal in split_literals(input) {
        match parse_line(&literal.text, literal.line) {
            Ok(object) => result.objects.push(object),
            Err(e) => result.warnings.push(Warning::new(e.message, e.line)),
        }
    }
    result
}

/// Parse a PXL stream from any reader.
pub fn parse_stream<R: Read>(mut reader: R) -> std::io::Result<ParseResult> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(parse(input.as_str()))
}

/// Split input into top-level literals with their starting lines.
///
/// Tracks brace/bracket depth, single/double-quoted strings with escapes,
/// and `//` / `/* */` comments so that braces inside strings or comments
/// do not affect nesting. A literal closes as soon as depth returns to
/// zero, so several literals may share one line, separated by whitespace.
/// An unterminated literal at EOF is returned as-is and will surface as a
/// parse warning.
pub(crate) fn split_literals(input: &str) -> Vec<Literal> {
    let mut literals = Vec::new();
    let mut chunk = String::new();
    let mut start_line = 0usize;
    let mut depth = 0i32;
    let mut has_content = false;
    let mut in_block_comment = false;

    for (idx, line) in input.lines().enumerate() {
        let line_number = idx + 1;
        if !chunk.is_empty() {
            chunk.push('\n');
        }

        // string state never crosses a line boundary in this syntax
        let mut in_string: Option<char> = None;
        let mut escape = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            if let Some(quote) = in_string {
                chunk.push(c);
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == quote {
                    in_string = None;
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_block_comment = true;
                    continue;
                }
                c if c.is_whitespace() => {
                    if has_content {
                        chunk.push(c);
                    }
                    continue;
                }
                _ => {}
            }
            if !has_content {
                chunk.clear();
                start_line = line_number;
                has_content = true;
            }
            chunk.push(c);
            match c {
                '"' | '\'' => in_string = Some(c),
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth -= 1;
                    if depth <= 0 {
                        literals.push(Literal {
                            line: start_line,
                            text: std::mem::take(&mut chunk),
                        });
                        depth = 0;
                        has_content = false;
                    }
                }
                _ => {}
            }
        }

        // bare text that never opened a brace is its own (bad) literal
        if depth == 0 && has_content && !in_block_comment {
            literals.push(Literal { line: start_line, text: std::mem::take(&mut chunk) });
            has_content = false;
        }
    }

    if has_content && !chunk.trim().is_empty() {
        literals.push(Literal { line: start_line, text: chunk });
    }

    literals
}
