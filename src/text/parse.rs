//! Shared line tokenization for the text decoders.
//!
//! One pass turns a decoded line into named channels; both the sample-list
//! decoder and the matrix decoder consume its output, so the two APIs can
//! never disagree on labels or values.
//!
//! Grammar per line (after `;` → `,` normalization):
//! - with labels enabled, the line splits into segments at commas that
//!   precede a `label:` introducer;
//! - a labeled segment contributes one channel carrying every float in the
//!   segment;
//! - an unlabeled segment contributes one channel per comma-separated
//!   element, auto-named `S{k}` (single value) or `V{k}` (several values);
//! - elements split into float tokens on whitespace.

use core::fmt;
use std::collections::HashMap;

use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// ParseError
// ─────────────────────────────────────────────────────────────────────────────

/// Text parse failure, surfaced only in strict mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token failed float parsing. `line` and `column` are 1-based within
    /// the processed batch.
    Float {
        line: usize,
        column: usize,
        token: String,
    },
    /// A completed line was not valid UTF-8.
    Utf8 { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Float { line, column, token } => {
                write!(f, "line {line}, token {column}: {token:?} is not a number")
            }
            ParseError::Utf8 { line } => write!(f, "line {line}: invalid UTF-8"),
        }
    }
}

impl std::error::Error for ParseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ─────────────────────────────────────────────────────────────────────────────

/// A named channel extracted from one line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

/// Precompiled patterns, built once per decoder.
pub(crate) struct Tokenizer {
    /// A comma that introduces the next labeled segment.
    segment_cut: Regex,
    /// `label: data` at the start of a segment.
    label: Regex,
    /// Element separator inside a data body.
    element: Regex,
}

impl Tokenizer {
    pub(crate) fn new() -> Tokenizer {
        Tokenizer {
            segment_cut: Regex::new(r",\s*[A-Za-z_][A-Za-z0-9_]*\s*:").expect("static pattern"),
            label: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.*)$").expect("static pattern"),
            element: Regex::new(r",\s*").expect("static pattern"),
        }
    }

    /// Tokenize one line. `line_no` is 1-based within the current batch and
    /// only used for error reporting.
    pub(crate) fn parse_line(
        &self,
        line: &str,
        labels: bool,
        strict: bool,
        line_no: usize,
    ) -> Result<Vec<Channel>, ParseError> {
        let line = line.replace(';', ",");

        let mut channels = Vec::new();
        let mut scalar_count = 0usize;
        let mut vector_count = 0usize;
        let mut label_uses: HashMap<String, usize> = HashMap::new();
        let mut column = 0usize;

        for raw_segment in self.split_segments(&line, labels) {
            let segment = raw_segment.trim_matches(|c| c == ' ' || c == ',');
            if segment.is_empty() {
                continue;
            }

            let (label, data) = if labels {
                match self.label.captures(segment) {
                    Some(caps) => {
                        let l = caps.get(1).map(|m| m.as_str().to_owned());
                        let d = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                        (l, d.to_owned())
                    }
                    None => (None, segment.to_owned()),
                }
            } else {
                (None, segment.to_owned())
            };

            match label {
                Some(label) => {
                    // one channel per labeled segment, flattened across commas
                    let mut values = Vec::new();
                    for element in self.element.split(&data) {
                        parse_tokens(element, strict, line_no, &mut column, &mut values)?;
                    }
                    if values.is_empty() {
                        continue;
                    }
                    let uses = label_uses.entry(label.clone()).or_insert(0);
                    *uses += 1;
                    let name = if *uses == 1 {
                        label
                    } else {
                        format!("{label}_{uses}")
                    };
                    channels.push(Channel { name, values });
                }
                None => {
                    // one channel per element, auto-named
                    for element in self.element.split(&data) {
                        let mut values = Vec::new();
                        parse_tokens(element, strict, line_no, &mut column, &mut values)?;
                        if values.is_empty() {
                            continue;
                        }
                        let name = if values.len() == 1 {
                            scalar_count += 1;
                            format!("S{scalar_count}")
                        } else {
                            vector_count += 1;
                            format!("V{vector_count}")
                        };
                        channels.push(Channel { name, values });
                    }
                }
            }
        }
        Ok(channels)
    }

    /// Split a normalized line into segments. With labels enabled the cut
    /// points are commas that precede a `label:` introducer; the comma is
    /// consumed, the label is not.
    fn split_segments<'a>(&self, line: &'a str, labels: bool) -> Vec<&'a str> {
        if !labels {
            return vec![line];
        }
        let mut out = Vec::new();
        let mut start = 0;
        for m in self.segment_cut.find_iter(line) {
            out.push(&line[start..m.start()]);
            start = m.start() + 1; // skip the comma, keep the label
        }
        out.push(&line[start..]);
        out
    }
}

/// Whitespace-split `element` into float tokens. Malformed tokens become NaN
/// in non-strict mode and abort the batch in strict mode.
fn parse_tokens(
    element: &str,
    strict: bool,
    line_no: usize,
    column: &mut usize,
    values: &mut Vec<f64>,
) -> Result<(), ParseError> {
    for token in element.split_whitespace() {
        *column += 1;
        match token.parse::<f64>() {
            Ok(v) => values.push(v),
            Err(_) if strict => {
                return Err(ParseError::Float {
                    line: line_no,
                    column: *column,
                    token: token.to_owned(),
                })
            }
            Err(_) => values.push(f64::NAN),
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
