//! Locating and rewriting the permalink field inside a page.
//!
//! Two strategies share the [`PageCodec`] seam:
//!
//! - [`LineCodec`] scans raw lines with a regex and splices a single line.
//!   Every other byte of the file (ordering, comments, line endings) survives.
//! - [`DocumentCodec`] parses the page as a YAML mapping and serializes the
//!   whole document back. Key order is kept; formatting and comments are not.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use tether_core::types::{EditStrategy, PermalinkValue};

/// Failure to interpret page content.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("top-level document is not a mapping")]
    NotAMapping,
}

/// Reads and writes the permalink field of a page's content.
pub trait PageCodec {
    /// Declared permalink, quotes stripped. Blank values count as absent.
    fn declared(&self, content: &str) -> Result<Option<String>, CodecError>;

    /// Content with the field set to `value`, inserting it when missing.
    fn set_permalink(&self, content: &str, value: &PermalinkValue) -> Result<String, CodecError>;
}

/// Build the codec for `strategy`.
pub fn for_strategy(
    strategy: EditStrategy,
    field: &str,
) -> Result<Box<dyn PageCodec>, regex::Error> {
    Ok(match strategy {
        EditStrategy::Lines => Box::new(LineCodec::new(field)?),
        EditStrategy::Document => Box::new(DocumentCodec::new(field)),
    })
}

// ---------------------------------------------------------------------------
// LineCodec
// ---------------------------------------------------------------------------

/// Regex line surgery. The field name matches case-insensitively at any
/// indentation; the first matching line wins.
#[derive(Debug, Clone)]
pub struct LineCodec {
    field: String,
    pattern: Regex,
}

impl LineCodec {
    pub fn new(field: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i)^(\s*{}\s*:)(.*)$", regex::escape(field)))?;
        Ok(Self {
            field: field.to_string(),
            pattern,
        })
    }

    fn find<'a>(&self, content: &'a str) -> Option<FieldLine<'a>> {
        content
            .split_inclusive('\n')
            .enumerate()
            .find_map(|(index, raw)| {
                let caps = self.pattern.captures(strip_eol(raw))?;
                Some(FieldLine::parse(index, caps.get(1)?.as_str(), caps.get(2)?.as_str()))
            })
    }
}

impl PageCodec for LineCodec {
    fn declared(&self, content: &str) -> Result<Option<String>, CodecError> {
        Ok(self.find(content).and_then(|line| line.declared()))
    }

    fn set_permalink(&self, content: &str, value: &PermalinkValue) -> Result<String, CodecError> {
        if let Some(field) = self.find(content) {
            let mut out = String::with_capacity(content.len() + value.as_str().len());
            for (index, raw) in content.split_inclusive('\n').enumerate() {
                if index == field.index {
                    out.push_str(&field.render(value.as_str()));
                    out.push_str(&raw[strip_eol(raw).len()..]);
                } else {
                    out.push_str(raw);
                }
            }
            return Ok(out);
        }

        // Insert as the second line, or as the only line of an empty file.
        let line = format!("{}: {}", self.field, render_scalar(value.as_str(), None));
        let eol = line_ending(content);
        let Some(first) = content.split_inclusive('\n').next() else {
            return Ok(format!("{line}{eol}"));
        };
        let rest = &content[first.len()..];
        if first.ends_with('\n') {
            Ok(format!("{first}{line}{eol}{rest}"))
        } else {
            Ok(format!("{first}{eol}{line}"))
        }
    }
}

/// A located field line, split so it can be rebuilt around a new value.
#[derive(Debug, PartialEq, Eq)]
struct FieldLine<'a> {
    index: usize,
    /// Indentation, key and colon, verbatim.
    prefix: &'a str,
    /// Whitespace between colon and value.
    gap: &'a str,
    quote: Option<char>,
    /// Value without its quotes.
    value: &'a str,
    /// Trailing whitespace and comment.
    suffix: &'a str,
}

impl<'a> FieldLine<'a> {
    fn parse(index: usize, prefix: &'a str, rest: &'a str) -> Self {
        let body = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let gap = &rest[..rest.len() - body.len()];

        if let Some(quote) = body.chars().next().filter(|c| *c == '"' || *c == '\'') {
            if let Some(close) = closing_quote(body, quote) {
                return Self {
                    index,
                    prefix,
                    gap,
                    quote: Some(quote),
                    value: &body[1..close],
                    suffix: &body[close + 1..],
                };
            }
        }

        let end = comment_start(body).unwrap_or(body.len());
        let value = body[..end].trim_end();
        Self {
            index,
            prefix,
            gap,
            quote: None,
            value,
            suffix: &body[value.len()..],
        }
    }

    fn declared(&self) -> Option<String> {
        let value = match self.quote {
            Some(quote) => unescape(self.value, quote),
            None => self
                .value
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'')
                .to_string(),
        };
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn render(&self, value: &str) -> String {
        let gap = if self.gap.is_empty() { " " } else { self.gap };
        // A comment that directly followed a blank value needs its own space.
        let comment_gap = if self.suffix.starts_with('#') { " " } else { "" };
        format!(
            "{}{}{}{}{}",
            self.prefix,
            gap,
            render_scalar(value, self.quote),
            comment_gap,
            self.suffix
        )
    }
}

/// Byte offset of the quote closing the scalar that opens `body`.
///
/// Single quotes escape themselves (`''`); double quotes use backslashes.
fn closing_quote(body: &str, quote: char) -> Option<usize> {
    let mut chars = body.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|(_, next)| *next == '\'') {
                chars.next();
            } else {
                return Some(i);
            }
        }
    }
    None
}

/// Value of a quoted scalar body with its escapes resolved.
fn unescape(raw: &str, quote: char) -> String {
    if quote == '\'' {
        return raw.replace("''", "'");
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn strip_eol(raw: &str) -> &str {
    raw.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(raw)
}

/// Terminator of the first line; `\n` when the file has none.
fn line_ending(content: &str) -> &'static str {
    match content.split_inclusive('\n').next() {
        Some(first) if first.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

/// Byte offset of an unquoted YAML comment (`#` at start or after whitespace).
fn comment_start(body: &str) -> Option<usize> {
    body.char_indices().find_map(|(i, c)| {
        let boundary = i == 0 || body[..i].ends_with(|p: char| p == ' ' || p == '\t');
        (c == '#' && boundary).then_some(i)
    })
}

fn render_scalar(value: &str, quote: Option<char>) -> String {
    match quote {
        Some('\'') => format!("'{}'", value.replace('\'', "''")),
        Some(_) => format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")),
        None if needs_quotes(value) => render_scalar(value, Some('"')),
        None => value.to_string(),
    }
}

/// Plain scalars that YAML would read as something other than this string.
fn needs_quotes(value: &str) -> bool {
    const INDICATORS: &str = "!&*[]{}|>'\"%@`#,";
    const KEYWORDS: [&str; 11] = [
        "true", "false", "null", "~", "yes", "no", "on", "off", "-", "?", "",
    ];

    value.starts_with(|c: char| INDICATORS.contains(c))
        || value.contains(": ")
        || value.contains(" #")
        || KEYWORDS.contains(&value.to_ascii_lowercase().as_str())
        || looks_numeric(value)
}

fn looks_numeric(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(|c: char| c == '+' || c == '-');
    lower.parse::<f64>().is_ok()
        || unsigned == ".inf"
        || unsigned == ".nan"
        || unsigned
            .strip_prefix("0x")
            .is_some_and(|hex| i64::from_str_radix(hex, 16).is_ok())
        || unsigned
            .strip_prefix("0o")
            .is_some_and(|oct| i64::from_str_radix(oct, 8).is_ok())
}

// ---------------------------------------------------------------------------
// DocumentCodec
// ---------------------------------------------------------------------------

/// Structured parse-and-rewrite through `serde_yaml`.
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    field: String,
}

impl DocumentCodec {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }

    fn parse(&self, content: &str) -> Result<Mapping, CodecError> {
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }
        match serde_yaml::from_str::<Value>(content)? {
            Value::Mapping(doc) => Ok(doc),
            Value::Null => Ok(Mapping::new()),
            _ => Err(CodecError::NotAMapping),
        }
    }
}

impl PageCodec for DocumentCodec {
    fn declared(&self, content: &str) -> Result<Option<String>, CodecError> {
        let doc = self.parse(content)?;
        Ok(doc
            .get(self.field.as_str())
            .and_then(scalar_text)
            .filter(|s| !s.trim().is_empty()))
    }

    fn set_permalink(&self, content: &str, value: &PermalinkValue) -> Result<String, CodecError> {
        let mut doc = self.parse(content)?;
        // `insert` keeps the position of an existing key.
        doc.insert(
            Value::String(self.field.clone()),
            Value::String(value.to_string()),
        );
        Ok(serde_yaml::to_string(&doc)?)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
