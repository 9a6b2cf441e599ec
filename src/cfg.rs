//! Reader for the game's line-oriented `key = value` text format
//!
//! Both `part.cfg` and `.craft` files use it. Blocks are delimited by lines
//! holding a single `{` or `}`, optionally preceded by a bare header word
//! such as `PART` or `MODULE`.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

// Pattern: mass = 0.8   (split on the first '=')
static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^=]*?)\s*=\s*(.*)$").expect("entry pattern is valid"));

// Pattern: PART
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w]*$").expect("header pattern is valid"));

/// What a single non-blank, non-comment line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Entry { key: &'a str, value: &'a str },
    Header(&'a str),
    Open,
    Close,
    Other(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgLine<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub kind: LineKind<'a>,
}

/// Iterate the meaningful lines of `text`, skipping blanks and `//` comments.
pub fn lines(text: &str) -> impl Iterator<Item = CfgLine<'_>> {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            return None;
        }
        let kind = if line == "{" {
            LineKind::Open
        } else if line == "}" {
            LineKind::Close
        } else if let Some(cap) = ENTRY_RE.captures(line) {
            let key = cap.get(1).map_or("", |m| m.as_str());
            let value = cap.get(2).map_or("", |m| m.as_str().trim());
            LineKind::Entry { key, value }
        } else if HEADER_RE.is_match(line) {
            LineKind::Header(line)
        } else {
            LineKind::Other(line)
        };
        Some(CfgLine {
            number: idx + 1,
            kind,
        })
    })
}

/// A single `key = value` pair together with where it came from, so typed
/// conversions can report precise parse errors.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub path: &'a Path,
    pub line: usize,
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Field<'a> {
    pub fn new(path: &'a Path, line: usize, key: &'a str, value: &'a str) -> Self {
        Self {
            path,
            line,
            key,
            value,
        }
    }

    fn invalid(&self, expected: &str) -> Error {
        Error::parse(
            self.path,
            Some(self.line),
            format!("{} = '{}' is not {}", self.key, self.value, expected),
        )
    }

    pub fn string(&self) -> String {
        self.value.to_string()
    }

    pub fn float(&self) -> Result<f64> {
        parse_float(self.value).ok_or_else(|| self.invalid("a number"))
    }

    pub fn int(&self) -> Result<i64> {
        self.value
            .parse::<i64>()
            .map_err(|_| self.invalid("an integer"))
    }

    /// Stage numbers and similar indices that may not be negative.
    pub fn index(&self) -> Result<u32> {
        self.value
            .parse::<u32>()
            .map_err(|_| self.invalid("a non-negative integer"))
    }

    /// `true` and `1` (any case) are true, everything else is false.
    pub fn boolean(&self) -> bool {
        let v = self.value.to_ascii_lowercase();
        v == "true" || v == "1"
    }

    pub fn floats(&self) -> Result<Vec<f64>> {
        self.value
            .split(',')
            .map(|v| parse_float(v.trim()).ok_or_else(|| self.invalid("a list of numbers")))
            .collect()
    }

    pub fn ints(&self) -> Result<Vec<i64>> {
        self.value
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<i64>()
                    .map_err(|_| self.invalid("a list of integers"))
            })
            .collect()
    }
}

// Some stock files write positive numbers with a leading '+'.
fn parse_float(value: &str) -> Option<f64> {
    let value = value.strip_prefix('+').unwrap_or(value);
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
