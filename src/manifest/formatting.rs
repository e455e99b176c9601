//! Formatting capture for round-trip manifest rewrites

use regex::Regex;
use std::sync::LazyLock;

static INDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^([ \t]+)\S").unwrap());

/// Indentation unit of a JSON document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Tab,
    Spaces(usize),
    /// Single-line document without indentation
    Compact,
}

impl Indent {
    /// Bytes of one indentation level, None when compact
    pub fn unit(&self) -> Option<Vec<u8>> {
        match self {
            Indent::Tab => Some(b"\t".to_vec()),
            Indent::Spaces(n) => Some(vec![b' '; *n]),
            Indent::Compact => None,
        }
    }
}

/// Formatting of the original file, reused when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestFormatting {
    pub indent: Indent,
    pub trailing_newline: bool,
}

impl Default for ManifestFormatting {
    fn default() -> Self {
        Self {
            indent: Indent::Spaces(2),
            trailing_newline: true,
        }
    }
}

impl ManifestFormatting {
    /// Detect formatting from file content
    ///
    /// The first indented line gives the unit. A document without any
    /// indented line is compact.
    pub fn detect(content: &str) -> Self {
        let indent = match INDENT_RE.captures(content).and_then(|caps| caps.get(1)) {
            Some(m) if m.as_str().starts_with('\t') => Indent::Tab,
            Some(m) => Indent::Spaces(m.as_str().len()),
            None if content.trim().contains('\n') => Indent::Spaces(2),
            None => Indent::Compact,
        };

        Self {
            indent,
            trailing_newline: content.ends_with('\n'),
        }
    }
}
