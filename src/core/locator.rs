//! Textual lookup of `"key": { ... }` blocks.
//!
//! This is deliberately not a parser. A block body may hold plain text and
//! brace groups nested [`MAX_NESTING_DEPTH`] level deep; anything deeper is a
//! known limitation and will not be located (or will be located short).

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Brace levels a block body may contain below its own braces.
pub const MAX_NESTING_DEPTH: usize = 1;

fn key_regex() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r#"^\s*"([^"]+)""#).expect("static key pattern"))
}

/// Returns the first quoted token at the start of a fragment, if any.
pub fn extract_key(fragment: &str) -> Option<&str> {
    key_regex()
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A located block: its byte span in the searched text and the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBlock<'a> {
    pub span: Range<usize>,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct BlockLocator {
    pattern: Regex,
}

impl BlockLocator {
    pub fn for_key(key: &str) -> Self {
        // "key" : { (non-brace | {non-brace*})* }
        let pattern = format!(
            r#""{}"\s*:\s*\{{(?:[^{{}}]|\{{[^{{}}]*\}})*\}}"#,
            regex::escape(key)
        );
        Self {
            pattern: Regex::new(&pattern).expect("escaped key always forms a valid pattern"),
        }
    }

    /// Only the first match is considered; keys are assumed unique.
    pub fn locate<'a>(&self, text: &'a str) -> Option<LocatedBlock<'a>> {
        self.pattern.find(text).map(|m| LocatedBlock {
            span: m.range(),
            text: m.as_str(),
        })
    }
}
