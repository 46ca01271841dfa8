use crate::core::locator::{extract_key, BlockLocator};
use crate::domain::model::{Category, Fragment, MergeOutcome};
use crate::domain::ports::{FragmentMerger, TextMerge};
use crate::utils::error::{PatchError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Closing syntax a block-structured file ends with; new blocks go right before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailPattern {
    /// `});` or `})` at end of file.
    ClosingCall,
    /// `}` at end of file.
    ClosingBrace,
}

impl TailPattern {
    fn regex(&self) -> &'static Regex {
        static CALL: OnceLock<Regex> = OnceLock::new();
        static BRACE: OnceLock<Regex> = OnceLock::new();
        match self {
            TailPattern::ClosingCall => {
                CALL.get_or_init(|| Regex::new(r"\}\);?\s*$").expect("static tail pattern"))
            }
            TailPattern::ClosingBrace => {
                BRACE.get_or_init(|| Regex::new(r"\}\s*$").expect("static tail pattern"))
            }
        }
    }

    /// Byte offset where the tail starts.
    pub fn find(&self, text: &str) -> Option<usize> {
        self.regex().find(text).map(|m| m.start())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergerKind {
    Block(TailPattern),
    Append,
}

/// Static description of how one category is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: Category,
    pub extension: &'static str,
    pub kind: MergerKind,
}

pub const CATEGORY_TABLE: [CategorySpec; 4] = [
    CategorySpec {
        category: Category::Datasets,
        extension: "js",
        kind: MergerKind::Block(TailPattern::ClosingCall),
    },
    CategorySpec {
        category: Category::Filters,
        extension: "json",
        kind: MergerKind::Block(TailPattern::ClosingBrace),
    },
    CategorySpec {
        category: Category::Wrappers,
        extension: "js",
        kind: MergerKind::Append,
    },
    CategorySpec {
        category: Category::GlobalSql,
        extension: "js",
        kind: MergerKind::Append,
    },
];

impl CategorySpec {
    pub fn merger(&self) -> Box<dyn FragmentMerger> {
        match self.kind {
            MergerKind::Block(tail) => Box::new(BlockMerger::new(self.category, tail)),
            MergerKind::Append => Box::new(AppendMerger),
        }
    }
}

pub fn spec_for(category: Category) -> &'static CategorySpec {
    CATEGORY_TABLE
        .iter()
        .find(|spec| spec.category == category)
        .expect("every category has a table entry")
}

fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replace-by-key merging for files made of `"key": {...}` entries.
#[derive(Debug, Clone, Copy)]
pub struct BlockMerger {
    category: Category,
    tail: TailPattern,
}

impl BlockMerger {
    pub fn new(category: Category, tail: TailPattern) -> Self {
        Self { category, tail }
    }
}

impl FragmentMerger for BlockMerger {
    fn merge_text(&self, target: &str, fragment: &Fragment) -> Result<TextMerge> {
        let patch = fragment.content.trim();
        let Some(key) = extract_key(patch) else {
            return Ok(TextMerge::unchanged(MergeOutcome::SkippedNotMergeable, None));
        };

        if let Some(existing) = BlockLocator::for_key(key).locate(target) {
            if normalize(existing.text) == normalize(patch) {
                return Ok(TextMerge::unchanged(
                    MergeOutcome::SkippedUnchanged,
                    Some(key.to_string()),
                ));
            }
            let mut text = String::with_capacity(target.len() + patch.len());
            text.push_str(&target[..existing.span.start]);
            text.push_str(patch);
            text.push_str(&target[existing.span.end..]);
            return Ok(TextMerge {
                outcome: MergeOutcome::Updated,
                key: Some(key.to_string()),
                text: Some(text),
            });
        }

        let tail_start = self
            .tail
            .find(target)
            .ok_or_else(|| PatchError::MergeTargetMalformed {
                category: self.category.to_string(),
                target: PathBuf::new(),
                fragment: fragment.file_name.clone(),
                key: key.to_string(),
            })?;
        let (head, tail) = target.split_at(tail_start);
        Ok(TextMerge {
            outcome: MergeOutcome::Inserted,
            key: Some(key.to_string()),
            text: Some(format!("{head},\n{patch}\n{tail}")),
        })
    }
}

/// Append-by-containment merging for script files.
///
/// There is no update path: an edited fragment no longer matches the earlier
/// insertion literally, so it is appended a second time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendMerger;

impl FragmentMerger for AppendMerger {
    fn merge_text(&self, target: &str, fragment: &Fragment) -> Result<TextMerge> {
        let patch = fragment.content.trim();
        if target.contains(patch) {
            return Ok(TextMerge::unchanged(MergeOutcome::SkippedUnchanged, None));
        }
        Ok(TextMerge {
            outcome: MergeOutcome::Inserted,
            key: None,
            text: Some(format!(
                "{}\n\n// --- merged from {} ---\n{}\n",
                target.trim(),
                fragment.file_name,
                patch
            )),
        })
    }
}
