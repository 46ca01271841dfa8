use crate::domain::model::{
    BackupReport, Category, CategoryReport, Fragment, FragmentRecord, MergeOutcome, PatchFolder,
    RunReport, UploadOutcome,
};
use crate::utils::error::{PatchError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Result of merging a fragment into target text, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMerge {
    pub outcome: MergeOutcome,
    pub key: Option<String>,
    /// New file content; `None` when the target must stay untouched.
    pub text: Option<String>,
}

impl TextMerge {
    pub fn unchanged(outcome: MergeOutcome, key: Option<String>) -> Self {
        Self {
            outcome,
            key,
            text: None,
        }
    }
}

/// A strategy for folding one patch fragment into one standard file.
pub trait FragmentMerger: Send + Sync {
    fn merge_text(&self, target: &str, fragment: &Fragment) -> Result<TextMerge>;

    /// Reads `target`, merges `fragment` and rewrites the file in full if it changed.
    fn merge_file(&self, target: &Path, fragment: &Fragment) -> Result<TextMerge> {
        let current = std::fs::read_to_string(target)
            .map_err(|e| PatchError::io(format!("reading {}", target.display()), e))?;
        let merge = self.merge_text(&current, fragment).map_err(|e| match e {
            PatchError::MergeTargetMalformed {
                category,
                fragment,
                key,
                ..
            } => PatchError::MergeTargetMalformed {
                category,
                target: target.to_path_buf(),
                fragment,
                key,
            },
            other => other,
        })?;
        if let Some(text) = &merge.text {
            std::fs::write(target, text)
                .map_err(|e| PatchError::io(format!("writing {}", target.display()), e))?;
        }
        Ok(merge)
    }
}

/// Sends a design bundle to the reporting product. Never fails: every problem
/// is folded into the returned [`UploadOutcome`].
#[async_trait]
pub trait ReportUploader: Send + Sync {
    async fn upload(&self, bundle: &Path) -> UploadOutcome;
}

/// Picks which patch folders to apply.
pub trait PatchSelector {
    fn select(&self, available: &[PatchFolder]) -> Result<Vec<PatchFolder>>;
}

/// Receives run events. All methods default to no-ops.
pub trait RunObserver: Send + Sync {
    fn patch_started(&self, _patch: &PatchFolder) {}
    fn backup_created(&self, _patch: &PatchFolder, _backup: &BackupReport) {}
    fn design_folder_missing(&self, _patch: &PatchFolder) {}
    fn bundle_uploaded(&self, _patch: &PatchFolder, _bundle: &str, _outcome: &UploadOutcome) {}
    fn fragment_merged(&self, _category: Category, _record: &FragmentRecord) {}
    fn fragment_failed(&self, _category: Category, _file: &str, _error: &PatchError) {}
    fn category_finished(&self, _patch: &PatchFolder, _report: &CategoryReport) {}
    fn run_finished(&self, _report: &RunReport) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
