use crate::domain::model::{
    BackupReport, Category, CategoryReport, CategoryStatus, FragmentRecord, MergeOutcome,
    PatchFolder, RunReport, UploadOutcome,
};
use crate::domain::ports::RunObserver;
use crate::utils::error::PatchError;

/// Turns run events into `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

fn merge_tag(category: Category) -> &'static str {
    match category {
        Category::Datasets => "Merge-Dataset",
        Category::Filters => "Merge-Filter",
        Category::Wrappers | Category::GlobalSql => "Merge-JS",
    }
}

impl RunObserver for TracingObserver {
    fn patch_started(&self, patch: &PatchFolder) {
        tracing::info!(patch = %patch.name, "--- Processing Patch: {} ---", patch.name);
    }

    fn backup_created(&self, patch: &PatchFolder, backup: &BackupReport) {
        tracing::info!(
            patch = %patch.name,
            "Backed up {} files to {}",
            backup.files_copied,
            backup.dir.display()
        );
    }

    fn design_folder_missing(&self, patch: &PatchFolder) {
        tracing::info!(patch = %patch.name, "No design folder found in patch.");
    }

    fn bundle_uploaded(&self, patch: &PatchFolder, bundle: &str, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Success => {
                tracing::info!(patch = %patch.name, file = bundle, "[Import] Successfully imported report: {}", bundle)
            }
            UploadOutcome::AlreadyExists => {
                tracing::warn!(patch = %patch.name, file = bundle, "[Import] Skipped report (already exists): {}", bundle)
            }
            UploadOutcome::Failed(reason) => {
                let err = PatchError::UploadFailed {
                    bundle: bundle.to_string(),
                    reason: reason.clone(),
                };
                tracing::error!(patch = %patch.name, file = bundle, "[Import] {}", err);
            }
            UploadOutcome::NetworkError(reason) => {
                let err = PatchError::UploadNetworkError {
                    bundle: bundle.to_string(),
                    reason: reason.clone(),
                };
                tracing::error!(patch = %patch.name, file = bundle, "[Import] {}", err);
            }
        }
    }

    fn fragment_merged(&self, category: Category, record: &FragmentRecord) {
        let tag = merge_tag(category);
        let subject = record.key.as_deref().unwrap_or(&record.file);
        match record.outcome {
            MergeOutcome::Inserted if record.key.is_some() => {
                tracing::info!(%category, file = %record.file, "[{}] Inserted new: {}", tag, subject)
            }
            MergeOutcome::Inserted => {
                tracing::info!(%category, file = %record.file, "[{}] Appended content from: {}", tag, subject)
            }
            MergeOutcome::Updated => {
                tracing::info!(%category, file = %record.file, "[{}] Updated: {}", tag, subject)
            }
            MergeOutcome::SkippedUnchanged => {
                tracing::info!(%category, file = %record.file, "[{}] Skipped (no changes): {}", tag, subject)
            }
            MergeOutcome::SkippedNotMergeable => {
                tracing::warn!(%category, file = %record.file, "[{}] Skipped (no leading \"key\"): {}", tag, subject)
            }
            MergeOutcome::SkippedMissingSource => {
                tracing::warn!(%category, file = %record.file, "[{}] Skipped (standard file missing): {}", tag, subject)
            }
        }
    }

    fn fragment_failed(&self, category: Category, file: &str, error: &PatchError) {
        tracing::error!(
            %category,
            file,
            severity = ?error.severity(),
            "[{}] {}",
            merge_tag(category),
            error.user_friendly_message()
        );
    }

    fn category_finished(&self, patch: &PatchFolder, report: &CategoryReport) {
        let category = report.category;
        match report.status {
            CategoryStatus::SkippedMissingSource => {
                tracing::warn!(patch = %patch.name, %category, "{}", report.summary())
            }
            _ => tracing::info!(patch = %patch.name, %category, "Merge result for {}", report.summary()),
        }
    }

    fn run_finished(&self, report: &RunReport) {
        let failures = report.failure_count();
        if failures == 0 {
            tracing::info!(patches = report.patches.len(), "All selected patches processed successfully!");
        } else {
            tracing::warn!(
                patches = report.patches.len(),
                failures,
                "All selected patches processed with {} failed fragment(s)",
                failures
            );
        }
    }
}
