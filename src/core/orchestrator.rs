use crate::core::backup::BackupStage;
use crate::core::merger::{CategorySpec, CATEGORY_TABLE};
use crate::core::workspace::{list_files_with_extension, Workspace};
use crate::domain::model::{
    CategoryReport, CategoryStatus, Fragment, FragmentFailure, FragmentRecord, MergeOutcome,
    PatchFolder, PatchReport, RunReport, UploadRecord,
};
use crate::domain::ports::{PatchSelector, ReportUploader, RunObserver};
use crate::utils::error::{PatchError, Result};
use std::path::Path;

const DESIGN_EXTENSION: &str = "zip";

/// Applies selected patches to the standard files of a [`Workspace`].
///
/// Per patch: back up, upload design bundles, then merge each category of
/// [`CATEGORY_TABLE`] in order. Fragment and category problems are recorded in
/// the report; setup and enumeration I/O failures abort the run.
pub struct MergeOrchestrator<U: ReportUploader, O: RunObserver> {
    workspace: Workspace,
    uploader: U,
    observer: O,
}

impl<U: ReportUploader, O: RunObserver> MergeOrchestrator<U, O> {
    pub fn new(workspace: Workspace, uploader: U, observer: O) -> Self {
        Self {
            workspace,
            uploader,
            observer,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub async fn run<S: PatchSelector + ?Sized>(&self, selector: &S) -> Result<RunReport> {
        let selected = selector.select(&self.workspace.patches)?;
        self.run_patches(&selected).await
    }

    pub async fn run_patches(&self, patches: &[PatchFolder]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for patch in patches {
            report.patches.push(self.process_patch(patch).await?);
        }
        self.observer.run_finished(&report);
        Ok(report)
    }

    async fn process_patch(&self, patch: &PatchFolder) -> Result<PatchReport> {
        self.observer.patch_started(patch);

        let backup = BackupStage::new(self.workspace.backup_root())
            .run(&self.workspace.standard_files)?;
        self.observer.backup_created(patch, &backup);

        let uploads = self.upload_designs(patch).await?;

        let mut categories = Vec::with_capacity(CATEGORY_TABLE.len());
        for spec in &CATEGORY_TABLE {
            let report = self.merge_category(patch, spec)?;
            self.observer.category_finished(patch, &report);
            categories.push(report);
        }

        Ok(PatchReport {
            patch: patch.name.clone(),
            backup,
            uploads,
            categories,
        })
    }

    async fn upload_designs(&self, patch: &PatchFolder) -> Result<Vec<UploadRecord>> {
        let design_dir = patch.design_dir();
        if !design_dir.is_dir() {
            self.observer.design_folder_missing(patch);
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for bundle in list_files_with_extension(&design_dir, DESIGN_EXTENSION)? {
            let outcome = self.uploader.upload(&bundle).await;
            let record = UploadRecord {
                bundle: file_name(&bundle),
                outcome,
            };
            self.observer
                .bundle_uploaded(patch, &record.bundle, &record.outcome);
            records.push(record);
        }
        Ok(records)
    }

    fn merge_category(&self, patch: &PatchFolder, spec: &CategorySpec) -> Result<CategoryReport> {
        let category = spec.category;
        let source_dir = patch.category_dir(category);
        let target = match self.workspace.standard_files.get(category) {
            Some(target) if source_dir.is_dir() && target.is_file() => target,
            _ => return self.skip_category(&source_dir, spec),
        };

        let files = list_files_with_extension(&source_dir, spec.extension)?;
        if files.is_empty() {
            return Ok(CategoryReport::new(category, CategoryStatus::Empty));
        }

        let merger = spec.merger();
        let mut report = CategoryReport::new(category, CategoryStatus::Merged);
        for path in files {
            let file = file_name(&path);
            let merged = std::fs::read_to_string(&path)
                .map_err(|e| PatchError::io(format!("reading {}", path.display()), e))
                .and_then(|content| merger.merge_file(target, &Fragment::new(&file, &content)));

            match merged {
                Ok(merge) => {
                    let record = FragmentRecord {
                        file,
                        key: merge.key,
                        outcome: merge.outcome,
                    };
                    self.observer.fragment_merged(category, &record);
                    report.fragments.push(record);
                }
                Err(err) => {
                    self.observer.fragment_failed(category, &file, &err);
                    report.failures.push(FragmentFailure {
                        file,
                        message: err.user_friendly_message(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Records every fragment of a category whose source or standard file is missing.
    fn skip_category(&self, source_dir: &Path, spec: &CategorySpec) -> Result<CategoryReport> {
        let mut report = CategoryReport::new(spec.category, CategoryStatus::SkippedMissingSource);
        if !source_dir.is_dir() {
            return Ok(report);
        }
        for path in list_files_with_extension(source_dir, spec.extension)? {
            let record = FragmentRecord {
                file: file_name(&path),
                key: None,
                outcome: MergeOutcome::SkippedMissingSource,
            };
            self.observer.fragment_merged(spec.category, &record);
            report.fragments.push(record);
        }
        Ok(report)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
