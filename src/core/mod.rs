pub mod backup;
pub mod locator;
pub mod merger;
pub mod orchestrator;
pub mod workspace;

pub use crate::domain::model::{Category, Fragment, MergeOutcome, UploadOutcome};
pub use crate::domain::ports::{FragmentMerger, PatchSelector, ReportUploader, RunObserver};
pub use crate::utils::error::Result;
