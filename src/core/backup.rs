use crate::domain::model::{BackupReport, StandardFileSet};
use crate::utils::error::{PatchError, Result};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshots the standard files into `<root>/backup-<millis>` before they are touched.
#[derive(Debug, Clone)]
pub struct BackupStage {
    root: PathBuf,
}

impl BackupStage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies every standard file that exists. Files that do not exist are skipped.
    pub fn run(&self, files: &StandardFileSet) -> Result<BackupReport> {
        let dir = self.create_unique_dir()?;
        let mut taken = HashSet::new();
        let mut files_copied = 0;

        for (category, source) in files.iter() {
            if !source.is_file() {
                tracing::debug!("No standard file for {} at {}", category, source.display());
                continue;
            }
            let Some(base) = source.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = if taken.insert(base.to_string()) {
                base.to_string()
            } else {
                format!("{category}-{base}")
            };
            fs::copy(source, dir.join(&name))
                .map_err(|e| PatchError::io(format!("backing up {}", source.display()), e))?;
            files_copied += 1;
        }

        Ok(BackupReport { dir, files_copied })
    }

    fn create_unique_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| {
            PatchError::io(format!("creating backup root {}", self.root.display()), e)
        })?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("backup-{stamp}")
            } else {
                format!("backup-{stamp}-{suffix}")
            };
            let dir = self.root.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => {
                    return Err(PatchError::io(
                        format!("creating backup directory {}", dir.display()),
                        e,
                    ))
                }
            }
        }
    }
}
