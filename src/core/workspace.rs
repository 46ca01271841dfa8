use crate::domain::model::{PatchFolder, StandardFileSet};
use crate::utils::error::{PatchError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAPPING_FILE: &str = "config.json";
pub const PATCH_DIR: &str = "patch";
pub const BACKUP_DIR: &str = "backup";

/// The report data directory: standard-file mapping, available patches and backup root.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub data_dir: PathBuf,
    pub standard_files: StandardFileSet,
    pub patches: Vec<PatchFolder>,
}

impl Workspace {
    /// Reads `config.json` and lists the folders under `patch/`, sorted by name.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let mapping_path = data_dir.join(MAPPING_FILE);
        if !mapping_path.is_file() {
            return Err(PatchError::ConfigMissing { path: mapping_path });
        }
        let raw = fs::read_to_string(&mapping_path)
            .map_err(|e| PatchError::io(format!("reading {}", mapping_path.display()), e))?;
        let standard_files: StandardFileSet = serde_json::from_str(&raw)?;

        let patch_root = data_dir.join(PATCH_DIR);
        if !patch_root.is_dir() {
            return Err(PatchError::ConfigMissing { path: patch_root });
        }
        let patches = list_patch_folders(&patch_root)?;
        if patches.is_empty() {
            return Err(PatchError::NoPatchFolders { root: patch_root });
        }

        Ok(Self {
            data_dir,
            standard_files,
            patches,
        })
    }

    pub fn backup_root(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    pub fn find_patch(&self, name: &str) -> Option<&PatchFolder> {
        self.patches.iter().find(|p| p.name == name)
    }
}

fn list_patch_folders(root: &Path) -> Result<Vec<PatchFolder>> {
    let context = || format!("listing {}", root.display());
    let mut patches = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| PatchError::io(context(), e))? {
        let entry = entry.map_err(|e| PatchError::io(context(), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            patches.push(PatchFolder::new(name, &path));
        }
    }
    patches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(patches)
}

/// Files directly inside `dir` whose extension is `extension`, sorted by file name.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let context = || format!("listing {}", dir.display());
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PatchError::io(context(), e))? {
        let path = entry.map_err(|e| PatchError::io(context(), e))?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
