use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Standard configuration file kinds a patch can contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Datasets,
    Filters,
    Wrappers,
    #[serde(rename = "globalsql")]
    GlobalSql,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Datasets,
        Category::Filters,
        Category::Wrappers,
        Category::GlobalSql,
    ];

    /// Key in the standard-file mapping and name of the patch subfolder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Datasets => "datasets",
            Category::Filters => "filters",
            Category::Wrappers => "wrappers",
            Category::GlobalSql => "globalsql",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Datasets => "Datasets",
            Category::Filters => "Filters",
            Category::Wrappers => "Wrappers",
            Category::GlobalSql => "GlobalSQL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category name -> absolute path of the standard file, as read from `config.json`.
///
/// Keys that are not a known [`Category`] are kept so they still get backed up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFileSet {
    pub paths: BTreeMap<String, PathBuf>,
}

impl StandardFileSet {
    pub fn get(&self, category: Category) -> Option<&Path> {
        self.paths.get(category.as_str()).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

pub const DESIGN_FOLDER: &str = "design";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchFolder {
    pub name: String,
    pub path: PathBuf,
}

impl PatchFolder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn design_dir(&self) -> PathBuf {
        self.path.join(DESIGN_FOLDER)
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.path.join(category.as_str())
    }
}

/// One unit of patch content: the trimmed text of a single patch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub file_name: String,
    pub content: String,
}

impl Fragment {
    /// Trims surrounding whitespace and a leading UTF-8 byte-order mark.
    pub fn new(file_name: impl Into<String>, content: &str) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.trim_start_matches('\u{feff}').trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    Inserted,
    Updated,
    SkippedUnchanged,
    /// The category's standard file is unmapped or missing; the fragment was left unread.
    SkippedMissingSource,
    /// Fragment has no leading `"key"`; nothing was merged.
    SkippedNotMergeable,
}

impl MergeOutcome {
    pub fn is_change(&self) -> bool {
        matches!(self, MergeOutcome::Inserted | MergeOutcome::Updated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum UploadOutcome {
    Success,
    AlreadyExists,
    Failed(String),
    NetworkError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub dir: PathBuf,
    pub files_copied: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRecord {
    pub bundle: String,
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentRecord {
    pub file: String,
    pub key: Option<String>,
    pub outcome: MergeOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentFailure {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Merged,
    /// Folder exists but holds no files with the category's extension.
    Empty,
    SkippedMissingSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub status: CategoryStatus,
    pub fragments: Vec<FragmentRecord>,
    pub failures: Vec<FragmentFailure>,
}

impl CategoryReport {
    pub fn new(category: Category, status: CategoryStatus) -> Self {
        Self {
            category,
            status,
            fragments: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn count(&self, outcome: MergeOutcome) -> usize {
        self.fragments.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn inserted(&self) -> usize {
        self.count(MergeOutcome::Inserted)
    }

    pub fn updated(&self) -> usize {
        self.count(MergeOutcome::Updated)
    }

    pub fn changed(&self) -> usize {
        self.inserted() + self.updated()
    }

    pub fn skipped(&self) -> usize {
        self.fragments.iter().filter(|f| !f.outcome.is_change()).count()
    }

    /// One-line result in the wording operators are used to.
    pub fn summary(&self) -> String {
        let title = self.category.title();
        match self.status {
            CategoryStatus::SkippedMissingSource => {
                format!("Skipping {title} (source or destination missing).")
            }
            CategoryStatus::Empty => format!("No {title} found to merge."),
            CategoryStatus::Merged => {
                let (changed, skipped) = (self.changed(), self.skipped());
                let mut line = format!("{title}:");
                if changed == 0 && skipped > 0 {
                    line.push_str(" No changes found.");
                } else {
                    if changed > 0 {
                        line.push_str(&format!(" {changed} changed."));
                    }
                    if skipped > 0 {
                        line.push_str(&format!(" {skipped} skipped."));
                    }
                }
                if !self.failures.is_empty() {
                    line.push_str(&format!(" {} failed.", self.failures.len()));
                }
                line
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub patch: String,
    pub backup: BackupReport,
    pub uploads: Vec<UploadRecord>,
    pub categories: Vec<CategoryReport>,
}

impl PatchReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub patches: Vec<PatchReport>,
}

impl RunReport {
    pub fn failure_count(&self) -> usize {
        self.patches
            .iter()
            .flat_map(|p| &p.categories)
            .map(|c| c.failures.len())
            .sum()
    }
}
