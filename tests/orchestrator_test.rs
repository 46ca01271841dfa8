use httpmock::prelude::*;
use report_patch::adapters::{ImportClient, NamedSelector};
use report_patch::config::ImportConfig;
use report_patch::core::{MergeOutcome, UploadOutcome};
use report_patch::domain::model::{Category, CategoryStatus};
use report_patch::domain::ports::NoopObserver;
use report_patch::{MergeOrchestrator, PatchError, Workspace};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};

const DATASETS: &str = "define({\n  \"orders\": {\"sql\": \"select 1\"}\n});\n";
const FILTERS: &str = "{\n  \"region\": {\"type\": \"list\"}\n}\n";
const WRAPPERS: &str = "function wrap() {}\n";
const GLOBALSQL: &str = "var GLOBAL_SQL = {};\n";

struct Layout {
    _temp: TempDir,
    data: PathBuf,
    std_dir: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data/report");
        let std_dir = temp.path().join("standard");
        fs::create_dir_all(data.join("patch")).unwrap();
        fs::create_dir_all(&std_dir).unwrap();

        fs::write(std_dir.join("datasets.js"), DATASETS).unwrap();
        fs::write(std_dir.join("filters.json"), FILTERS).unwrap();
        fs::write(std_dir.join("wrappers.js"), WRAPPERS).unwrap();
        fs::write(std_dir.join("globalsql.js"), GLOBALSQL).unwrap();

        let mapping = serde_json::json!({
            "paths": {
                "datasets": std_dir.join("datasets.js"),
                "filters": std_dir.join("filters.json"),
                "wrappers": std_dir.join("wrappers.js"),
                "globalsql": std_dir.join("globalsql.js"),
            }
        });
        fs::write(data.join("config.json"), mapping.to_string()).unwrap();

        Self {
            _temp: temp,
            data,
            std_dir,
        }
    }

    fn patch_file(&self, patch: &str, sub: &str, name: &str, content: &str) {
        let dir = self.data.join("patch").join(patch).join(sub);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn design_bundle(&self, patch: &str, name: &str) {
        let dir = self.data.join("patch").join(patch).join("design");
        fs::create_dir_all(&dir).unwrap();
        let mut zip = ZipWriter::new(fs::File::create(dir.join(name)).unwrap());
        zip.start_file::<_, ()>("layout.xml", FileOptions::default())
            .unwrap();
        zip.write_all(b"<layout/>").unwrap();
        zip.finish().unwrap();
    }

    fn standard(&self, name: &str) -> String {
        fs::read_to_string(self.std_dir.join(name)).unwrap()
    }
}

fn import_client(server: &MockServer) -> ImportClient {
    ImportClient::new(&ImportConfig {
        endpoint: server.url("/REPORTING/Framewrk/Event.jsp"),
        timeout_seconds: 5,
        ..ImportConfig::default()
    })
    .unwrap()
}

fn backups(data: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(data.join("backup"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    dirs.sort();
    dirs
}

#[tokio::test]
async fn test_end_to_end_patch_import() {
    let layout = Layout::new();
    layout.design_bundle("sales-2024", "sales.zip");
    layout.design_bundle("sales-2024", "stock.zip");
    layout.patch_file(
        "sales-2024",
        "datasets",
        "invoices.js",
        "\"invoices\": {\"sql\": \"select 2\"}\n",
    );
    layout.patch_file("sales-2024", "datasets", "orders.js", "\"orders\": {\"sql\": \"select 3\"}");
    layout.patch_file("sales-2024", "filters", "region.json", "\"region\": { \"type\": \"list\" }");
    layout.patch_file("sales-2024", "wrappers", "sales_wrap.js", "function salesWrap() {}\n");
    layout.patch_file("sales-2024", "globalsql", "sales_sql.js", "GLOBAL_SQL.sales = 'x';");
    layout.patch_file("sales-2024", "globalsql", "ignored.txt", "not a script");

    let server = MockServer::start();
    let sales_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/REPORTING/Framewrk/Event.jsp")
            .query_param("filename", "sales.zip");
        then.status(200).body(r#"{"status":"success"}"#);
    });
    let stock_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/REPORTING/Framewrk/Event.jsp")
            .query_param("filename", "stock.zip");
        then.status(200).body(r#"{"status":"report already exists"}"#);
    });

    let workspace = Workspace::load(&layout.data).unwrap();
    let orchestrator = MergeOrchestrator::new(workspace, import_client(&server), NoopObserver);
    let report = orchestrator
        .run(&NamedSelector::new(vec!["sales-2024".to_string()]))
        .await
        .unwrap();

    sales_mock.assert();
    stock_mock.assert();

    assert_eq!(report.patches.len(), 1);
    let patch = &report.patches[0];
    assert_eq!(patch.patch, "sales-2024");
    assert_eq!(patch.backup.files_copied, 4);
    assert_eq!(
        fs::read_to_string(patch.backup.dir.join("datasets.js")).unwrap(),
        DATASETS
    );

    let uploads: Vec<_> = patch.uploads.iter().map(|u| (u.bundle.as_str(), &u.outcome)).collect();
    assert_eq!(
        uploads,
        vec![
            ("sales.zip", &UploadOutcome::Success),
            ("stock.zip", &UploadOutcome::AlreadyExists)
        ]
    );

    let datasets = patch.category(Category::Datasets).unwrap();
    let outcomes: Vec<_> = datasets.fragments.iter().map(|f| f.outcome).collect();
    assert_eq!(outcomes, vec![MergeOutcome::Inserted, MergeOutcome::Updated]);
    assert_eq!(
        layout.standard("datasets.js"),
        "define({\n  \"orders\": {\"sql\": \"select 3\"}\n,\n\"invoices\": {\"sql\": \"select 2\"}\n});\n"
    );

    let filters = patch.category(Category::Filters).unwrap();
    assert_eq!(filters.fragments[0].outcome, MergeOutcome::SkippedUnchanged);
    assert_eq!(layout.standard("filters.json"), FILTERS);

    let globalsql = patch.category(Category::GlobalSql).unwrap();
    assert_eq!(globalsql.fragments.len(), 1);
    assert_eq!(
        layout.standard("globalsql.js"),
        "var GLOBAL_SQL = {};\n\n// --- merged from sales_sql.js ---\nGLOBAL_SQL.sales = 'x';\n"
    );
    assert!(layout.standard("wrappers.js").contains("function salesWrap() {}"));
    assert_eq!(report.failure_count(), 0);
}

#[tokio::test]
async fn test_second_run_is_a_no_op_with_fresh_backup() {
    let layout = Layout::new();
    layout.patch_file("p1", "datasets", "new.js", "\"new\": {\"sql\": \"select 9\"}");
    layout.patch_file("p1", "wrappers", "w.js", "function w() {}");

    let server = MockServer::start();
    let workspace = Workspace::load(&layout.data).unwrap();
    let orchestrator = MergeOrchestrator::new(workspace, import_client(&server), NoopObserver);
    let selector = NamedSelector::new(vec!["p1".to_string()]);

    let first = orchestrator.run(&selector).await.unwrap();
    let datasets_after_first = layout.standard("datasets.js");
    let second = orchestrator.run(&selector).await.unwrap();

    assert_eq!(first.patches[0].category(Category::Datasets).unwrap().changed(), 1);
    let again = &second.patches[0];
    assert_eq!(again.category(Category::Datasets).unwrap().changed(), 0);
    assert_eq!(again.category(Category::Wrappers).unwrap().skipped(), 1);
    assert_eq!(layout.standard("datasets.js"), datasets_after_first);

    let dirs = backups(&layout.data);
    assert_eq!(dirs.len(), 2);
    // the second backup holds the state produced by the first run
    assert_eq!(
        fs::read_to_string(second.patches[0].backup.dir.join("datasets.js")).unwrap(),
        datasets_after_first
    );
}

#[tokio::test]
async fn test_missing_standard_file_skips_category_without_creating_it() {
    let layout = Layout::new();
    fs::remove_file(layout.std_dir.join("filters.json")).unwrap();
    layout.patch_file("p1", "filters", "region.json", "\"period\": {}");

    let server = MockServer::start();
    let workspace = Workspace::load(&layout.data).unwrap();
    let orchestrator = MergeOrchestrator::new(workspace, import_client(&server), NoopObserver);
    let report = orchestrator
        .run(&NamedSelector::new(vec!["p1".to_string()]))
        .await
        .unwrap();

    let filters = report.patches[0].category(Category::Filters).unwrap();
    assert_eq!(filters.status, CategoryStatus::SkippedMissingSource);
    assert_eq!(filters.fragments[0].outcome, MergeOutcome::SkippedMissingSource);
    assert!(filters.failures.is_empty());
    assert!(!layout.std_dir.join("filters.json").exists());
    assert_eq!(report.patches[0].backup.files_copied, 3);
}

#[tokio::test]
async fn test_patches_run_in_selection_order() {
    let layout = Layout::new();
    layout.patch_file("a", "wrappers", "first.js", "// from a");
    layout.patch_file("b", "wrappers", "second.js", "// from b");

    let server = MockServer::start();
    let workspace = Workspace::load(&layout.data).unwrap();
    let orchestrator = MergeOrchestrator::new(workspace, import_client(&server), NoopObserver);
    let report = orchestrator
        .run(&NamedSelector::new(vec!["b".to_string(), "a".to_string()]))
        .await
        .unwrap();

    let names: Vec<_> = report.patches.iter().map(|p| p.patch.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    let wrappers = layout.standard("wrappers.js");
    assert!(wrappers.find("// from b").unwrap() < wrappers.find("// from a").unwrap());
}

#[tokio::test]
async fn test_unknown_patch_aborts_before_any_change() {
    let layout = Layout::new();
    layout.patch_file("p1", "wrappers", "w.js", "function w() {}");

    let server = MockServer::start();
    let workspace = Workspace::load(&layout.data).unwrap();
    let orchestrator = MergeOrchestrator::new(workspace, import_client(&server), NoopObserver);
    let err = orchestrator
        .run(&NamedSelector::new(vec!["p1".to_string(), "nope".to_string()]))
        .await
        .unwrap_err();

    assert!(matches!(err, PatchError::UnknownPatch { ref name } if name == "nope"));
    assert_eq!(layout.standard("wrappers.js"), WRAPPERS);
    assert!(!layout.data.join("backup").exists());
}
