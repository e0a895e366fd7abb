use super::*;
use std::fs;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write fixture file");
}

#[test]
fn list_source_files_applies_default_excludes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "index.html", "<html></html>");
    write(root, "pages/about.html", "<html></html>");
    write(root, "node_modules/pkg/readme.html", "");
    write(root, "dist/index.html", "");
    write(root, "build/index.html", "");
    write(root, REPORT_FILE_NAME, "");

    let snapshot = ProjectSnapshot::new(root);
    let files = snapshot
        .list_source_files(&["**/*.html"])
        .expect("list html");
    assert_eq!(files, vec!["index.html", "pages/about.html"]);
}

#[test]
fn list_files_supports_brace_alternation_and_sorts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "src/b.css", "");
    write(root, "src/a.js", "");
    write(root, "src/c.ts", "");

    let snapshot = ProjectSnapshot::new(root);
    let files = snapshot
        .list_files(&["**/*.{js,css}"], &[])
        .expect("list assets");
    assert_eq!(files, vec!["src/a.js", "src/b.css"]);
}

#[test]
fn list_files_in_is_relative_to_subdirectory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "dist/assets/app.js", "x");
    write(root, "dist/node_modules/dep.js", "x");

    let snapshot = ProjectSnapshot::new(root);
    let files = snapshot
        .list_files_in("dist", &["**/*.js"], BUILD_OUTPUT_EXCLUDES)
        .expect("list dist");
    assert_eq!(files, vec!["assets/app.js"]);
}

#[test]
fn list_files_in_missing_directory_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = ProjectSnapshot::new(dir.path());
    let files = snapshot
        .list_files_in("dist", &["**/*.js"], &[])
        .expect("list missing dir");
    assert!(files.is_empty());
}

#[test]
fn read_text_reports_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = ProjectSnapshot::new(dir.path());
    let err = snapshot.read_text("missing.html").unwrap_err();
    assert!(matches!(err, SnapshotError::NotFound { .. }));
}

#[test]
fn read_json_reports_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "package.json", "{ not json");
    let snapshot = ProjectSnapshot::new(dir.path());
    let err = snapshot.read_json("package.json").unwrap_err();
    assert!(matches!(err, SnapshotError::Parse { .. }));
}

#[test]
fn invalid_pattern_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = ProjectSnapshot::new(dir.path());
    let err = snapshot.list_files(&["src/[a"], &[]).unwrap_err();
    assert!(matches!(err, SnapshotError::Pattern { .. }));
}

#[test]
fn build_output_dir_follows_preference_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let snapshot = ProjectSnapshot::new(root);
    assert_eq!(snapshot.build_output_dir(), None);

    fs::create_dir_all(root.join("out")).expect("create out");
    assert_eq!(snapshot.build_output_dir(), Some("out"));

    fs::create_dir_all(root.join("build")).expect("create build");
    assert_eq!(snapshot.build_output_dir(), Some("build"));

    fs::create_dir_all(root.join("dist")).expect("create dist");
    assert_eq!(snapshot.build_output_dir(), Some("dist"));
}

#[test]
fn file_size_reads_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "dist/app.js", "12345");
    let snapshot = ProjectSnapshot::new(dir.path());
    assert_eq!(snapshot.file_size("dist/app.js").expect("size"), 5);
}
