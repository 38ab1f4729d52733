use std::path::{Path, PathBuf};

use folio_core::{FALLBACK_CONTENT, PAGES, Post, PostRegistry, SiteBuilder};
use walkdir::WalkDir;

fn post(id: &str, html_content: &str) -> Post {
    Post {
        date: "AUG 26 2024".into(),
        header: format!("Post {id}"),
        preview_content: format!("Preview of {id}"),
        html_content: html_content.into(),
        id: id.into(),
        ..Default::default()
    }
}

fn build(root: &Path, registry: PostRegistry) -> PathBuf {
    let output = root.join("dist");
    std::fs::create_dir_all(root.join("assets")).unwrap();
    SiteBuilder::new()
        .registry(registry)
        .output_dir(&output)
        .assets_dir(root.join("assets"))
        .content_root(root)
        .build()
        .unwrap()
        .generate()
        .unwrap();
    output
}

fn index_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(root).unwrap().to_path_buf(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn writes_one_file_per_page_and_post() {
    let dir = tempfile::tempdir().unwrap();
    let registry =
        PostRegistry::new(vec![post("a", "a.html"), post("b", "b.html"), post("c", "c.html")])
            .unwrap();
    let output = build(dir.path(), registry);

    let files = index_files(&output);
    assert_eq!(files.len(), PAGES.len() + 3);

    for expected in [
        "index.html",
        "about/index.html",
        "blog/index.html",
        "blog/a/index.html",
        "blog/b/index.html",
        "blog/c/index.html",
        "projects/index.html",
        "publications/index.html",
    ] {
        let path = output.join(expected);
        assert!(path.is_file(), "{expected}");
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "{expected}");
    }
}

#[test]
fn builtin_registry_builds() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PostRegistry::builtin();
    let count = registry.len();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();

    let report = SiteBuilder::new()
        .registry(registry)
        .output_dir(dir.path().join("dist"))
        .assets_dir(dir.path().join("assets"))
        .content_root(dir.path())
        .build()
        .unwrap()
        .generate()
        .unwrap();

    assert_eq!(report.files_written(), PAGES.len() + count);
    let html = std::fs::read_to_string(dir.path().join("dist/blog/partial/index.html")).unwrap();
    assert!(html.contains(FALLBACK_CONTENT));
}

#[test]
fn rebuilding_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/style.css"), "main { margin: 0 }").unwrap();
    std::fs::write(dir.path().join("a.html"), "<p>first</p>").unwrap();

    let registry = PostRegistry::new(vec![post("a", "a.html"), post("b", "missing.html")]).unwrap();

    let output = build(dir.path(), registry.clone());
    let first = snapshot(&output);
    let output = build(dir.path(), registry);
    let second = snapshot(&output);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn post_body_follows_its_content_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("body.html"), "X marks the spot").unwrap();

    let output = build(
        dir.path(),
        PostRegistry::new(vec![post("a", "body.html")]).unwrap(),
    );
    let html = std::fs::read_to_string(output.join("blog/a/index.html")).unwrap();
    assert!(html.contains("X marks the spot"));
    assert!(!html.contains(FALLBACK_CONTENT));

    let output = build(
        dir.path(),
        PostRegistry::new(vec![post("a", "nowhere/body.html")]).unwrap(),
    );
    let html = std::fs::read_to_string(output.join("blog/a/index.html")).unwrap();
    assert!(html.contains(FALLBACK_CONTENT));
    assert!(!html.contains("X marks the spot"));
}

#[test]
fn placeholder_content_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = build(
        dir.path(),
        PostRegistry::new(vec![post("test", "test content")]).unwrap(),
    );
    let html = std::fs::read_to_string(output.join("blog/test/index.html")).unwrap();
    assert!(html.contains(FALLBACK_CONTENT));
}
