//! Context integration tests
//!
//! Builds real directory trees under a temp dir and exercises resolution,
//! traversal and loading end to end.

use dircontext_core::{
    CachingLoader, ContextError, ContextMaker, ContextOptions, DirEntry, DirectoryLister,
    FileLoader, FsLister, HomeModule, LoadError, Module, TimingMode,
};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// app/
///   main.js
///   assets/a.txt
///   assets/sub/b.txt
///   assets/sub/c.log
///   assets/data.json
fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("app/assets");
    fs::create_dir_all(assets.join("sub")).unwrap();
    fs::write(dir.path().join("app/main.js"), "// entry").unwrap();
    fs::write(assets.join("a.txt"), "alpha").unwrap();
    fs::write(assets.join("sub/b.txt"), "bravo").unwrap();
    fs::write(assets.join("sub/c.log"), "charlie").unwrap();
    fs::write(assets.join("data.json"), r#"{"answer": 42}"#).unwrap();
    dir
}

fn home(dir: &TempDir) -> HomeModule {
    HomeModule::new(dir.path().join("app/main.js"))
}

/// Filesystem lister counting its calls, optionally failing on one directory name
struct CountingLister {
    calls: Arc<AtomicUsize>,
    fail_on: Option<&'static str>,
}

impl DirectoryLister for CountingLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.is_some_and(|name| dir.ends_with(name)) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        FsLister.list(dir)
    }
}

fn txt() -> Regex {
    Regex::new(r"\.txt$").unwrap()
}

fn key_set(keys: Vec<String>) -> HashSet<String> {
    keys.into_iter().collect()
}

fn set_of(keys: &[&str]) -> HashSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_recursion_scenario() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let factory = maker.make_context(&home(&dir));

    let flat = factory
        .context("./assets", false, &txt(), TimingMode::Sync)
        .unwrap();
    assert_eq!(flat.keys(), vec!["./a.txt"]);

    let deep = factory
        .context("./assets", true, &txt(), TimingMode::Sync)
        .unwrap();
    assert_eq!(key_set(deep.keys()), set_of(&["./a.txt", "./sub/b.txt"]));
}

#[test]
fn test_rebuild_yields_equal_key_sets() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let factory = maker.make_context(&home(&dir));
    let everything = Regex::new(".").unwrap();

    let first = factory
        .context("./assets", true, &everything, TimingMode::Sync)
        .unwrap();
    let second = factory
        .context("./assets", true, &everything, TimingMode::Lazy)
        .unwrap();

    assert_eq!(first.key_set().as_set(), second.key_set().as_set());
    assert_eq!(first.len(), 4);
}

#[test]
fn test_membership_law() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context_with("./assets", &ContextOptions::default())
        .unwrap();

    for key in ctx.keys() {
        assert!(ctx.call(&key).is_ok(), "key {key} should load");
    }

    for key in ["./sub", "sub/b.txt", "./missing.txt", "./sub/../a.txt"] {
        assert!(
            matches!(ctx.call(key), Err(ContextError::MissingKey(_))),
            "key {key} should be missing"
        );
    }
}

#[test]
fn test_empty_filter_scenario() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", true, &Regex::new(r"\.png$").unwrap(), TimingMode::Sync)
        .unwrap();

    assert!(ctx.keys().is_empty());
    assert!(ctx.is_empty());
    assert!(matches!(
        ctx.call("./a.txt"),
        Err(ContextError::MissingKey(_))
    ));
}

#[test]
fn test_request_to_file_fails_resolution() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let err = maker
        .make_context(&home(&dir))
        .context("./assets/a.txt", true, &txt(), TimingMode::Sync)
        .unwrap_err();

    match err {
        ContextError::Resolution { base, request, .. } => {
            assert_eq!(base, dir.path().join("app"));
            assert_eq!(request, "./assets/a.txt");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_resolution_failure_lists_nothing() {
    let dir = fixture();
    let calls = Arc::new(AtomicUsize::new(0));
    let maker = ContextMaker::new(FileLoader).with_lister(CountingLister {
        calls: Arc::clone(&calls),
        fail_on: None,
    });
    let factory = maker.make_context(&home(&dir));

    let err = factory
        .context("./assets/a.txt", true, &txt(), TimingMode::Sync)
        .unwrap_err();
    assert!(matches!(err, ContextError::Resolution { .. }));

    let err = factory
        .context("./missing", true, &txt(), TimingMode::Sync)
        .unwrap_err();
    assert!(matches!(err, ContextError::Resolution { .. }));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listing_failure_reaches_caller() {
    let dir = fixture();
    let calls = Arc::new(AtomicUsize::new(0));
    let maker = ContextMaker::new(FileLoader).with_lister(CountingLister {
        calls: Arc::clone(&calls),
        fail_on: Some("sub"),
    });

    let err = maker
        .make_context(&home(&dir))
        .context("./assets", true, &txt(), TimingMode::Sync)
        .unwrap_err();

    match err {
        ContextError::Listing { path, source } => {
            assert!(path.ends_with("assets/sub"));
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Without recursion the failing subdirectory is never listed
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", false, &txt(), TimingMode::Sync)
        .unwrap();
    assert_eq!(ctx.keys(), vec!["./a.txt".to_string()]);
}

#[test]
fn test_unrecognized_mode_loads_immediately() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", false, &txt(), TimingMode::from("weak"))
        .unwrap();

    let loaded = ctx.call("./a.txt").unwrap();
    assert_eq!(loaded.into_immediate(), Some(Module::Text("alpha".into())));
}

#[test]
fn test_stale_keys_are_kept() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", false, &txt(), TimingMode::Sync)
        .unwrap();

    fs::write(dir.path().join("app/assets/new.txt"), "late").unwrap();
    fs::remove_file(dir.path().join("app/assets/a.txt")).unwrap();

    assert_eq!(ctx.keys(), vec!["./a.txt"]);
    assert!(matches!(
        ctx.call("./new.txt"),
        Err(ContextError::MissingKey(_))
    ));
    assert!(matches!(
        ctx.call("./a.txt"),
        Err(ContextError::Load(LoadError::Io { .. }))
    ));
}

#[test]
fn test_resolve_returns_absolute_path() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", true, &txt(), TimingMode::Sync)
        .unwrap();

    let path = ctx.resolve("./sub/b.txt").unwrap();
    assert!(path.is_absolute());
    assert_eq!(fs::read_to_string(path).unwrap(), "bravo");
    assert!(ctx.root().ends_with(Path::new("app").join("assets")));
}

#[tokio::test]
async fn test_deferred_matches_immediate() {
    let dir = fixture();
    let maker = ContextMaker::new(FileLoader);
    let factory = maker.make_context(&home(&dir));
    let everything = Regex::new(".").unwrap();

    let eager = factory
        .context("./assets", true, &everything, TimingMode::Eager)
        .unwrap();

    for mode in ["lazy", "lazy-once", "async-weak"] {
        let deferred = factory
            .context("./assets", true, &everything, TimingMode::from(mode))
            .unwrap();

        for key in deferred.keys() {
            let loaded = deferred.call(&key).unwrap();
            assert!(loaded.is_deferred(), "{mode} should defer");
            let value = loaded.settle().await.unwrap();

            let direct = eager.call(&key).unwrap().into_immediate().unwrap();
            assert_eq!(value, direct);
        }
    }
}

#[tokio::test]
async fn test_deferred_load_failure_surfaces_on_await() {
    let dir = fixture();
    fs::write(dir.path().join("app/assets/broken.json"), "{").unwrap();

    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("./assets", false, &Regex::new(r"\.json$").unwrap(), TimingMode::Lazy)
        .unwrap();

    // Creating the deferred load succeeds; the failure arrives when awaited
    let deferred = ctx.call("./broken.json").unwrap().into_deferred().unwrap();
    assert!(matches!(deferred.await, Err(LoadError::Parse { .. })));

    let ok = ctx.call("./data.json").unwrap().settle().await.unwrap();
    assert_eq!(ok.as_json().unwrap()["answer"], 42);
}

#[test]
fn test_caching_loader_shared_across_contexts() {
    let dir = fixture();
    let maker = ContextMaker::new(CachingLoader::new(FileLoader));
    let factory = maker.make_context(&home(&dir));

    let first = factory
        .context("./assets", false, &txt(), TimingMode::Sync)
        .unwrap();
    first.call("./a.txt").unwrap();
    assert_eq!(maker.loader().len(), 1);

    let second = factory
        .context("./assets", true, &txt(), TimingMode::Sync)
        .unwrap();
    second.call("./a.txt").unwrap();
    second.call("./sub/b.txt").unwrap();
    assert_eq!(maker.loader().len(), 2);
}

#[test]
fn test_package_directory_context() {
    let dir = fixture();
    let pkg = dir.path().join("node_modules/icons");
    fs::create_dir_all(pkg.join("svg")).unwrap();
    fs::write(pkg.join("package.json"), r#"{"main": "index.js"}"#).unwrap();
    fs::write(pkg.join("index.js"), "").unwrap();
    fs::write(pkg.join("svg/star.svg"), "<svg/>").unwrap();

    let maker = ContextMaker::new(FileLoader);
    let ctx = maker
        .make_context(&home(&dir))
        .context("icons", true, &Regex::new(r"\.svg$").unwrap(), TimingMode::Sync)
        .unwrap();

    assert_eq!(ctx.keys(), vec!["./svg/star.svg"]);
}
