//! End-to-end analysis scenarios.

use std::path::Path;
use std::sync::Arc;

use modulor::test_utils::{MemoryRuntime, entry_scripts};
use modulor::{Analyzer, ModuleSystem, NativeRuntime};
use serde_json::json;

const LOCAL_FILES: &[(&str, &str)] = &[
    ("2.js", "console.log('standalone');"),
    ("3.js", "define(['./lib/module1'], function (module1) {});"),
    ("4.js", "define(['./lib/module2'], function (module2) {});"),
    ("lib/module1.js", "define(['./common'], function (common) { return {}; });"),
    ("lib/module2.js", "define(['./common'], function (common) { return {}; });"),
    ("lib/common.js", "define({ shared: true });"),
];

fn local_manifest() -> serde_json::Value {
    json!({
        "bundles": [
            { "name": "lib/common", "include": [] },
            { "name": "2.js", "include": [], "exclude": ["lib/common"] },
            { "name": "3.js", "include": ["lib/module1"], "exclude": ["lib/common"] },
            { "name": "4.js", "include": ["lib/module2"], "exclude": ["lib/common"] }
        ],
        "paths": { "lib/module1": "3.js", "lib/module2": "4.js" }
    })
}

#[tokio::test]
async fn test_local_example_in_memory() {
    let runtime = LOCAL_FILES
        .iter()
        .fold(MemoryRuntime::new("/www"), |rt, (name, contents)| {
            rt.with_file(name, contents)
        });
    let runtime = Arc::new(runtime);

    let result = Analyzer::new()
        .inputs(entry_scripts(Path::new("/www"), "index.html", &["2.js", "3.js", "4.js"]))
        .runtime(runtime.clone())
        .analyze()
        .await
        .unwrap();

    assert!(result.is_clean(), "{:?}", result.diagnostics);
    assert_eq!(result.module_system, ModuleSystem::Plain);
    assert_eq!(result.manifest.to_json().unwrap(), local_manifest());

    let mut common_parents = result.parents_of("lib/common");
    common_parents.sort();
    assert_eq!(common_parents, vec!["lib/module1", "lib/module2"]);
    assert_eq!(runtime.read_count(Path::new("/www/lib/common.js")), 1);
    assert_eq!(result.stats.nodes, 7);
    assert_eq!(result.stats.markup, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_local_example_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in LOCAL_FILES {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
    }

    let result = Analyzer::new()
        .inputs(entry_scripts(dir.path(), "index.html", &["2.js", "3.js", "4.js"]))
        .runtime(Arc::new(NativeRuntime::new()))
        .analyze()
        .await
        .unwrap();

    assert!(result.is_clean(), "{:?}", result.diagnostics);
    assert_eq!(result.manifest.to_json().unwrap(), local_manifest());
}

#[tokio::test]
async fn test_multipage_named_loader() {
    let runtime = MemoryRuntime::new("/www")
        .with_file(
            "js/require.js",
            "var requirejs, require, define;\n(function (global) { /* loader */ }(this));",
        )
        .with_file(
            "js/common.js",
            "requirejs.config({\n\
                 baseUrl: 'js/lib',\n\
                 paths: { app: '../app' },\n\
                 shim: { legacy: { exports: 'Legacy' } }\n\
             });",
        )
        .with_file(
            "js/page1.js",
            "requirejs(['./common'], function (common) { requirejs(['app/main1']); });",
        )
        .with_file(
            "js/page2.js",
            "requirejs(['./common'], function (common) { requirejs(['app/main2']); });",
        )
        .with_file("js/app/main1.js", "define(['jquery', './controller/c1'], function ($, c1) {});")
        .with_file("js/app/main2.js", "define(['jquery', './controller/c2'], function ($, c2) {});")
        .with_file("js/app/controller/c1.js", "define(function () {});")
        .with_file("js/app/controller/c2.js", "define(function () {});")
        .with_file("js/lib/jquery.js", "define(function () { return {}; });");

    let root = Path::new("/www");
    let mut inputs = entry_scripts(root, "page1.html", &["js/require.js", "js/page1.js"]);
    inputs.extend(entry_scripts(root, "page2.html", &["js/require.js", "js/page2.js"]));

    let result = Analyzer::new()
        .inputs(inputs)
        .runtime(Arc::new(runtime))
        .analyze()
        .await
        .unwrap();

    assert!(result.is_clean(), "{:?}", result.diagnostics);
    assert_eq!(result.module_system, ModuleSystem::NamedLoader);
    assert_eq!(
        result.configuration.as_ref().and_then(|c| c.base_url()),
        Some("js/lib")
    );
    assert_eq!(
        result.manifest.to_json().unwrap(),
        json!({
            "baseUrl": "js/lib",
            "paths": { "app": "../app" },
            "shim": { "legacy": { "exports": "Legacy" } },
            "modules": [
                { "name": "../common", "include": ["jquery"] },
                {
                    "name": "../page1",
                    "include": ["app/main1", "app/controller/c1"],
                    "exclude": ["../common"]
                },
                {
                    "name": "../page2",
                    "include": ["app/main2", "app/controller/c2"],
                    "exclude": ["../common"]
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_cycles_are_reported_and_bundled() {
    let runtime = MemoryRuntime::new("/www")
        .with_file("main.js", "define(['./a'], function () {});")
        .with_file("a.js", "define(['./b'], function () {});")
        .with_file("b.js", "define(['./a'], function () {});");

    let result = Analyzer::new()
        .inputs(entry_scripts(Path::new("/www"), "index.html", &["main.js"]))
        .runtime(Arc::new(runtime))
        .analyze()
        .await
        .unwrap();

    assert_eq!(result.dependencies_of("a"), vec!["b"]);
    assert_eq!(result.dependencies_of("b"), vec!["a"]);
    assert_eq!(result.find_cycles().len(), 1);
    assert_eq!(result.manifest.bundle_names(), vec!["main.js"]);

    let summary = result.to_string();
    assert!(summary.contains("Bundles: 1"));
    assert!(summary.contains("  - main.js"));
}

#[tokio::test]
async fn test_failures_degrade_to_diagnostics() {
    let runtime = MemoryRuntime::new("/www")
        .with_file("main.js", "define(['./ok', './missing', './broken'], function () {});")
        .with_file("ok.js", "define(function () {});")
        .with_file("broken.js", "define([,");

    let result = Analyzer::new()
        .inputs(entry_scripts(Path::new("/www"), "index.html", &["main.js"]))
        .runtime(Arc::new(runtime))
        .analyze()
        .await
        .unwrap();

    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(
        result.manifest.to_json().unwrap(),
        json!({
            "bundles": [{ "name": "main.js", "include": ["ok", "missing", "broken"] }],
            "paths": { "ok": "main.js", "missing": "main.js", "broken": "main.js" }
        })
    );
}
