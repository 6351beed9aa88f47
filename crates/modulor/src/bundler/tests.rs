use std::path::PathBuf;

use serde_json::{Value, json};

use super::*;
use crate::file::ContentKind;
use crate::graph::NewNode;

fn add(graph: &FileGraph, name: &str, kind: ContentKind, parent: Option<FileId>) -> FileId {
    graph
        .discover(
            NewNode {
                path: PathBuf::from("/www").join(name),
                name: name.to_string(),
                root: PathBuf::from("/www"),
                kind,
            },
            parent,
            usize::MAX,
        )
        .id()
        .expect("registry is unbounded")
}

fn script(graph: &FileGraph, name: &str, parent: FileId) -> FileId {
    add(graph, name, ContentKind::Script, Some(parent))
}

/// index.html -> 2.js, 3.js -> lib/module1, 4.js -> lib/module2, both
/// modules -> lib/common.
fn scenario() -> FileGraph {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    script(&graph, "2.js", html);
    let three = script(&graph, "3.js", html);
    let module1 = script(&graph, "lib/module1", three);
    let common = script(&graph, "lib/common", module1);
    let four = script(&graph, "4.js", html);
    let module2 = script(&graph, "lib/module2", four);
    graph.link(module2, common);
    graph
}

#[test]
fn test_scenario_plan() {
    let plan = BundleInferencer::default().plan(&scenario(), None);

    assert_eq!(plan.common, Some(Bundle::new("lib/common")));
    let entries: Vec<(&str, Vec<&str>)> = plan
        .entries
        .iter()
        .map(|b| (b.name.as_str(), b.include.iter().map(String::as_str).collect()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("2.js", vec![]),
            ("3.js", vec!["lib/module1"]),
            ("4.js", vec!["lib/module2"]),
        ]
    );
    assert!(
        plan.entries
            .iter()
            .all(|b| b.exclude.as_deref() == Some("lib/common"))
    );
}

#[test]
fn test_scenario_plain_manifest() {
    let manifest =
        BundleInferencer::default().infer(&scenario(), ModuleSystem::Plain, None, None);

    assert_eq!(
        manifest.to_json().unwrap(),
        json!({
            "bundles": [
                { "name": "lib/common", "include": [] },
                { "name": "2.js", "include": [], "exclude": ["lib/common"] },
                { "name": "3.js", "include": ["lib/module1"], "exclude": ["lib/common"] },
                { "name": "4.js", "include": ["lib/module2"], "exclude": ["lib/common"] }
            ],
            "paths": { "lib/module1": "3.js", "lib/module2": "4.js" }
        })
    );
}

#[test]
fn test_entry_closure_is_transitive() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let main = script(&graph, "main.js", html);
    let a = script(&graph, "a", main);
    let b = script(&graph, "b", a);
    script(&graph, "c", b);
    // Cycle back to the entry must not list the entry itself
    graph.link(b, main);

    let plan = BundleInferencer::default().plan(&graph, None);
    assert!(plan.common.is_none());
    assert_eq!(plan.entries.len(), 1);
    assert_eq!(plan.entries[0].include, vec!["a", "b", "c"]);
    assert_eq!(plan.entries[0].exclude, None);
}

#[test]
fn test_common_requires_script_first_parent() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let shared = script(&graph, "shared.js", html);
    let main = script(&graph, "main.js", html);
    graph.link(main, shared);

    let plan = BundleInferencer::default().plan(&graph, None);
    // First parent is markup: neither common nor a single-parent entry
    assert!(plan.common.is_none());
    assert_eq!(plan.entries.len(), 1);
    assert_eq!(plan.entries[0].name, "main.js");
    assert_eq!(plan.entries[0].include, vec!["shared.js"]);
}

#[test]
fn test_common_merges_every_shared_module() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let a = script(&graph, "a.js", html);
    let b = script(&graph, "b.js", html);
    let util = script(&graph, "util", a);
    let dom = script(&graph, "dom", a);
    graph.link(b, util);
    graph.link(b, dom);

    let plan = BundleInferencer::default().plan(&graph, None);
    let common = plan.common.expect("shared modules form a common bundle");
    assert_eq!(common.name, "util");
    assert_eq!(common.include, vec!["dom"]);
    for entry in &plan.entries {
        assert!(entry.include.is_empty(), "{} still ships shared code", entry.name);
    }
}

#[test]
fn test_common_name_follows_earliest_parent() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let a = script(&graph, "a.js", html);
    let b = script(&graph, "b.js", html);
    let c = script(&graph, "c.js", html);
    // b's subtree registers its module before a's does
    let late = script(&graph, "late", b);
    let early = script(&graph, "early", a);
    graph.link(c, late);
    graph.link(c, early);

    let plan = BundleInferencer::default().plan(&graph, None);
    let common = plan.common.expect("shared modules form a common bundle");
    assert_eq!(common.name, "early");
    assert_eq!(common.include, vec!["late"]);
    assert!(plan.entries.iter().all(|entry| entry.exclude.as_deref() == Some("early")));
}

#[test]
fn test_loader_file_only_excluded_for_named_loader() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let loader = script(&graph, "require.js", html);
    script(&graph, "main.js", html);

    let inferencer = BundleInferencer::default();
    let plain = inferencer.infer(&graph, ModuleSystem::Plain, Some(loader), None);
    assert_eq!(plain.bundle_names(), vec!["require.js", "main.js"]);

    let named = inferencer.infer(&graph, ModuleSystem::NamedLoader, Some(loader), None);
    assert_eq!(named.bundle_names(), vec!["main"]);
}

#[test]
fn test_named_loader_manifest() {
    let graph = FileGraph::new();
    let html = add(&graph, "index.html", ContentKind::Markup, None);
    let loader = script(&graph, "js/require.js", html);
    let main = script(&graph, "js/app/main.js", html);
    let admin = script(&graph, "js/app/admin.js", html);
    let jquery = script(&graph, "js/vendor/jquery", main);
    graph.link(admin, jquery);
    script(&graph, "js/app/views", admin);

    let raw = match json!({
        "baseUrl": "js",
        "paths": { "jquery": "vendor/jquery" },
        "shim": { "legacy": { "exports": "Legacy" } },
        "modules": ["stale"]
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let config = LoaderConfig::from_object(raw);

    let manifest = BundleInferencer::default().infer(
        &graph,
        ModuleSystem::NamedLoader,
        Some(loader),
        Some(&config),
    );

    assert_eq!(
        manifest.to_json().unwrap(),
        json!({
            "baseUrl": "js",
            "paths": { "jquery": "vendor/jquery" },
            "shim": { "legacy": { "exports": "Legacy" } },
            "modules": [
                { "name": "jquery" },
                { "name": "app/main", "exclude": ["jquery"] },
                { "name": "app/admin", "include": ["app/views"], "exclude": ["jquery"] }
            ]
        })
    );
}

#[test]
fn test_empty_graph() {
    let manifest =
        BundleInferencer::default().infer(&FileGraph::new(), ModuleSystem::Plain, None, None);
    assert!(manifest.is_empty());
    assert_eq!(manifest.to_json().unwrap(), json!({ "bundles": [], "paths": {} }));
}
