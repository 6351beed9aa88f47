use serde_json::json;

use super::*;

fn run(source: &str) -> Detection {
    detect(source, &CollectorOptions::default()).expect("source should parse")
}

#[test]
fn test_direct_and_nested_dependencies() {
    let detection = run(r#"
        define(['./a', 'require', './b'], function (require) {
            var c = require('./c');
            require(['./d', './a'], function () {});
            return {};
        });
    "#);

    assert_eq!(detection.direct, vec!["./a", "./b"]);
    assert_eq!(detection.nested, vec!["./c", "./d"]);
    assert!(detection.named_modules.is_empty());
}

#[test]
fn test_top_level_require_array_is_direct() {
    let detection = run("require(['app/main', 'module', 'exports'], function (main) { main.start(); });");
    assert_eq!(detection.direct, vec!["app/main"]);
    assert!(detection.nested.is_empty());
}

#[test]
fn test_nested_dependencies_can_be_disabled() {
    let options = CollectorOptions {
        find_nested_dependencies: false,
        ..CollectorOptions::default()
    };
    let detection = detect(
        "define(['./a'], function (require) { require('./b'); });",
        &options,
    )
    .unwrap();
    assert_eq!(detection.direct, vec!["./a"]);
    assert!(detection.nested.is_empty());
}

#[test]
fn test_named_modules() {
    let detection = run(r#"
        define('app/main', ['./util'], function () {});
        define('app/util', function () {});
    "#);
    assert_eq!(detection.named_modules, vec!["app/main", "app/util"]);
    assert_eq!(detection.direct, vec!["./util"]);
}

#[test]
fn test_dynamic_identifiers_are_ignored() {
    let detection = run(r#"
        var name = 'x';
        require([name], function () {});
        define([name + '/y', './z'], function () {});
    "#);
    assert_eq!(detection.direct, vec!["./z"]);
    assert!(detection.nested.is_empty());
}

#[test]
fn test_config_reflects_literals_only() {
    let detection = run(r#"
        require.config({
            baseUrl: 'js',
            paths: { app: '../app', jquery: ['//cdn/jquery', 'lib/jquery'] },
            shim: { backbone: { deps: ['underscore'], exports: 'Backbone' } },
            waitSeconds: 15,
            enforceDefine: false,
            urlArgs: null,
            callback: function () {},
            computed: compute(),
            [dynamicKey]: 1
        });
    "#);

    assert_eq!(
        detection.config.map(Value::Object),
        Some(json!({
            "baseUrl": "js",
            "paths": { "app": "../app", "jquery": ["//cdn/jquery", "lib/jquery"] },
            "shim": { "backbone": { "deps": ["underscore"], "exports": "Backbone" } },
            "waitSeconds": 15,
            "enforceDefine": false,
            "urlArgs": null
        }))
    );
}

#[test]
fn test_first_config_wins() {
    let detection = run(r#"
        requirejs.config({ baseUrl: 'first' });
        require.config({ baseUrl: 'second' });
    "#);
    assert_eq!(
        detection.config.and_then(|c| c.get("baseUrl").cloned()),
        Some(json!("first"))
    );
}

#[test]
fn test_config_requires_single_object_argument() {
    assert!(run("require.config(cfg);").config.is_none());
    assert!(run("require.config({ a: 1 }, extra);").config.is_none());
    assert!(run("other.config({ a: 1 });").config.is_none());
}

#[test]
fn test_loader_library_detection() {
    assert!(run("var requirejs, require, define; (function (global) {})(this);").is_loader_library);
    assert!(!run("var require, define;").is_loader_library);
    assert!(!run("function f() { var requirejs, require, define; }").is_loader_library);
}

#[test]
fn test_plugin_with_load_is_loader() {
    let detection = run(r#"
        define(['module'], function () {
            'use strict';
            return {
                load: function (name, req, onLoad, config) {
                    req([name], function (value) { onLoad(value); });
                }
            };
        });
    "#);
    assert_eq!(detection.plugin_kind, PluginKind::Loader);
    // `req([name])` is dynamic and must not leak into dependencies
    assert!(detection.direct.is_empty());
    assert!(detection.nested.is_empty());
}

#[test]
fn test_plugin_with_write_is_inliner() {
    let detection = run("define({ load: function () {}, write: function () {} });");
    assert_eq!(detection.plugin_kind, PluginKind::Inliner);
}

#[test]
fn test_arrow_factory_plugin() {
    let detection = run("define([], () => ({ load(name, req, onLoad) { onLoad(); } }));");
    assert_eq!(detection.plugin_kind, PluginKind::Loader);
}

#[test]
fn test_plugin_object_bound_to_a_variable() {
    let detection = run(r#"
        define(['module'], function (module) {
            var text = {
                load: function (name, req, onLoad, config) {},
                get: function (url, callback) {}
            };
            return text;
        });
    "#);
    assert_eq!(detection.plugin_kind, PluginKind::Loader);

    let detection = run(
        "define(function () { const i18n = { load() {}, write() {} }; return (i18n); });",
    );
    assert_eq!(detection.plugin_kind, PluginKind::Inliner);
}

#[test]
fn test_plugin_methods_assigned_to_returned_binding() {
    let detection = run(r#"
        define(function () {
            var plugin = {};
            plugin.load = function (name, req, onLoad) { onLoad(); };
            return plugin;
        });
    "#);
    assert_eq!(detection.plugin_kind, PluginKind::Loader);

    let detection = run(r#"
        define(function () {
            var json = { load: function () {} };
            json.write = function () {};
            return json;
        });
    "#);
    assert_eq!(detection.plugin_kind, PluginKind::Inliner);

    // Assignments to some other binding do not count
    let detection = run(r#"
        define(function () {
            var helper = {}, api = {};
            helper.load = function () {};
            return api;
        });
    "#);
    assert_eq!(detection.plugin_kind, PluginKind::None);
}

#[test]
fn test_plain_module_is_not_a_plugin() {
    let detection = run("define(function () { return { version: 1 }; });");
    assert_eq!(detection.plugin_kind, PluginKind::None);
}

#[test]
fn test_syntax_error() {
    let err = detect("define([", &CollectorOptions::default()).unwrap_err();
    assert!(matches!(err, DetectError::Parse { count, .. } if count >= 1));
}
