//! Full pipeline: discovery through rendering to files on disk.

use std::path::Path;

use casegen::discover::{Module, ModuleRegistry, Signature, Value};
use casegen::plugin::{collection_hook, CreateOptions};
use casegen::{create_tests, Origin, Param, TypeExpr};
use tempfile::tempdir;

fn example_module(src: &Path) -> Module {
    Module::new("example_module", src.join("example_module.rs"))
        .with_value("GREETING", Value::Str("Hello".to_string()))
        .with_function(
            "temp_func",
            Signature::new(vec![Param::new("x", TypeExpr::atom(Origin::Int))]),
        )
        .with_class("TempClass", Signature::empty())
}

#[test]
fn create_tests_writes_one_file_per_module() {
    let root = tempdir().expect("tempdir");
    let src = root.path().join("src");
    let dst = root.path().join("tests");
    let mut registry = ModuleRegistry::new();
    registry.register_module(example_module(&src));
    registry.register_module(
        Module::new("widgets", src.join("pkg").join("widgets.rs"))
            .with_function("make_widget", Signature::empty()),
    );

    let created = create_tests(&registry, &src, &dst).expect("pipeline succeeds");
    assert_eq!(created.len(), 2);
    assert!(created[0].ends_with("test_example_module.rs"));
    assert!(created[1].ends_with("test_widgets.rs"));

    let text = std::fs::read_to_string(&created[0]).expect("readable output");
    assert!(text.starts_with("//! Tests for example_module."));
    assert!(text.contains("use crate::example_module::temp_func;"));
    assert!(text.contains("use crate::example_module::TempClass;"));
    assert!(text.contains("#[test]\nfn test_temp_func() {"));
    assert!(text.contains("#[test]\nfn test_greeting() {"));
    assert!(text.contains("unimplemented!();"));

    let text = std::fs::read_to_string(&created[1]).expect("readable output");
    assert!(text.contains("use crate::pkg::widgets::make_widget;"));
    assert!(text.contains("fn test_make_widget() {"));
}

#[test]
fn create_tests_skips_unloadable_modules() {
    let root = tempdir().expect("tempdir");
    let src = root.path().join("src");
    let dst = root.path().join("tests");
    let mut registry = ModuleRegistry::new();
    registry.register("broken", src.join("broken.rs"), || {
        Err(casegen::LoadError::import("side effect exploded"))
    });
    registry.register_module(example_module(&src));

    let created = create_tests(&registry, &src, &dst).expect("pipeline succeeds");
    assert_eq!(created.len(), 1);
    assert!(created[0].ends_with("test_example_module.rs"));
}

#[test]
fn create_tests_with_nothing_discovered_creates_nothing() {
    let root = tempdir().expect("tempdir");
    let src = root.path().join("src");
    let dst = root.path().join("tests");
    let registry = ModuleRegistry::new();

    let created = create_tests(&registry, &src, &dst).expect("empty walk is fine");
    assert!(created.is_empty());
    // No destination directory appears for an empty run.
    assert!(!dst.exists());
}

#[test]
fn collection_hook_generates_and_clears_items() {
    let root = tempdir().expect("tempdir");
    let src = root.path().join("src");
    let mut registry = ModuleRegistry::new();
    registry.register_module(example_module(&src));

    let mut items = vec!["existing_test_a", "existing_test_b"];
    let options = CreateOptions::enabled();
    let created = collection_hook(&options, &registry, root.path(), &mut items)
        .expect("hook succeeds");

    assert_eq!(created.len(), 1);
    assert!(items.is_empty(), "collection must be cleared for a create run");
    assert!(created[0].starts_with(root.path().join("tests").join("unit_tests")));
}

#[test]
fn collection_hook_honors_explicit_src() {
    let root = tempdir().expect("tempdir");
    let elsewhere = tempdir().expect("tempdir");
    let mut registry = ModuleRegistry::new();
    registry.register_module(example_module(elsewhere.path()));

    let mut items: Vec<&str> = Vec::new();
    let options = CreateOptions::enabled().with_src(elsewhere.path());
    let created =
        collection_hook(&options, &registry, root.path(), &mut items).expect("hook succeeds");
    assert_eq!(created.len(), 1);
}
