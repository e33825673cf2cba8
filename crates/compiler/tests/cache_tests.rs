//! Compile Cache tests (`spec.md` §4.6, §6 "Cache layout").

use pretty_assertions::assert_eq;
use s_template_compiler::cache::{source_mtime, CompileCache};
use s_template_compiler::config::CompilerConfig;
use s_template_compiler::error::CompileError;
use s_template_compiler::{compile, Arena, NodeKind};
use std::fs;

fn unique_dir(test_name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("s-template-compiler-cache-tests-{test_name}"))
}

fn minimal_arena(text: &str) -> Arena {
    let mut arena = Arena::new();
    let root = arena.add_root(NodeKind::Element(s_template_compiler::ast::Element {
        tag: s_template_compiler::ast::Tag::new("p"),
        raw: String::new(),
        attrs: vec![],
        children: vec![],
    }));
    arena.add_child(root, NodeKind::Text(text.to_string()));
    arena
}

#[test]
fn put_then_get_round_trips_the_artifact_and_mtime() {
    let dir = unique_dir("roundtrip");
    let cache = CompileCache::new(&dir);
    cache.ensure_writable().unwrap();
    let source = dir.join("a.sft");

    cache.put(&source, "<p>compiled</p>", 42).unwrap();
    let (artifact, mtime) = cache.get(&source).unwrap();
    assert_eq!(artifact, "<p>compiled</p>");
    assert_eq!(mtime, 42);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn get_is_absent_for_an_uncached_path() {
    let dir = unique_dir("absent");
    let cache = CompileCache::new(&dir);
    assert!(cache.get(&dir.join("never-written.sft")).is_none());
}

#[test]
fn needs_recompile_is_true_when_the_cache_is_disabled() {
    let dir = unique_dir("disabled");
    let cache = CompileCache::new(&dir);
    cache.ensure_writable().unwrap();
    let source = dir.join("a.sft");
    fs::write(&source, "x").unwrap();
    cache.put(&source, "compiled", source_mtime(&source).unwrap()).unwrap();

    assert!(cache.needs_recompile(&source, false));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn needs_recompile_is_true_for_an_absent_entry() {
    let dir = unique_dir("absent-entry");
    let cache = CompileCache::new(&dir);
    let source = dir.join("never-compiled.sft");
    assert!(cache.needs_recompile(&source, true));
}

#[test]
fn needs_recompile_is_false_when_source_mtime_is_older_than_the_stored_entry() {
    let dir = unique_dir("fresh");
    let cache = CompileCache::new(&dir);
    cache.ensure_writable().unwrap();
    let source = dir.join("a.sft");
    fs::write(&source, "x").unwrap();

    // Store an entry stamped from the future relative to the source's
    // actual mtime: a recompile is unnecessary.
    let current = source_mtime(&source).unwrap();
    cache.put(&source, "compiled", current + 3600).unwrap();

    assert!(!cache.needs_recompile(&source, true));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn needs_recompile_is_true_when_source_mtime_has_advanced_past_the_stored_entry() {
    let dir = unique_dir("stale");
    let cache = CompileCache::new(&dir);
    cache.ensure_writable().unwrap();
    let source = dir.join("a.sft");
    fs::write(&source, "x").unwrap();

    let current = source_mtime(&source).unwrap();
    cache.put(&source, "compiled", current.saturating_sub(3600)).unwrap();

    assert!(cache.needs_recompile(&source, true));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn compile_fails_with_template_not_found_when_the_source_path_does_not_exist() {
    let dir = unique_dir("not-found");
    let cache = CompileCache::new(&dir);
    let config = CompilerConfig::default();
    let arena = minimal_arena("x");
    let missing = dir.join("definitely-does-not-exist.sft");

    let err = compile(&cache, &config, &missing, &arena).unwrap_err();
    assert!(matches!(err, CompileError::TemplateNotFound { .. }));
}

#[test]
fn compile_writes_through_the_cache_on_a_miss() {
    let dir = unique_dir("compile-writes-through");
    let cache = CompileCache::new(&dir);
    let config = CompilerConfig::default();
    let source = dir.join("page.sft");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&source, "<p>hi</p>").unwrap();
    let arena = minimal_arena("hi");

    let first = compile(&cache, &config, &source, &arena).unwrap();
    assert_eq!(first, "<p>hi</p>");
    assert!(cache.get(&source).is_some());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn compile_serves_a_cached_artifact_while_the_stored_entry_is_still_fresh() {
    let dir = unique_dir("compile-cache-hit");
    let cache = CompileCache::new(&dir);
    let config = CompilerConfig::default();
    let source = dir.join("page.sft");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&source, "<p>hi</p>").unwrap();

    // Pre-seed a cache entry stamped from the future relative to the
    // source's actual mtime, so `needs_recompile` reports fresh and
    // `compile()` must serve the stored artifact instead of the
    // (deliberately different) supplied tree.
    let current = source_mtime(&source).unwrap();
    cache.put(&source, "<p>CACHED</p>", current + 3600).unwrap();

    let out = compile(&cache, &config, &source, &minimal_arena("DIFFERENT")).unwrap();
    assert_eq!(out, "<p>CACHED</p>");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn compile_with_cache_disabled_always_recompiles() {
    let dir = unique_dir("compile-disabled");
    let cache = CompileCache::new(&dir);
    let config = CompilerConfig { cache_enabled: false, ..CompilerConfig::default() };
    let source = dir.join("page.sft");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&source, "<p>hi</p>").unwrap();

    let first = compile(&cache, &config, &source, &minimal_arena("hi")).unwrap();
    let second = compile(&cache, &config, &source, &minimal_arena("DIFFERENT")).unwrap();
    assert_eq!(first, "<p>hi</p>");
    assert_eq!(second, "<p>DIFFERENT</p>");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn cache_filenames_are_stable_across_separate_instances() {
    let dir = unique_dir("filenames-stable");
    let cache_a = CompileCache::new(&dir);
    let cache_b = CompileCache::new(&dir);
    cache_a.ensure_writable().unwrap();
    let source = dir.join("shared.sft");

    cache_a.put(&source, "one", 1).unwrap();
    let (artifact, mtime) = cache_b.get(&source).unwrap();
    assert_eq!(artifact, "one");
    assert_eq!(mtime, 1);

    fs::remove_dir_all(&dir).ok();
}
