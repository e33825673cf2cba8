//! Top-level entry point: wires the Compile Cache and Node Compiler
//! together, mirroring the teacher's `compiler.rs` / `render3/view/template.rs`
//! driver role.

use crate::ast::Arena;
use crate::cache::{source_mtime, CompileCache};
use crate::config::CompilerConfig;
use crate::context::CompileContext;
use crate::error::{CompileError, Result};
use crate::node_compiler;
use std::path::Path;

use tracing::debug;

/// Compiles `arena` (the already-parsed tree for `source_path`),
/// consulting the cache first when enabled. `source_path` must exist on
/// disk; its modification time drives the cache's invalidation
/// decision.
pub fn compile(cache: &CompileCache, config: &CompilerConfig, source_path: &Path, arena: &Arena) -> Result<String> {
    if !source_path.exists() {
        return Err(CompileError::TemplateNotFound {
            path: source_path.display().to_string(),
        });
    }

    if config.cache_enabled && !cache.needs_recompile(source_path, true) {
        if let Some((artifact, _)) = cache.get(source_path) {
            debug!(path = %source_path.display(), "compile cache hit");
            return Ok(artifact);
        }
    }

    debug!(path = %source_path.display(), "compiling template");
    let artifact = node_compiler::compile_tree(arena, config)?;

    if config.cache_enabled {
        cache.ensure_writable()?;
        let mtime = source_mtime(source_path).unwrap_or(0);
        cache.put(source_path, &artifact, mtime)?;
    }

    Ok(artifact)
}

/// Compiles a partial's tree using a child context derived from
/// `parent`, per `spec.md` §5: a fresh directive/translation/skip
/// state, except the parent's current skip root is inherited.
pub fn compile_partial_tree(arena: &Arena, parent: &CompileContext, config: &CompilerConfig) -> Result<String> {
    let mut child = parent.child_for_partial();
    for &root in arena.roots() {
        node_compiler::compile_root_for(arena, root, &mut child, config)?;
    }
    Ok(child.finish())
}
