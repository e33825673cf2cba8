//! A compiling template engine (`spec.md` §1): consumes an HTML/XML-flavored
//! template annotated with a small directive language and produces an
//! executable artifact for a host evaluation environment to render.
//!
//! The crate's value is the *compilation* step, not rendering: tokenizing
//! mixed markup, recognizing directives that control flow, rewriting
//! interpolation syntax, rewriting bare function calls into host-resolved
//! dispatch, statically merging co-existing attribute bindings, and weaving
//! an internationalization pass through the compiled output. Rendering is
//! the host's job; see the [`host`] module for the contract it must meet.

pub mod ast;
pub mod attributes;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod expression_rewriter;
pub mod host;
pub mod interpolation;
pub mod node_compiler;
pub mod parser;
pub mod schema;
pub mod translation;

pub use ast::{Arena, NodeKind};
pub use cache::CompileCache;
pub use config::CompilerConfig;
pub use error::{CompileError, Result};
pub use parser::ContentType;

use std::path::Path;

/// Compiles an already-parsed template tree for `source_path`, consulting
/// `cache` first when `config.cache_enabled` is set. This is the crate's
/// single top-level entry point; everything else composes beneath it.
pub fn compile(
    cache: &CompileCache,
    config: &CompilerConfig,
    source_path: &Path,
    arena: &Arena,
) -> Result<String> {
    compiler::compile(cache, config, source_path, arena)
}

/// Parses and compiles `source` directly, bypassing the on-disk cache and
/// the path-existence check `compile()` performs. Convenient for callers
/// (and tests) that already hold template text in memory rather than a
/// file on disk.
pub fn compile_str(source: &str, content_type: ContentType, config: &CompilerConfig) -> Result<String> {
    let arena = parser::parse(source, content_type)?;
    node_compiler::compile_tree(&arena, config)
}
