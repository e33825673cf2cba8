//! The host evaluator contract (`spec.md` §6): what the compiled
//! artifact expects from its runtime at render time. The compiler
//! itself never calls these — they exist so the crate's tests can
//! assert against a concrete implementation, and so a real host has a
//! trait to implement.

use crate::error::{CompileError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A name registered in the functions table, together with the bound
/// result-cache size the spec's `register()` contract takes.
#[derive(Clone)]
struct Registration {
    cache_bound: u32,
}

/// `(name, hash_of_args)` entry in the render-time call-result cache.
/// Eviction is the counter-plus-recompute policy `spec.md` §9 adopts
/// over the alternative FIFO policy seen elsewhere in the source: the
/// last result is kept until `cache_bound` repeated calls with
/// identical arguments have been served from cache, at which point the
/// next call recomputes and the counter resets.
struct CachedCall {
    last_result: String,
    hit_count: u32,
}

/// `register(name, callable, cache_bound)` plus the render-time
/// call-result cache described in `spec.md` §6.
pub struct FunctionTable {
    // IndexMap preserves registration order for deterministic
    // iteration (e.g. a host listing registered functions in a
    // debug/diagnostic dump).
    registered: IndexMap<String, Registration>,
    cache: HashMap<(String, u64), CachedCall>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable {
            registered: IndexMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Registers `name` with a render-time cache bound. `cache_bound =
    /// 0` disables result caching for this function. Re-registering an
    /// already-registered name is a fatal error.
    pub fn register(&mut self, name: &str, cache_bound: u32) -> Result<()> {
        if self.registered.contains_key(name) {
            return Err(CompileError::FunctionAlreadyRegistered {
                name: name.to_string(),
            });
        }
        self.registered.insert(name.to_string(), Registration { cache_bound });
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Registered function names in registration order.
    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.registered.keys().map(String::as_str)
    }

    /// Looks up (or computes and stores) the cached result for a call,
    /// given the already-hashed arguments and a closure that performs
    /// the actual (expensive) computation. Returns
    /// `UnknownTemplateFunction` if `name` was never registered.
    pub fn call_cached(
        &mut self,
        name: &str,
        args_hash: u64,
        compute: impl FnOnce() -> String,
    ) -> Result<String> {
        let reg = self
            .registered
            .get(name)
            .ok_or_else(|| CompileError::UnknownTemplateFunction { name: name.to_string() })?
            .clone();

        if reg.cache_bound == 0 {
            return Ok(compute());
        }

        let key = (name.to_string(), args_hash);
        let needs_recompute = match self.cache.get(&key) {
            None => true,
            Some(entry) => entry.hit_count >= reg.cache_bound,
        };

        if needs_recompute {
            let result = compute();
            self.cache.insert(
                key,
                CachedCall {
                    last_result: result.clone(),
                    hit_count: 0,
                },
            );
            Ok(result)
        } else {
            let entry = self.cache.get_mut(&key).unwrap();
            entry.hit_count += 1;
            Ok(entry.last_result.clone())
        }
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// What a partial-include operation returns: either the compiled
/// partial's source (to be woven in further) or an already-rendered
/// string, depending on the `render` flag passed to it.
pub enum PartialResult {
    Source(String),
    Rendered(String),
}

/// The host evaluator contract: variable binding is the caller's
/// concern and isn't modeled here; escaping and partial-include are,
/// since the compiler's own tests assert against them.
pub trait HostEvaluator {
    /// HTML-entity-escapes `value` with `ENT_QUOTES`-equivalent
    /// semantics (both single and double quotes are escaped).
    fn escape_html(&self, value: &str) -> String;

    fn include_partial(&self, path: &str, render: bool) -> Result<PartialResult>;
}

/// A minimal reference `HostEvaluator`, sufficient for testing the
/// compiler's output shape without a real render pipeline.
pub struct ReferenceHost {
    pub partials: HashMap<String, String>,
}

impl ReferenceHost {
    pub fn new() -> Self {
        ReferenceHost { partials: HashMap::new() }
    }
}

impl Default for ReferenceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEvaluator for ReferenceHost {
    fn escape_html(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                other => out.push(other),
            }
        }
        out
    }

    fn include_partial(&self, path: &str, render: bool) -> Result<PartialResult> {
        let source = self
            .partials
            .get(path)
            .cloned()
            .ok_or_else(|| CompileError::TemplateNotFound { path: path.to_string() })?;
        if render {
            Ok(PartialResult::Rendered(source))
        } else {
            Ok(PartialResult::Source(source))
        }
    }
}
