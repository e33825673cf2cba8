/// Compiler configuration, mirroring the shape (not the content) of a
/// typical template-engine config object: a handful of booleans that
/// flip pipeline behavior, rather than anything that changes the parser
/// grammar itself.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Drop `Comment` nodes instead of passing them through as literal
    /// text.
    pub skip_comments: bool,
    /// Whether the `CompileCache` is consulted at all. Disabling this
    /// forces a recompile on every call regardless of mtime.
    pub cache_enabled: bool,
    /// The Interpolation Scanner's open/close delimiter policy (see
    /// `spec.md` §9's first open question). `false` (default)
    /// reproduces the documented source behavior: whichever closing
    /// delimiter style is seen first terminates the currently open
    /// span, regardless of which style opened it. `true` requires the
    /// closing style to match the opening style, silently dropping
    /// spans whose close doesn't match (same as an unbalanced span).
    pub interpolation_open_close_must_match: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            skip_comments: false,
            cache_enabled: true,
            interpolation_open_close_must_match: false,
        }
    }
}
