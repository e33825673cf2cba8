use thiserror::Error;

/// Errors that can occur while compiling a template. All variants are
/// fatal to the in-flight compilation: there is no local recovery, so a
/// caller sees at most one `CompileError` per `compile()` call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("template not found: {path}")]
    TemplateNotFound { path: String },

    #[error("cache directory is not writable: {path}")]
    CacheDirNotWritable { path: String },

    #[error("translation blueprint mismatch in {path}: expected tag(s) {expected:?}, got {actual:?}")]
    TranslationBlueprintMismatch {
        path: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("translations may not be nested: `{outer_tag}` already opened a translation scope when `{inner_tag}` tried to open another")]
    NestedTranslation { outer_tag: String, inner_tag: String },

    #[error("unknown template function `{name}` (not registered)")]
    UnknownTemplateFunction { name: String },

    #[error("`s-bind` used without a `:<type>` suffix on attribute `{attr_name}`")]
    MissingBindType { attr_name: String },

    /// A directive's value did not match its grammar (e.g. a malformed
    /// `s-for` expression). Not one of the named kinds in the original
    /// error taxonomy, but the taxonomy does not claim to be exhaustive
    /// over every parse failure, so this carries the same path/tag
    /// context the named kinds do.
    #[error("invalid `{directive}` directive on `{tag}`: {reason} (value: `{value}`)")]
    InvalidDirective {
        directive: String,
        tag: String,
        value: String,
        reason: String,
    },

    #[error("a function named `{name}` is already registered")]
    FunctionAlreadyRegistered { name: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;
