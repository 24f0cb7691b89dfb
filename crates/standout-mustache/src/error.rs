//! Error types for compiling and rendering templates.
//!
//! Compilation fails with [`ParseError`], which always carries the line the
//! problem was found on. Rendering fails with [`RenderError`]. Partial
//! providers report their own failures through [`PartialError`], which the
//! renderer passes through unchanged. Converting host data with
//! [`Value::from_serialize`](crate::Value::from_serialize) fails with
//! [`SerializeError`].

use thiserror::Error;

/// A template failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based source line.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// The reason a template failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A tag with nothing between its delimiters, e.g. `{{ }}`.
    #[error("empty tag")]
    EmptyTag,

    /// An open delimiter without a matching close delimiter.
    #[error("unmatched open tag")]
    UnmatchedOpenTag,

    /// A `{{/name}}` tag with no section open.
    #[error("unmatched close tag")]
    UnmatchedCloseTag,

    /// A close tag whose name differs from the open section.
    #[error("interleaved closing tag: {0}")]
    InterleavedCloseTag(String),

    /// End of input reached while a section was still open.
    #[error("section `{0}` has no closing tag")]
    UnclosedSection(String),

    /// A delimiter change tag that does not end with `=`.
    #[error("invalid delimiter tag")]
    InvalidDelimiters,
}

/// A partial could not be provided.
#[derive(Debug, Error)]
pub enum PartialError {
    /// The provider has no partial under this name.
    #[error("partial '{0}' not found")]
    NotFound(String),

    /// The provider knows the name but failed to load it.
    #[error("failed to load partial '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Rendering a compiled template failed.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A variable resolved to nothing while missing variables are errors.
    #[error("missing variable {0:?}")]
    MissingVariable(String),

    /// The partial provider failed.
    #[error(transparent)]
    Partial(#[from] PartialError),

    /// A partial's source did not compile.
    #[error("partial '{name}': {source}")]
    PartialSyntax {
        name: String,
        #[source]
        source: ParseError,
    },

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host data could not be converted into a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// A map key serialized to something other than a string or scalar.
    #[error("map key must be a string, number or bool")]
    KeyNotScalar,

    /// Raised by the host type's `Serialize` impl.
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for SerializeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SerializeError::Custom(msg.to_string())
    }
}

/// Either phase of a one-shot compile and render failed.
///
/// Returned by the crate-level [`render`](crate::render) shorthands, which
/// compile and render in one call.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
