//! Mustache - Logic-less templates with layered contexts and pluggable partials.
//!
//! Templates are compiled once into a tree and rendered against a chain of
//! [`Value`]s. The engine supports:
//!
//! - Variables, escaped (`{{name}}`) or raw (`{{{name}}}`, `{{&name}}`)
//! - Sections and inverted sections (`{{#list}}...{{/list}}`, `{{^empty}}...{{/empty}}`)
//! - Partials resolved through a [`PartialProvider`] at render time
//! - Delimiter changes (`{{=<% %>=}}`) and comments (`{{! ... }}`)
//! - Dotted names (`{{user.address.city}}`) and the implicit iterator `{{.}}`
//! - Host objects with methods through the [`Object`] trait
//!
//! # Quick Start
//!
//! ```rust
//! use standout_mustache::{Template, Value};
//! use serde_json::json;
//!
//! let template = Template::compile("{{#items}}<{{.}}>{{/items}}").unwrap();
//! let data = Value::from(json!({"items": ["a", "b"]}));
//!
//! assert_eq!(template.render(&[data]).unwrap(), "<a><b>");
//! ```
//!
//! # Context Chains
//!
//! Every render takes a slice of contexts, innermost first. A name is looked
//! up in each context in turn and the first one that has it wins, even if it
//! holds null. Sections over a map or object push it onto the front of the
//! chain; sections over a list push each item in turn.
//!
//! ```rust
//! use standout_mustache::{render, Value};
//! use serde_json::json;
//!
//! let page = Value::from(json!({"title": "Home"}));
//! let site = Value::from(json!({"title": "Site", "author": "Ann"}));
//!
//! let output = render("{{title}} by {{author}}", &[page, site]).unwrap();
//! assert_eq!(output, "Home by Ann");
//! ```
//!
//! # Truthiness
//!
//! | Value | Empty when |
//! |-------|------------|
//! | Null / missing | always |
//! | Bool | `false` |
//! | Number | zero |
//! | String | blank after trimming whitespace |
//! | List | no items |
//! | Map | never |
//! | Struct (via [`Value::from_serialize`]) | every field is empty |
//! | Object | [`Object::is_empty`] says so |
//!
//! A section renders when its value is not empty; an inverted section
//! renders when it is.
//!
//! # Errors
//!
//! Compilation reports a [`ParseError`] with the offending line. Rendering
//! reports a [`RenderError`]. Missing variables render as nothing unless
//! [`Options::error_on_missing`] is set.

mod error;
mod escape;
mod lexer;
mod lookup;
mod parser;
mod partials;
mod render;
mod ser;
mod tag;
mod template;
mod value;

use std::sync::Arc;

// Re-export public API
pub use error::{Error, ParseError, ParseErrorKind, PartialError, RenderError, SerializeError};
pub use escape::escape_html;
pub use partials::{EmptyProvider, PartialProvider, StaticProvider};
pub use tag::{Tag, TagType};
pub use template::{Options, Template};
pub use value::{Number, Object, Value};

/// Compiles `source` with no partials. Shorthand for [`Template::compile`].
pub fn compile(source: &str) -> Result<Template, ParseError> {
    Template::compile(source)
}

/// Compiles `source` against a partial provider.
pub fn compile_with_partials(
    source: &str,
    partials: Arc<dyn PartialProvider>,
) -> Result<Template, ParseError> {
    Template::compile_with_partials(source, partials)
}

/// Compiles and renders `source` in one call.
///
/// ```rust
/// use standout_mustache::{render, Value};
///
/// let data: Value = [("name", "World")].into_iter().collect();
/// assert_eq!(render("Hello {{name}}!", &[data]).unwrap(), "Hello World!");
/// ```
pub fn render(source: &str, contexts: &[Value]) -> Result<String, Error> {
    Ok(compile(source)?.render(contexts)?)
}

/// Compiles and renders `source` with partials in one call.
pub fn render_with_partials(
    source: &str,
    partials: Arc<dyn PartialProvider>,
    contexts: &[Value],
) -> Result<String, Error> {
    Ok(compile_with_partials(source, partials)?.render(contexts)?)
}
