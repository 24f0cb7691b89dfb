//! Compiled templates and their render entry points.
//!
//! A [`Template`] is compiled once and rendered any number of times. It is
//! immutable after compilation and `Send + Sync`, so one template may be
//! rendered from several threads at once.
//!
//! ## Which Render Method?
//!
//! | Method | Use When |
//! |--------|----------|
//! | [`Template::render`] | You want the output as a `String` |
//! | [`Template::render_to`] | Streaming into a file, socket or buffer |
//! | [`Template::render_in_layout`] | Wrapping the output in a layout that uses `{{{content}}}` |
//! | [`Template::render_in_layout_to`] | Same, streamed |
//!
//! Every method takes the context chain as a slice, innermost first: names
//! are looked up in `contexts[0]`, then `contexts[1]`, and so on.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, RenderError};
use crate::parser;
use crate::partials::{EmptyProvider, PartialProvider};
use crate::render::Renderer;
use crate::tag::{self, Node, Tag};
use crate::value::Value;

/// Render configuration.
///
/// Deserializable, so hosts can keep it alongside their own settings:
///
/// ```rust
/// use standout_mustache::Options;
///
/// let options: Options = serde_json::from_str(r#"{"error_on_missing": true}"#).unwrap();
/// assert!(options.error_on_missing);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Fail the render when a variable tag resolves to nothing, instead of
    /// emitting nothing. Sections are unaffected.
    pub error_on_missing: bool,
}

/// A compiled Mustache template.
///
/// # Example
///
/// ```rust
/// use standout_mustache::{Template, Value};
/// use serde_json::json;
///
/// let template = Template::compile("Hello {{name}}!").unwrap();
/// let output = template.render(&[Value::from(json!({"name": "World"}))]).unwrap();
/// assert_eq!(output, "Hello World!");
/// ```
#[derive(Clone)]
pub struct Template {
    nodes: Vec<Node>,
    delimiters: (String, String),
    partials: Arc<dyn PartialProvider>,
    options: Options,
}

impl Template {
    /// Compiles `source` with no partial provider; every partial renders
    /// empty.
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        Self::compile_with_partials(source, Arc::new(EmptyProvider))
    }

    /// Compiles `source`, resolving partials through `partials` at render
    /// time.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use standout_mustache::{StaticProvider, Template, Value};
    ///
    /// let partials = Arc::new(StaticProvider::new().add("user", "<{{name}}>"));
    /// let template = Template::compile_with_partials("{{>user}}", partials).unwrap();
    ///
    /// let data: Value = [("name", "ann")].into_iter().collect();
    /// assert_eq!(template.render(&[data]).unwrap(), "<ann>");
    /// ```
    pub fn compile_with_partials(
        source: &str,
        partials: Arc<dyn PartialProvider>,
    ) -> Result<Self, ParseError> {
        Self::compile_with_options(source, partials, Options::default())
    }

    /// Compiles `source` with explicit options.
    pub fn compile_with_options(
        source: &str,
        partials: Arc<dyn PartialProvider>,
        options: Options,
    ) -> Result<Self, ParseError> {
        let parsed = parser::parse(source)?;
        Ok(Self {
            nodes: parsed.nodes,
            delimiters: parsed.delimiters,
            partials,
            options,
        })
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Makes a variable that resolves to nothing a render error.
    pub fn set_error_on_missing(&mut self, enabled: bool) {
        self.options.error_on_missing = enabled;
    }

    /// Returns the delimiters in effect at the end of the source, after any
    /// `{{=...=}}` changes.
    pub fn delimiters(&self) -> (&str, &str) {
        (&self.delimiters.0, &self.delimiters.1)
    }

    /// Returns the top-level tags. Text is not included.
    pub fn tags(&self) -> Vec<Tag<'_>> {
        tag::extract(&self.nodes)
    }

    /// Renders to a string.
    ///
    /// Nothing is returned on error; the partial output is discarded.
    pub fn render(&self, contexts: &[Value]) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render_to(&mut buf, contexts)?;
        String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }

    /// Renders into `out` as the tree is walked.
    ///
    /// On error, whatever was written before the failure stays written.
    pub fn render_to<W: Write>(&self, out: &mut W, contexts: &[Value]) -> Result<(), RenderError> {
        Renderer::new(self.partials.as_ref(), self.options).render_nodes(&self.nodes, contexts, out)
    }

    /// Renders this template, then renders `layout` with the output
    /// available as `content`.
    ///
    /// `content` is pushed in front of `contexts`, so the layout sees both.
    /// Use `{{{content}}}` in the layout to avoid escaping it twice.
    ///
    /// ```rust
    /// use standout_mustache::{Template, Value};
    ///
    /// let page = Template::compile("<p>{{title}}</p>").unwrap();
    /// let layout = Template::compile("<body>{{{content}}}</body>").unwrap();
    /// let data: Value = [("title", "Hi")].into_iter().collect();
    ///
    /// assert_eq!(page.render_in_layout(&layout, &[data]).unwrap(), "<body><p>Hi</p></body>");
    /// ```
    pub fn render_in_layout(&self, layout: &Template, contexts: &[Value]) -> Result<String, RenderError> {
        layout.render(&self.layout_chain(contexts)?)
    }

    /// Streaming form of [`render_in_layout`](Self::render_in_layout).
    pub fn render_in_layout_to<W: Write>(
        &self,
        out: &mut W,
        layout: &Template,
        contexts: &[Value],
    ) -> Result<(), RenderError> {
        layout.render_to(out, &self.layout_chain(contexts)?)
    }

    fn layout_chain(&self, contexts: &[Value]) -> Result<Vec<Value>, RenderError> {
        let content = self.render(contexts)?;
        let mut chain: Vec<Value> = Vec::with_capacity(contexts.len() + 1);
        chain.push([("content", content)].into_iter().collect());
        chain.extend_from_slice(contexts);
        Ok(chain)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("nodes", &self.nodes)
            .field("delimiters", &self.delimiters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partials::StaticProvider;
    use crate::tag::TagType;
    use serde_json::json;

    fn ctx(data: serde_json::Value) -> Value {
        Value::from(data)
    }

    #[test]
    fn compile_and_render() {
        let template = Template::compile("Hello {{name}}!").unwrap();
        let output = template.render(&[ctx(json!({"name": "World"}))]).unwrap();
        assert_eq!(output, "Hello World!");
    }

    #[test]
    fn contexts_layer_innermost_first() {
        let template = Template::compile("{{a}}-{{b}}").unwrap();
        let output = template
            .render(&[ctx(json!({"a": "inner"})), ctx(json!({"a": "outer", "b": "base"}))])
            .unwrap();
        assert_eq!(output, "inner-base");
    }

    #[test]
    fn render_to_streams() {
        let template = Template::compile("{{#xs}}{{.}}{{/xs}}").unwrap();
        let mut out = Vec::new();
        template
            .render_to(&mut out, &[ctx(json!({"xs": [1, 2, 3]}))])
            .unwrap();
        assert_eq!(out, b"123");
    }

    #[test]
    fn error_on_missing_toggle() {
        let mut template = Template::compile("{{gone}}").unwrap();
        assert_eq!(template.render(&[]).unwrap(), "");

        template.set_error_on_missing(true);
        assert!(template.options().error_on_missing);
        assert!(matches!(
            template.render(&[]),
            Err(RenderError::MissingVariable(_))
        ));
    }

    #[test]
    fn options_apply_to_partials() {
        let partials = Arc::new(StaticProvider::new().add("p", "{{gone}}"));
        let options = Options {
            error_on_missing: true,
        };
        let template = Template::compile_with_options("{{>p}}", partials, options).unwrap();
        assert!(template.render(&[]).is_err());
    }

    #[test]
    fn layout_sees_content_and_contexts() {
        let page = Template::compile("{{title}}").unwrap();
        let layout = Template::compile("[{{{content}}}|{{site}}]").unwrap();
        let data = ctx(json!({"title": "<T>", "site": "S"}));
        assert_eq!(page.render_in_layout(&layout, &[data.clone()]).unwrap(), "[&lt;T&gt;|S]");

        let mut out = Vec::new();
        page.render_in_layout_to(&mut out, &layout, &[data]).unwrap();
        assert_eq!(out, b"[&lt;T&gt;|S]");
    }

    #[test]
    fn layout_error_aborts() {
        let mut page = Template::compile("{{gone}}").unwrap();
        page.set_error_on_missing(true);
        let layout = Template::compile("{{{content}}}").unwrap();
        assert!(page.render_in_layout(&layout, &[]).is_err());
    }

    #[test]
    fn delimiters_after_compile() {
        let template = Template::compile("{{=[ ]=}}[x]").unwrap();
        assert_eq!(template.delimiters(), ("[", "]"));
        assert_eq!(Template::compile("").unwrap().delimiters(), ("{{", "}}"));
    }

    #[test]
    fn tags_introspection() {
        let template = Template::compile("{{a}}{{#s}}{{b}}{{/s}}{{^i}}{{/i}}{{>p}}").unwrap();
        let types: Vec<_> = template.tags().iter().map(|t| t.tag_type()).collect();
        assert_eq!(
            types,
            vec![
                TagType::Variable,
                TagType::Section,
                TagType::InvertedSection,
                TagType::Partial,
            ]
        );
    }

    #[test]
    fn options_default_from_empty_config() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());
        assert!(!options.error_on_missing);
    }

    #[test]
    fn template_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
    }
}
