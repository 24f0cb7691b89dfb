//! Tree walker that writes a compiled template to an output sink.

use std::io::Write;

use crate::error::RenderError;
use crate::escape::escape_html;
use crate::lookup::lookup;
use crate::parser;
use crate::partials::{indent_lines, PartialProvider};
use crate::tag::Node;
use crate::template::Options;
use crate::value::Value;

/// Renders nodes against a context chain.
///
/// One renderer serves a template and every partial expanded inside it, so
/// partials share the template's provider and options.
pub(crate) struct Renderer<'t> {
    partials: &'t dyn PartialProvider,
    options: Options,
}

impl<'t> Renderer<'t> {
    pub(crate) fn new(partials: &'t dyn PartialProvider, options: Options) -> Self {
        Self { partials, options }
    }

    pub(crate) fn render_nodes(
        &self,
        nodes: &[Node],
        chain: &[Value],
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        for node in nodes {
            self.render_node(node, chain, out)?;
        }
        Ok(())
    }

    fn render_node(&self, node: &Node, chain: &[Value], out: &mut dyn Write) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => out.write_all(text.as_bytes())?,
            Node::Variable { name, escape } => {
                let value = match lookup(chain, name, self.options.error_on_missing)? {
                    None | Some(Value::Null) => return Ok(()),
                    Some(value) => value,
                };
                let text = value.to_string();
                if *escape {
                    out.write_all(escape_html(&text).as_bytes())?;
                } else {
                    out.write_all(text.as_bytes())?;
                }
            }
            Node::Section {
                name,
                inverted,
                children,
                ..
            } => self.render_section(name, *inverted, children, chain, out)?,
            Node::Partial { name, indent } => self.render_partial(name, indent, chain, out)?,
        }
        Ok(())
    }

    fn render_section(
        &self,
        name: &str,
        inverted: bool,
        children: &[Node],
        chain: &[Value],
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let value = lookup(chain, name, false)?;
        let empty = value.as_ref().map_or(true, Value::is_empty);
        if empty != inverted {
            return Ok(());
        }
        if inverted {
            return self.render_nodes(children, chain, out);
        }

        match value {
            Some(Value::List(items)) => {
                tracing::trace!(section = name, items = items.len(), "iterating section");
                let mut scoped = Vec::with_capacity(chain.len() + 1);
                scoped.push(Value::Null);
                scoped.extend_from_slice(chain);
                for item in items.iter() {
                    scoped[0] = item.clone();
                    self.render_nodes(children, &scoped, out)?;
                }
                Ok(())
            }
            Some(scope @ (Value::Map(_) | Value::Object(_))) => {
                let mut scoped = Vec::with_capacity(chain.len() + 1);
                scoped.push(scope);
                scoped.extend_from_slice(chain);
                self.render_nodes(children, &scoped, out)
            }
            _ => self.render_nodes(children, chain, out),
        }
    }

    fn render_partial(
        &self,
        name: &str,
        indent: &str,
        chain: &[Value],
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        tracing::trace!(partial = name, "expanding partial");
        let source = self.partials.get(name)?;
        let source = indent_lines(&source, indent);
        let parsed = parser::parse(&source).map_err(|source| RenderError::PartialSyntax {
            name: name.to_string(),
            source,
        })?;
        self.render_nodes(&parsed.nodes, chain, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partials::{EmptyProvider, StaticProvider};
    use serde_json::json;

    fn render_with(source: &str, provider: &dyn PartialProvider, data: serde_json::Value) -> String {
        let parsed = parser::parse(source).unwrap();
        let mut out = Vec::new();
        Renderer::new(provider, Options::default())
            .render_nodes(&parsed.nodes, &[Value::from(data)], &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn render(source: &str, data: serde_json::Value) -> String {
        render_with(source, &EmptyProvider, data)
    }

    #[test]
    fn text_and_variables() {
        assert_eq!(render("Hi {{name}}!", json!({"name": "Bo"})), "Hi Bo!");
        assert_eq!(render("[{{missing}}]", json!({})), "[]");
        assert_eq!(render("[{{nothing}}]", json!({"nothing": null})), "[]");
    }

    #[test]
    fn escaping() {
        let data = json!({"v": "<b>"});
        assert_eq!(render("{{v}}", data.clone()), "&lt;b&gt;");
        assert_eq!(render("{{{v}}}", data.clone()), "<b>");
        assert_eq!(render("{{&v}}", data), "<b>");
    }

    #[test]
    fn section_over_list_pushes_each_item() {
        let data = json!({"items": [{"n": 1}, {"n": 2}], "n": 0});
        assert_eq!(render("{{#items}}{{n}},{{/items}}", data), "1,2,");
    }

    #[test]
    fn section_over_map_pushes_scope() {
        let data = json!({"user": {"name": "Ann"}, "site": "x"});
        assert_eq!(render("{{#user}}{{name}}@{{site}}{{/user}}", data), "Ann@x");
    }

    #[test]
    fn truthy_scalar_keeps_chain() {
        let data = json!({"flag": "yes", "name": "Ann"});
        assert_eq!(render("{{#flag}}{{name}}{{/flag}}", data), "Ann");
    }

    #[test]
    fn falsy_values_skip_section() {
        for value in [json!(false), json!(0), json!(""), json!("  "), json!([]), json!(null)] {
            let data = json!({"v": value});
            assert_eq!(render("{{#v}}shown{{/v}}", data.clone()), "");
            assert_eq!(render("{{^v}}shown{{/v}}", data), "shown");
        }
    }

    #[test]
    fn inverted_section_on_missing_name() {
        assert_eq!(render("{{^nope}}none{{/nope}}", json!({})), "none");
    }

    #[test]
    fn partial_renders_against_enclosing_chain() {
        let partials = StaticProvider::new().add("item", "<{{.}}>");
        let out = render_with(
            "{{#items}}{{>item}}{{/items}}",
            &partials,
            json!({"items": ["a", "b"]}),
        );
        assert_eq!(out, "<a><b>");
    }

    #[test]
    fn partial_errors_propagate() {
        let parsed = parser::parse("{{>missing}}").unwrap();
        let partials = StaticProvider::new();
        let mut out = Vec::new();
        let err = Renderer::new(&partials, Options::default())
            .render_nodes(&parsed.nodes, &[], &mut out)
            .unwrap_err();
        assert!(matches!(err, RenderError::Partial(_)));
    }

    #[test]
    fn partial_syntax_error_names_partial() {
        let parsed = parser::parse("{{>bad}}").unwrap();
        let partials = StaticProvider::new().add("bad", "{{#open}}");
        let mut out = Vec::new();
        let err = Renderer::new(&partials, Options::default())
            .render_nodes(&parsed.nodes, &[], &mut out)
            .unwrap_err();
        assert!(matches!(err, RenderError::PartialSyntax { name, .. } if name == "bad"));
    }

    #[test]
    fn required_variables_error() {
        let parsed = parser::parse("{{gone}}").unwrap();
        let mut out = Vec::new();
        let options = Options {
            error_on_missing: true,
        };
        let err = Renderer::new(&EmptyProvider, options)
            .render_nodes(&parsed.nodes, &[Value::from(json!({}))], &mut out)
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingVariable(name) if name == "gone"));
    }
}
