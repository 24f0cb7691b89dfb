//! Name resolution against a context chain.
//!
//! A chain is a slice of [`Value`]s, innermost first. A plain name is
//! resolved by walking the chain; at each context a zero-argument method
//! wins over a field or key. The first context that *has* the name ends the
//! search, even if the value it holds is null. Dotted names resolve one
//! segment at a time, each segment searching only inside the previous
//! result.

use crate::error::RenderError;
use crate::value::Value;

/// Resolves `name` against `chain`.
///
/// Returns `Ok(None)` when nothing has the name, or
/// [`RenderError::MissingVariable`] instead when `require` is set.
pub(crate) fn lookup(chain: &[Value], name: &str, require: bool) -> Result<Option<Value>, RenderError> {
    if name != "." {
        if let Some((head, tail)) = name.split_once('.') {
            let scope: Vec<Value> = lookup(chain, head, require)?.into_iter().collect();
            return lookup(&scope, tail, require);
        }
    }

    if let Some(found) = chain.iter().find_map(|context| resolve_in(context, name)) {
        return Ok(Some(found));
    }

    if require {
        tracing::debug!(variable = name, "variable not found in context chain");
        return Err(RenderError::MissingVariable(name.to_string()));
    }
    Ok(None)
}

/// Resolves `name` inside a single context.
fn resolve_in(context: &Value, name: &str) -> Option<Value> {
    if let Value::Object(object) = context {
        if let Some(result) = object.call(name) {
            return Some(result);
        }
    }

    if name == "." {
        return Some(context.clone());
    }

    match context {
        Value::Object(object) => object.field(name),
        Value::Map(map) => map.get(name).cloned(),
        _ => None,
    }
}
