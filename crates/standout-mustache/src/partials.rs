//! Partial template sources.
//!
//! A `{{>name}}` tag is expanded at render time: the renderer asks the
//! template's [`PartialProvider`] for the source named `name`, indents it to
//! the tag's column, compiles it and renders it in place. Nothing is cached,
//! so a provider whose content changes between renders is picked up on the
//! next render.
//!
//! Two providers ship with the crate:
//!
//! - [`StaticProvider`]: a fixed name-to-source map; unknown names are an
//!   error.
//! - [`EmptyProvider`]: every partial is empty. Templates compiled without a
//!   provider use this one.
//!
//! # Custom Providers
//!
//! ```rust
//! use standout_mustache::{PartialError, PartialProvider};
//!
//! struct Uppercase;
//!
//! impl PartialProvider for Uppercase {
//!     fn get(&self, name: &str) -> Result<String, PartialError> {
//!         Ok(name.to_uppercase())
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::PartialError;

/// Matches every non-empty line.
static NON_EMPTY_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.+)$").unwrap());

/// Resolves partial names to template source.
///
/// Implementations may block (e.g. read from disk); the renderer imposes no
/// timeout and propagates any error unchanged.
pub trait PartialProvider: Send + Sync {
    /// Returns the source of the partial `name`.
    fn get(&self, name: &str) -> Result<String, PartialError>;
}

/// Partials drawn from a fixed map of name to source.
///
/// # Example
///
/// ```rust
/// use standout_mustache::{PartialProvider, StaticProvider};
///
/// let partials = StaticProvider::new().add("greeting", "Hello {{name}}");
///
/// assert_eq!(partials.get("greeting").unwrap(), "Hello {{name}}");
/// assert!(partials.get("missing").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticProvider {
    partials: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partial, builder style.
    pub fn add(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    /// Adds or replaces a partial.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.partials.insert(name.into(), source.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }
}

impl From<HashMap<String, String>> for StaticProvider {
    fn from(partials: HashMap<String, String>) -> Self {
        Self { partials }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            partials: iter
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        }
    }
}

impl PartialProvider for StaticProvider {
    fn get(&self, name: &str) -> Result<String, PartialError> {
        found(self.partials.get(name), name)
    }
}

impl PartialProvider for HashMap<String, String> {
    fn get(&self, name: &str) -> Result<String, PartialError> {
        found(HashMap::get(self, name), name)
    }
}

impl PartialProvider for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Result<String, PartialError> {
        found(BTreeMap::get(self, name), name)
    }
}

fn found(source: Option<&String>, name: &str) -> Result<String, PartialError> {
    source
        .cloned()
        .ok_or_else(|| PartialError::NotFound(name.to_string()))
}

/// A provider under which every partial is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyProvider;

impl PartialProvider for EmptyProvider {
    fn get(&self, _name: &str) -> Result<String, PartialError> {
        Ok(String::new())
    }
}

/// Prefixes every non-empty line of `source` with `indent`.
pub(crate) fn indent_lines<'a>(source: &'a str, indent: &str) -> Cow<'a, str> {
    if indent.is_empty() {
        return Cow::Borrowed(source);
    }
    NON_EMPTY_LINE.replace_all(source, |caps: &Captures<'_>| format!("{}{}", indent, &caps[1]))
}
