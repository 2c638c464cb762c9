//! Index name resolution.
//!
//! An operation either names its index explicitly through its state options,
//! or the index is derived from the resource short name by an [`Inflector`]
//! (`BlogPost` → `blog_posts`).

use std::sync::Arc;

use heck::ToSnakeCase;

use crate::operation::Operation;

/// Turns a resource type name into a storage/collection name.
pub trait Inflector: Send + Sync {
    /// Returns the pluralized snake_case form of `name`.
    fn tableize(&self, name: &str) -> String;
}

/// English inflector used when none is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInflector;

/// Words with no distinct plural form.
const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "media",
    "metadata",
    "money",
    "news",
    "series",
    "sheep",
    "species",
    "staff",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

impl DefaultInflector {
    /// Pluralizes a single lowercase English word.
    pub fn pluralize(word: &str) -> String {
        if word.is_empty() || UNCOUNTABLE.contains(&word) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
            return (*plural).to_string();
        }

        if let Some(stem) = word.strip_suffix('y') {
            if stem.ends_with(|c: char| !"aeiou".contains(c)) {
                return format!("{stem}ies");
            }
        }
        if let Some(stem) = word.strip_suffix("fe") {
            if !stem.is_empty() && !stem.ends_with('f') {
                return format!("{stem}ves");
            }
        }
        if let Some(stem) = word.strip_suffix('f') {
            if stem.ends_with(['l', 'r']) {
                return format!("{stem}ves");
            }
        }
        if ["s", "x", "z", "ch", "sh"]
            .iter()
            .any(|suffix| word.ends_with(suffix))
        {
            return format!("{word}es");
        }

        format!("{word}s")
    }
}

impl Inflector for DefaultInflector {
    fn tableize(&self, name: &str) -> String {
        let snake = name.to_snake_case();
        match snake.rsplit_once('_') {
            Some((head, last)) => format!("{}_{}", head, Self::pluralize(last)),
            None => Self::pluralize(&snake),
        }
    }
}

/// Resolves the index an operation searches.
#[derive(Clone)]
pub struct IndexResolver {
    inflector: Arc<dyn Inflector>,
}

impl IndexResolver {
    /// Creates a resolver delegating derived names to `inflector`.
    pub fn new(inflector: Arc<dyn Inflector>) -> Self {
        Self { inflector }
    }

    /// Returns the explicit index of the operation, or the tableized short name.
    pub fn resolve(&self, operation: &Operation) -> String {
        match operation.explicit_index() {
            Some(index) => index.to_string(),
            None => self.inflector.tableize(operation.short_name()),
        }
    }
}

impl Default for IndexResolver {
    fn default() -> Self {
        Self::new(Arc::new(DefaultInflector))
    }
}

impl std::fmt::Debug for IndexResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexResolver").finish_non_exhaustive()
    }
}
