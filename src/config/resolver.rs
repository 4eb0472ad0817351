//! Config placeholder resolution.
//!
//! `${key}` is replaced by the property value, `${key:default}` falls back to
//! `default` when the key is unknown. Unknown keys without a default are left
//! verbatim. Substituted values are not scanned again.

use std::collections::BTreeMap;

/// Substitutes config placeholders in route text.
pub trait PlaceholderResolver: Send + Sync {
    fn resolve(&self, text: &str) -> String;
}

impl<F> PlaceholderResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, text: &str) -> String {
        self(text)
    }
}

/// Resolves from a property table, then from the process environment.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    properties: BTreeMap<String, String>,
    use_env: bool,
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl PropertyResolver {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            use_env: true,
        }
    }

    /// Ignore the process environment.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.properties.get(key) {
            return Some(value.clone());
        }
        if self.use_env {
            return std::env::var(key).ok();
        }
        None
    }
}

impl PlaceholderResolver for PropertyResolver {
    fn resolve(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            out.push_str(&rest[..start]);
            let expr = &rest[start + 2..start + 2 + len];
            let (key, default) = match expr.split_once(':') {
                Some((key, default)) => (key, Some(default)),
                None => (expr, None),
            };
            match self.lookup(key).or_else(|| default.map(str::to_string)) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 3 + len]),
            }
            rest = &rest[start + 3 + len..];
        }
        out.push_str(rest);
        out
    }
}
