//! Invocation-argument parsing.
//!
//! Arguments are a flat map from name to value or boolean flag, parsed from
//! CLI-style tokens (`--env staging`, `--root=app`, `--verbose`). Entries
//! keep their declaration order: the environment resolver's
//! flag-as-selector step picks the *first* argument whose name matches a
//! configuration key, so the ordering is part of the contract.

use serde_yaml::{Mapping, Value};

/// One parsed argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// A bare `--flag`.
    Flag,
    /// A `--name value` or `--name=value` pair.
    Value(String),
}

/// An ordered set of invocation arguments.
#[derive(Debug, Clone, Default)]
pub struct ArgSet {
    entries: Vec<(String, ArgValue)>,
}

impl ArgSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the current process arguments, skipping the program name.
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse CLI-style tokens.
    ///
    /// `--name value` and `--name=value` produce [`ArgValue::Value`]; a
    /// dashed token not followed by a plain token is an [`ArgValue::Flag`].
    /// Plain tokens that are not consumed as values (positionals) are
    /// ignored. A repeated name keeps its first position and takes the last
    /// value.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = ArgSet::default();
        let mut tokens = tokens.into_iter().map(Into::into).peekable();
        while let Some(token) = tokens.next() {
            let Some(name) = token.strip_prefix("--").or_else(|| token.strip_prefix('-')) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            if let Some((key, value)) = name.split_once('=') {
                set.insert(key, ArgValue::Value(value.to_string()));
            } else if tokens.peek().is_some_and(|next| !next.starts_with('-')) {
                let value = tokens.next().unwrap_or_default();
                set.insert(name, ArgValue::Value(value));
            } else {
                set.insert(name, ArgValue::Flag);
            }
        }
        set
    }

    fn insert(&mut self, name: &str, value: ArgValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Add a `--name value` pair, builder style.
    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.insert(name, ArgValue::Value(value.to_string()));
        self
    }

    /// Add a bare `--flag`, builder style.
    pub fn with_flag(mut self, name: &str) -> Self {
        self.insert(name, ArgValue::Flag);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The value of `--name value`, if present and non-empty.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Value(v) if !v.is_empty() => Some(v),
            _ => None,
        }
    }

    /// Argument names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The argument set as a tree, for metadata injection.
    pub fn to_tree(&self) -> Value {
        let mut map = Mapping::new();
        for (name, value) in &self.entries {
            let value = match value {
                ArgValue::Flag => Value::Bool(true),
                ArgValue::Value(v) => Value::String(v.clone()),
            };
            map.insert(Value::String(name.clone()), value);
        }
        Value::Mapping(map)
    }
}
