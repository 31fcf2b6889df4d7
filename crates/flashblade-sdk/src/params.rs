//! Query parameters for API requests.

use std::collections::BTreeMap;
use std::fmt;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A scalar value.
    Single(String),
    /// A list value, sent comma-separated.
    List(Vec<String>),
}

impl ParamValue {
    /// Returns the list entries, or a one-element slice for scalars.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::List(values) => f.write_str(&values.join(",")),
        }
    }
}

/// Named query parameters of one request.
///
/// This is the mutable argument set that the reference resolver rewrites and
/// that the item iterator re-sends with a new continuation token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a scalar parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.inner
            .insert(name.into(), ParamValue::Single(value.to_string()));
    }

    /// Sets a list parameter, replacing any previous value.
    pub fn insert_list<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.insert(
            name.into(),
            ParamValue::List(values.into_iter().map(Into::into).collect()),
        );
    }

    /// Sets a scalar parameter if a value is present.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Sets a list parameter if the list is non-empty.
    pub fn insert_list_nonempty(&mut self, name: impl Into<String>, values: &[String]) {
        if !values.is_empty() {
            self.insert_list(name, values.iter().cloned());
        }
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.inner.remove(name)
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner.get(name)
    }

    /// Returns true if the parameter is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns true if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the parameters as `(name, value)` pairs for a query string.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.inner
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// Renders the parameters as an encoded query string (without `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.inner
            .iter()
            .map(|(k, v)| format!("{k}={}", ::urlencoding::encode(&v.to_string())))
            .collect::<Vec<_>>()
            .join("&")
    }
}
