//! Query-string support: the [`Query`] trait and the [`QueryParams`] builder.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use url::Url;

/// Anything that can be serialized into URL query parameters.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Drops any existing query string before appending this query's parameters.
    fn replace_in_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.set_query(None);
        self.add_to_url(&url)
    }
}

/// Ordered list of query parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one parameter.
    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends the parameter only when a value is present.
    pub fn with_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Appends the key once per value, e.g. `id=1&id=2`.
    pub fn with_all<V: Display>(mut self, key: &str, values: impl IntoIterator<Item = V>) -> Self {
        for value in values {
            self = self.with(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl Query for QueryParams {
    fn add_to_url(&self, url: &Url) -> Url {
        append_pairs(url, self.pairs.iter().map(|(k, v)| (k, v)))
    }
}

impl<K: AsRef<str>, V: Display> Query for [(K, V)] {
    fn add_to_url(&self, url: &Url) -> Url {
        append_pairs(url, self.iter().map(|(k, v)| (k, v)))
    }
}

impl<K: AsRef<str>, V: Display, const N: usize> Query for [(K, V); N] {
    fn add_to_url(&self, url: &Url) -> Url {
        self.as_slice().add_to_url(url)
    }
}

impl<K: AsRef<str>, V: Display> Query for Vec<(K, V)> {
    fn add_to_url(&self, url: &Url) -> Url {
        self.as_slice().add_to_url(url)
    }
}

impl<K: AsRef<str>, V: Display> Query for BTreeMap<K, V> {
    fn add_to_url(&self, url: &Url) -> Url {
        append_pairs(url, self.iter())
    }
}

/// Parameters are appended in the map's iteration order.
impl<K: AsRef<str>, V: Display, S> Query for HashMap<K, V, S> {
    fn add_to_url(&self, url: &Url) -> Url {
        append_pairs(url, self.iter())
    }
}

impl<T: Query + ?Sized> Query for &T {
    fn add_to_url(&self, url: &Url) -> Url {
        (**self).add_to_url(url)
    }
}

fn append_pairs<K, V>(url: &Url, pairs: impl IntoIterator<Item = (K, V)>) -> Url
where
    K: AsRef<str>,
    V: Display,
{
    let mut url = url.clone();
    let mut iter = pairs.into_iter().peekable();
    if iter.peek().is_none() {
        return url;
    }
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in iter {
            query.append_pair(key.as_ref(), &value.to_string());
        }
    }
    url
}
