//! Match rules deciding whether a live request corresponds to a stored one.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::cassette::format::{Body, CapturedRequest, HeaderText};

type Comparator = Arc<dyn Fn(&CapturedRequest, &CapturedRequest) -> bool + Send + Sync>;

#[derive(Clone)]
struct Rule {
    name: String,
    compare: Comparator,
}

/// An ordered set of comparators; a request matches only if every one agrees.
///
/// [`MatchRules::new`] starts empty and matches everything. The
/// [`Default`] set compares the method and the full URL.
#[derive(Clone)]
pub struct MatchRules {
    rules: Vec<Rule>,
}

impl MatchRules {
    /// An empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Require the same HTTP method, ignoring case.
    #[must_use]
    pub fn by_method(self) -> Self {
        self.push("method", |received, stored| received.method.eq_ignore_ascii_case(&stored.method))
    }

    /// Require the exact same URI, query string included.
    #[must_use]
    pub fn by_full_url(self) -> Self {
        self.push("full_url", |received, stored| received.uri == stored.uri)
    }

    /// Require the same scheme, host, port and path; the query string is ignored.
    #[must_use]
    pub fn by_base_url(self) -> Self {
        self.push("base_url", |received, stored| base_url(&received.uri) == base_url(&stored.uri))
    }

    /// Require identical values for the header `name`.
    #[must_use]
    pub fn by_header(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let label = format!("header:{name}");
        self.push(label, move |received, stored| {
            received.header_values(&name).eq(stored.header_values(&name))
        })
    }

    /// Require the same set of headers, regardless of order.
    #[must_use]
    pub fn by_headers(self) -> Self {
        self.push("headers", |received, stored| {
            sorted_headers(received) == sorted_headers(stored)
        })
    }

    /// Require equivalent bodies.
    ///
    /// JSON bodies are compared structurally with every key in `ignored_keys`
    /// removed at any depth; other bodies must be byte-identical.
    #[must_use]
    pub fn by_body<I, S>(self, ignored_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ignored: Vec<String> = ignored_keys.into_iter().map(Into::into).collect();
        self.push("body", move |received, stored| {
            bodies_match(&received.body, &stored.body, &ignored)
        })
    }

    /// Add an arbitrary comparator, called as `rule(received, stored)`.
    #[must_use]
    pub fn by_custom_rule<F>(self, rule: F) -> Self
    where
        F: Fn(&CapturedRequest, &CapturedRequest) -> bool + Send + Sync + 'static,
    {
        self.push("custom", rule)
    }

    /// Returns `true` if `received` matches `stored` under every rule.
    ///
    /// Rules run in the order they were added and stop at the first failure.
    #[must_use]
    pub fn matches(&self, received: &CapturedRequest, stored: &CapturedRequest) -> bool {
        self.rules.iter().all(|rule| (rule.compare)(received, stored))
    }

    /// Index of the first of `candidates` matching `received`.
    pub fn position<'a, I>(&self, received: &CapturedRequest, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a CapturedRequest>,
    {
        candidates.into_iter().position(|stored| self.matches(received, stored))
    }

    /// Number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn push<F>(mut self, name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&CapturedRequest, &CapturedRequest) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule { name: name.into(), compare: Arc::new(compare) });
        self
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::new().by_method().by_full_url()
    }
}

impl fmt::Debug for MatchRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter().map(|rule| &rule.name)).finish()
    }
}

fn base_url(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) => format!(
            "{}://{}:{}{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or_default(),
            url.path()
        ),
        Err(_) => uri.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}

fn sorted_headers(request: &CapturedRequest) -> Vec<(String, &HeaderText)> {
    let mut headers: Vec<(String, &HeaderText)> =
        request.headers.iter().map(|(k, v)| (k.to_ascii_lowercase(), v)).collect();
    headers.sort_unstable();
    headers
}

fn bodies_match(received: &Body, stored: &Body, ignored: &[String]) -> bool {
    match (received.as_json(), stored.as_json()) {
        (Some(mut left), Some(mut right)) => {
            strip_keys(&mut left, ignored);
            strip_keys(&mut right, ignored);
            left == right
        }
        _ => received.as_bytes() == stored.as_bytes(),
    }
}

fn strip_keys(value: &mut Value, ignored: &[String]) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !ignored.iter().any(|ignored| ignored == key));
            map.values_mut().for_each(|child| strip_keys(child, ignored));
        }
        Value::Array(items) => items.iter_mut().for_each(|child| strip_keys(child, ignored)),
        _ => {}
    }
}
