//! Redaction of sensitive values before interactions are stored.

use std::borrow::Cow;

use serde_json::Value;
use url::form_urlencoded;

use crate::cassette::format::{Body, CapturedRequest, CapturedResponse, HeaderText};

/// Placeholder written in place of censored values.
pub const DEFAULT_CENSOR_TEXT: &str = "******";

/// A key selector for headers, query parameters or JSON body elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensorElement {
    /// Key to censor.
    pub name: String,
    /// Whether `name` must match with the same case.
    pub case_sensitive: bool,
}

impl CensorElement {
    /// Create a selector for `name`.
    pub fn new(name: impl Into<String>, case_sensitive: bool) -> Self {
        Self { name: name.into(), case_sensitive }
    }

    /// Returns `true` if `key` is selected.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        if self.case_sensitive {
            self.name == key
        } else {
            self.name.eq_ignore_ascii_case(key)
        }
    }
}

fn elements<I, S>(keys: I) -> impl Iterator<Item = CensorElement>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(|key| CensorElement::new(key, false))
}

/// Which fields to redact and what to replace them with.
///
/// Censored values are replaced, never removed, so requests keep their shape
/// for matching. Applying the same censors twice gives the same result as
/// applying them once.
#[derive(Debug, Clone)]
pub struct Censors {
    censor_text: String,
    headers: Vec<CensorElement>,
    query_parameters: Vec<CensorElement>,
    body_elements: Vec<CensorElement>,
    body_pointers: Vec<String>,
}

impl Default for Censors {
    fn default() -> Self {
        Self::new()
    }
}

impl Censors {
    /// Censors that redact nothing, using [`DEFAULT_CENSOR_TEXT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_censor_text(DEFAULT_CENSOR_TEXT)
    }

    /// Censors that redact nothing yet, using `text` as the placeholder.
    pub fn with_censor_text(text: impl Into<String>) -> Self {
        Self {
            censor_text: text.into(),
            headers: Vec::new(),
            query_parameters: Vec::new(),
            body_elements: Vec::new(),
            body_pointers: Vec::new(),
        }
    }

    /// Censor headers by name, ignoring case.
    #[must_use]
    pub fn censor_headers_by_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.censor_headers(elements(keys))
    }

    /// Censor headers selected by `elements`.
    #[must_use]
    pub fn censor_headers(mut self, elements: impl IntoIterator<Item = CensorElement>) -> Self {
        self.headers.extend(elements);
        self
    }

    /// Censor query parameters by name, ignoring case.
    #[must_use]
    pub fn censor_query_parameters_by_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.censor_query_parameters(elements(keys))
    }

    /// Censor query parameters selected by `elements`.
    #[must_use]
    pub fn censor_query_parameters(
        mut self,
        elements: impl IntoIterator<Item = CensorElement>,
    ) -> Self {
        self.query_parameters.extend(elements);
        self
    }

    /// Censor JSON body keys at any depth, ignoring case.
    #[must_use]
    pub fn censor_body_elements_by_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.censor_body_elements(elements(keys))
    }

    /// Censor JSON body keys selected by `elements`, at any depth.
    #[must_use]
    pub fn censor_body_elements(
        mut self,
        elements: impl IntoIterator<Item = CensorElement>,
    ) -> Self {
        self.body_elements.extend(elements);
        self
    }

    /// Censor JSON body values addressed by JSON pointers such as `/data/token`.
    #[must_use]
    pub fn censor_body_paths<I, S>(mut self, pointers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_pointers.extend(pointers.into_iter().map(Into::into));
        self
    }

    /// The placeholder text.
    #[must_use]
    pub fn censor_text(&self) -> &str {
        &self.censor_text
    }

    /// Returns `true` if no selectors are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.query_parameters.is_empty()
            && self.body_elements.is_empty()
            && self.body_pointers.is_empty()
    }

    /// Redact headers, query parameters and body of `request` in place.
    pub fn apply_to_request(&self, request: &mut CapturedRequest) {
        self.censor_header_list(&mut request.headers);
        if let Some(uri) = self.censor_query(&request.uri) {
            request.uri = uri;
        }
        self.censor_body(&mut request.body);
    }

    /// Redact headers and body of `response` in place.
    pub fn apply_to_response(&self, response: &mut CapturedResponse) {
        self.censor_header_list(&mut response.headers);
        self.censor_body(&mut response.body);
    }

    fn censor_header_list(&self, headers: &mut [(String, HeaderText)]) {
        for (name, value) in headers.iter_mut() {
            if self.headers.iter().any(|element| element.matches(name)) {
                *value = HeaderText::Text(self.censor_text.clone());
            }
        }
    }

    /// URI with censored query values replaced, or `None` when nothing changed.
    ///
    /// Works on the raw string, so relative URIs are handled and every byte
    /// outside a censored value is kept as it was.
    fn censor_query(&self, uri: &str) -> Option<String> {
        if self.query_parameters.is_empty() {
            return None;
        }
        let (before_fragment, fragment) = uri.split_at(uri.find('#').unwrap_or(uri.len()));
        let (path, query) = before_fragment.split_once('?')?;
        let placeholder: String =
            form_urlencoded::byte_serialize(self.censor_text.as_bytes()).collect();

        let mut changed = false;
        let segments: Vec<Cow<'_, str>> = query
            .split('&')
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) if value != placeholder && self.censors_query_key(key) => {
                    changed = true;
                    Cow::Owned(format!("{key}={placeholder}"))
                }
                _ => Cow::Borrowed(segment),
            })
            .collect();
        changed.then(|| format!("{path}?{}{fragment}", segments.join("&")))
    }

    fn censors_query_key(&self, raw_key: &str) -> bool {
        let key = form_urlencoded::parse(raw_key.as_bytes())
            .next()
            .map_or(Cow::Borrowed(raw_key), |(key, _)| key);
        self.query_parameters.iter().any(|element| element.matches(&key))
    }

    fn censor_body(&self, body: &mut Body) {
        if self.body_elements.is_empty() && self.body_pointers.is_empty() {
            return;
        }
        let Some(mut json) = body.as_json() else {
            return;
        };
        let before = json.clone();
        self.censor_json_keys(&mut json);
        for pointer in &self.body_pointers {
            if let Some(target) = json.pointer_mut(pointer) {
                *target = Value::String(self.censor_text.clone());
            }
        }
        if json != before {
            *body = Body::Text(json.to_string());
        }
    }

    fn censor_json_keys(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if self.body_elements.iter().any(|element| element.matches(key)) {
                        *child = Value::String(self.censor_text.clone());
                    } else {
                        self.censor_json_keys(child);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|child| self.censor_json_keys(child)),
            _ => {}
        }
    }
}
