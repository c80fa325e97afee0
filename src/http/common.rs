use bytes::Bytes;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout applied by the reqwest transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-resource timeout applied by the reqwest transport.
///
/// reqwest has no notion of a resource timeout, so this bounds connection
/// establishment instead.
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(30);

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Content type attached to every non-multipart request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP verbs supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A fully qualified request, ready to hand to a [`Transport`](crate::Transport).
///
/// Headers are kept as an ordered list rather than a map: the same name may
/// appear more than once and every value is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Returns every value sent for `name`, compared case-insensitively, in
    /// the order they were added.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// Ordered query parameters.
///
/// Values are stringified with [`Display`](fmt::Display) when added, so any
/// scalar (numbers, booleans, strings) can be used.
///
/// # Example
///
/// ```
/// use courier::Query;
///
/// let query = Query::new().param("q", "rust lang").param("page", 2);
/// assert_eq!(query.to_query_string().as_deref(), Some("q=rust+lang&page=2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Appends a parameter, builder style.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.params.push((key.into(), value.to_string()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the parameters as `k=v` pairs joined with `&`.
    ///
    /// Spaces in values become `+`. Nothing else is escaped: keys and values
    /// containing `&`, `=` or other reserved characters are sent verbatim.
    /// Returns `None` when there are no parameters.
    #[must_use]
    pub fn to_query_string(&self) -> Option<String> {
        if self.params.is_empty() {
            return None;
        }

        let pairs: Vec<String> = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={}", value.replace(' ', "+")))
            .collect();

        Some(pairs.join("&"))
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.push(key, value);
        }
        query
    }
}

/// Appends the serialized query to `path` after a single `?`.
///
/// An empty query leaves the path untouched.
#[must_use]
pub fn pathify_query(path: &str, query: &Query) -> String {
    match query.to_query_string() {
        Some(query_string) => format!("{path}?{query_string}"),
        None => path.to_string(),
    }
}

/// Joins the base URL and a relative path.
///
/// # Panics
///
/// Panics if the concatenation is not a valid URL. A path that cannot be
/// addressed is a programming error, not something a caller can recover from.
#[must_use]
pub fn construct_url(base_url: &str, path: &str) -> Url {
    let raw = format!("{base_url}{path}");
    match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => panic!("cannot build request URL from {raw:?}: {e}"),
    }
}
