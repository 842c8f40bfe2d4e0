use serde_json::{Map, Value};

/// Payload handed to [`FetchClient::request`](crate::FetchClient::request).
///
/// For `GET` endpoints the payload becomes the query string. For every other
/// method it becomes the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestData {
    /// Nothing to send.
    #[default]
    Empty,
    /// Named parameters. Encoded as query pairs for `GET`, and as a JSON
    /// object body otherwise.
    Params(Map<String, Value>),
    /// A pre-serialized payload, used exactly as given: the raw query string
    /// for `GET`, the raw body otherwise.
    Raw(String),
}

impl RequestData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Params(map) => map.is_empty(),
            Self::Raw(raw) => raw.is_empty(),
        }
    }

    /// Query pairs for a `GET` request, with every value coerced to a
    /// string.
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            Self::Params(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), coerce_to_string(value)))
                .collect(),
            Self::Empty | Self::Raw(_) => Vec::new(),
        }
    }
}

/// String form of a parameter value when it's sent as a query pair.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

impl From<Map<String, Value>> for RequestData {
    fn from(value: Map<String, Value>) -> Self {
        Self::Params(value)
    }
}

impl From<Value> for RequestData {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Object(map) => Self::Params(map),
            Value::String(raw) => Self::Raw(raw),
            other => Self::Raw(coerce_to_string(&other)),
        }
    }
}

impl From<String> for RequestData {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<&str> for RequestData {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

impl From<()> for RequestData {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl<K, V> FromIterator<(K, V)> for RequestData
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
