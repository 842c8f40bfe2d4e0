use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::FetchClientError;

/// Named endpoint table. Loaded once at startup and never mutated after the
/// client is built.
pub type EndpointTable = BTreeMap<String, Endpoint>;

/// A single server operation: the verb to use and the path appended to the
/// base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(
        serialize_with = "serialize_method",
        deserialize_with = "deserialize_method"
    )]
    pub method: Method,
    pub uri: String,
}

impl Endpoint {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// `base_url` and `uri` concatenated, without doubling the `/` between
    /// them.
    pub fn url_string(&self, base_url: &Url) -> String {
        let base = base_url.as_str();
        if base.ends_with('/') && self.uri.starts_with('/') {
            format!("{}{}", &base[..base.len() - 1], self.uri)
        } else {
            format!("{base}{}", self.uri)
        }
    }

    pub(crate) fn url(&self, name: &str, base_url: &Url) -> Result<Url, FetchClientError> {
        let url = self.url_string(base_url);
        Url::parse(&url).map_err(|source| FetchClientError::InvalidEndpointUrl {
            name: name.to_string(),
            url,
            source,
        })
    }
}

/// Checks every entry in `table` against `base_url`, so that a bad
/// configuration fails at startup rather than on first use.
pub fn validate_endpoints(table: &EndpointTable, base_url: &Url) -> Result<(), FetchClientError> {
    match base_url.scheme() {
        "http" | "https" => {}
        other => return Err(FetchClientError::UnsupportedScheme(other.to_string())),
    }
    for (name, endpoint) in table {
        if name.is_empty() {
            return Err(FetchClientError::EmptyEndpointName);
        }
        endpoint.url(name, base_url)?;
    }
    Ok(())
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
    struct MethodVisitor;

    impl<'de> Visitor<'de> for MethodVisitor {
        type Value = Method;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an HTTP method such as GET or POST")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Method, E> {
            Method::from_bytes(v.to_ascii_uppercase().as_bytes())
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_str(MethodVisitor)
}
