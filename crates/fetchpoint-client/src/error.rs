use miette::{Diagnostic, NamedSource, SourceOffset};
use reqwest::StatusCode;
use thiserror::Error;

/// Error type returned by all [`FetchClient`](crate::FetchClient) calls.
#[derive(Debug, Error, Diagnostic)]
pub enum FetchClientError {
    /// The requested endpoint name is not in the endpoint table.
    #[error("Unknown endpoint `{0}`.")]
    #[diagnostic(
        code(fetchpoint_client::unknown_endpoint),
        url(docsrs),
        help("Check the `endpoints` table in your configuration. `fp endpoints` lists every known name.")
    )]
    UnknownEndpoint(String),

    /// An endpoint was registered with an empty name.
    #[error("Endpoint names must not be empty.")]
    #[diagnostic(code(fetchpoint_client::empty_endpoint_name), url(docsrs))]
    EmptyEndpointName,

    /// The base URL joined with an endpoint's path did not form a valid URL.
    #[error("Endpoint `{name}` resolves to an invalid URL: `{url}`")]
    #[diagnostic(code(fetchpoint_client::invalid_endpoint_url), url(docsrs))]
    InvalidEndpointUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No base URL was given to the client builder.
    #[error("No base URL was configured.")]
    #[diagnostic(
        code(fetchpoint_client::missing_base_url),
        url(docsrs),
        help("Set `base_url` in your configuration, or pass `--base-url`.")
    )]
    MissingBaseUrl,

    /// Only `http` and `https` base URLs can be requested.
    #[error("Unsupported URL scheme `{0}`. Base URLs must use http or https.")]
    #[diagnostic(code(fetchpoint_client::unsupported_scheme), url(docsrs))]
    UnsupportedScheme(String),

    #[error(transparent)]
    #[diagnostic(code(fetchpoint_client::url_parse_error), url(docsrs))]
    UrlParseError(#[from] url::ParseError),

    /// The server answered with a status outside the 200-299 range.
    #[error("{code}: {status_text}", code = .status.as_u16())]
    #[diagnostic(code(fetchpoint_client::http_error), url(docsrs))]
    HttpError {
        status: StatusCode,
        status_text: String,
    },

    /// The response body was not the JSON the caller asked for.
    #[error("{source}")]
    #[diagnostic(code(fetchpoint_client::bad_json), url(docsrs))]
    BadJson {
        source: serde_json::Error,
        url: String,
        #[source_code]
        json: NamedSource,
        #[label("{source}")]
        err_loc: (usize, usize),
    },

    /// Failed to build the underlying HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(code(fetchpoint_client::client_build_error), url(docsrs))]
    ClientBuildError(#[source] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(fetchpoint_client::request_error), url(docsrs))]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(fetchpoint_client::middleware_error), url(docsrs))]
    MiddlewareError(anyhow::Error),
}

impl FetchClientError {
    pub(crate) fn from_status(status: StatusCode, status_text: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            status_text: status_text.into(),
        }
    }

    /// Wraps a JSON parse failure along with the neighbourhood of the
    /// failing byte, so the report doesn't dump an entire response body.
    pub fn from_json_err(err: serde_json::Error, url: String, json: String) -> Self {
        let err_offset = SourceOffset::from_location(&json, err.line(), err.column()).offset();
        let err_offset = floor_char_boundary(&json, err_offset.min(json.len()));
        let start = floor_char_boundary(&json, err_offset.saturating_sub(40));
        let end = ceil_char_boundary(&json, (err_offset + 40).min(json.len()));
        let snipped_json = json[start..end].to_string();
        Self::BadJson {
            source: err,
            url: url.clone(),
            json: NamedSource::new(url, snipped_json),
            err_loc: (err_offset - start, 0),
        }
    }
}

impl From<reqwest_middleware::Error> for FetchClientError {
    fn from(value: reqwest_middleware::Error) -> Self {
        match value {
            reqwest_middleware::Error::Middleware(err) => Self::MiddlewareError(err),
            reqwest_middleware::Error::Reqwest(err) => Self::RequestError(err),
        }
    }
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
