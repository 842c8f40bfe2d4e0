//! Named-endpoint JSON client.
//!
//! A [`FetchClient`] holds a base URL and a table of named [`Endpoint`]s.
//! [`FetchClient::request`] sends a call to one of them, and
//! [`FetchClient::fetch_json`] does the same but also checks the status and
//! parses the body.

mod api;
mod client;
mod data;
mod endpoint;
mod error;
mod log_middleware;

pub use client::{FetchClient, FetchClientBuilder};
pub use data::{coerce_to_string, RequestData};
pub use endpoint::{validate_endpoints, Endpoint, EndpointTable};
pub use error::FetchClientError;
pub use reqwest::{Method, Response, StatusCode};
