use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use crate::endpoint::{validate_endpoints, Endpoint, EndpointTable};
use crate::log_middleware::LogMiddleware;
use crate::FetchClientError;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("fetchpoint/", env!("CARGO_PKG_VERSION"));

/// Builds a [`FetchClient`] from an explicit base URL and endpoint table.
#[derive(Clone, Debug)]
pub struct FetchClientBuilder {
    base_url: Option<Url>,
    endpoints: EndpointTable,
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoints: EndpointTable::new(),
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout: None,
        }
    }
}

impl FetchClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Replaces the whole endpoint table.
    pub fn endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Adds (or replaces) a single endpoint.
    pub fn endpoint(mut self, name: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the endpoint table against the base URL and builds the
    /// client.
    pub fn build(self) -> Result<FetchClient, FetchClientError> {
        let base_url = self.base_url.ok_or(FetchClientError::MissingBaseUrl)?;
        validate_endpoints(&self.endpoints, &base_url)?;

        let mut client_builder = ClientBuilder::new().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder
            .build()
            .map_err(FetchClientError::ClientBuildError)?;
        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(LogMiddleware)
            .build();

        tracing::debug!(
            "fetch client ready: {base_url} ({} endpoints)",
            self.endpoints.len()
        );
        Ok(FetchClient {
            base_url: Arc::new(base_url),
            endpoints: Arc::new(self.endpoints),
            client,
        })
    }
}

/// Client for a fixed set of named endpoints under one base URL.
///
/// Cloning is cheap, and nothing is mutated after construction, so a single
/// instance can be shared by any number of concurrent calls.
#[derive(Clone, Debug)]
pub struct FetchClient {
    pub(crate) base_url: Arc<Url>,
    pub(crate) endpoints: Arc<EndpointTable>,
    pub(crate) client: ClientWithMiddleware,
}

impl FetchClient {
    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::new()
    }

    pub fn new(base_url: Url, endpoints: EndpointTable) -> Result<Self, FetchClientError> {
        Self::builder()
            .base_url(base_url)
            .endpoints(endpoints)
            .build()
    }

    /// Same endpoints and HTTP client, different base URL.
    pub fn with_base_url(&self, base_url: Url) -> Result<Self, FetchClientError> {
        validate_endpoints(&self.endpoints, &base_url)?;
        Ok(Self {
            base_url: Arc::new(base_url),
            endpoints: self.endpoints.clone(),
            client: self.client.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn endpoint(&self, name: &str) -> Result<&Endpoint, FetchClientError> {
        self.endpoints
            .get(name)
            .ok_or_else(|| FetchClientError::UnknownEndpoint(name.to_string()))
    }
}
