use async_trait::async_trait;
use fetchpoint_client::{FetchClient, FetchClientBuilder};
use miette::Result;
use url::Url;

pub mod call;
pub mod endpoints;

#[async_trait]
pub trait FetchpointCommand {
    async fn execute(self) -> Result<()>;
}

/// Finishes a config-derived builder, letting `--base-url` win over the
/// configured one.
pub(crate) fn build_client(
    builder: Option<FetchClientBuilder>,
    base_url: Option<Url>,
) -> Result<FetchClient> {
    let mut builder = builder.unwrap_or_default();
    if let Some(base_url) = base_url {
        builder = builder.base_url(base_url);
    }
    Ok(builder.build()?)
}
