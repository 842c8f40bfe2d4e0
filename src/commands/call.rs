use std::time::Instant;

use async_trait::async_trait;
use clap::Args;
use fetchpoint_client::{FetchClientBuilder, RequestData};
use fetchpoint_config::{ArgMatches, FetchpointConfig, FetchpointConfigExt, FetchpointConfigLayer};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde_json::Value;
use url::Url;

use crate::commands::{build_client, FetchpointCommand};
use crate::error::FetchpointError;

/// Call a named endpoint and print the JSON it returns.
#[derive(Debug, Args)]
pub struct CallCmd {
    /// Name of the endpoint to call, as it appears in the `endpoints` table.
    #[arg()]
    endpoint: String,

    /// Parameters to send. Query parameters for GET endpoints, a JSON object
    /// body for everything else.
    #[arg(value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Raw payload to send instead of parameters: the query string for GET
    /// endpoints, the request body for everything else.
    #[arg(long, conflicts_with = "params")]
    body: Option<String>,

    #[arg(from_global)]
    base_url: Option<Url>,

    #[arg(from_global)]
    json: bool,

    #[arg(from_global)]
    quiet: bool,

    #[arg(skip)]
    client_builder: Option<FetchClientBuilder>,
}

impl CallCmd {
    fn data(&self) -> RequestData {
        if let Some(body) = &self.body {
            RequestData::Raw(body.clone())
        } else if self.params.is_empty() {
            RequestData::Empty
        } else {
            self.params.iter().cloned().collect()
        }
    }
}

#[async_trait]
impl FetchpointCommand for CallCmd {
    async fn execute(self) -> Result<()> {
        let start = Instant::now();
        let data = self.data();
        let client = build_client(self.client_builder, self.base_url)?;
        let url = client.endpoint_url(&self.endpoint, &data)?;
        tracing::info!("call: {} {url}", self.endpoint);
        let value: Value = client.fetch_json(&self.endpoint, data).await?;
        tracing::info!("done: {}ms", start.elapsed().as_micros() as f32 / 1000.0);
        if self.quiet {
            return Ok(());
        }
        let output = if self.json {
            serde_json::to_string(&value)
        } else {
            serde_json::to_string_pretty(&value)
        }
        .into_diagnostic()
        .wrap_err("call::serialize")?;
        println!("{output}");
        Ok(())
    }
}

impl FetchpointConfigLayer for CallCmd {
    fn layer_config(&mut self, _args: &ArgMatches, conf: &FetchpointConfig) -> Result<()> {
        self.client_builder = Some(conf.client_builder()?);
        Ok(())
    }
}

fn parse_param(param: &str) -> Result<(String, String), FetchpointError> {
    match param.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(FetchpointError::InvalidParam(param.to_string())),
    }
}
