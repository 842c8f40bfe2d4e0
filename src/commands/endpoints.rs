use async_trait::async_trait;
use clap::Args;
use colored::*;
use fetchpoint_client::EndpointTable;
use fetchpoint_config::{ArgMatches, FetchpointConfig, FetchpointConfigExt, FetchpointConfigLayer};
use miette::{IntoDiagnostic, Result, WrapErr};
use url::Url;

use crate::commands::FetchpointCommand;

/// List the configured endpoints.
#[derive(Debug, Args)]
#[clap(visible_aliases(["ls"]))]
pub struct EndpointsCmd {
    #[arg(from_global)]
    base_url: Option<Url>,

    #[arg(from_global)]
    json: bool,

    #[arg(from_global)]
    quiet: bool,

    #[arg(skip)]
    endpoints: EndpointTable,

    #[arg(skip)]
    configured_base_url: Option<Url>,
}

#[async_trait]
impl FetchpointCommand for EndpointsCmd {
    async fn execute(self) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&self.endpoints)
                    .into_diagnostic()
                    .wrap_err("endpoints::json_serialize")?
            );
            return Ok(());
        }
        let base_url = self.base_url.or(self.configured_base_url);
        if self.endpoints.is_empty() {
            tracing::warn!("No endpoints configured.");
        }
        let width = self.endpoints.keys().map(|k| k.len()).max().unwrap_or(0);
        for (name, endpoint) in &self.endpoints {
            let target = match &base_url {
                Some(base_url) => endpoint.url_string(base_url),
                None => endpoint.uri.clone(),
            };
            // cases   GET    http://localhost:8000/cases
            println!(
                "{:width$}  {:6} {}",
                name.bright_green(),
                endpoint.method.as_str().cyan(),
                target
            );
        }
        Ok(())
    }
}

impl FetchpointConfigLayer for EndpointsCmd {
    fn layer_config(&mut self, _args: &ArgMatches, conf: &FetchpointConfig) -> Result<()> {
        self.endpoints = conf.endpoint_table()?;
        self.configured_base_url = conf.base_url()?;
        Ok(())
    }
}
