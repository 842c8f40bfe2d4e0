use std::path::PathBuf;

use async_trait::async_trait;
use clap::{ArgMatches, CommandFactory, FromArgMatches as _, Parser, Subcommand};
use directories::ProjectDirs;
use fetchpoint_config::{FetchpointConfig, FetchpointConfigLayer, FetchpointConfigOptions};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};
use url::Url;

use commands::call::CallCmd;
use commands::endpoints::EndpointsCmd;
use commands::FetchpointCommand;

mod commands;
mod error;

pub use error::FetchpointError;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Fetchpoint {
    /// Directory to look for project configuration files in. Defaults to the
    /// current directory.
    #[arg(global = true, long = "root")]
    root: Option<PathBuf>,

    /// File to read configuration values from. When given, no other config
    /// files are read.
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    /// Base URL every endpoint path is appended to. Overrides `base_url`
    /// from configuration.
    #[arg(global = true, long)]
    base_url: Option<Url>,

    /// Log output level/directive. Supports plain loglevels (off, error,
    /// warn, info, debug, trace) as well as more advanced directives in the
    /// format `target[span{field=value}]=level`.
    #[clap(global = true, long, default_value = "warn")]
    loglevel: String,

    /// Disable all output
    #[arg(global = true, long, short)]
    quiet: bool,

    /// Format output as compact JSON.
    #[arg(global = true, long)]
    json: bool,

    #[command(subcommand)]
    subcommand: FetchpointCmd,
}

impl Fetchpoint {
    fn setup_logging(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(
                EnvFilter::builder()
                    .with_default_directive(if self.quiet {
                        LevelFilter::OFF.into()
                    } else {
                        self.loglevel.parse().into_diagnostic()?
                    })
                    .from_env_lossy(),
            )
            .init();
        Ok(())
    }

    fn load_config(&self) -> Result<FetchpointConfig> {
        Ok(if let Some(file) = &self.config {
            FetchpointConfigOptions::new()
                .global_config_file(Some(file.clone()))
                .load()?
        } else {
            let root = match &self.root {
                Some(root) => root.clone(),
                None => std::env::current_dir().into_diagnostic()?,
            };
            FetchpointConfigOptions::new()
                .global_config_file(
                    ProjectDirs::from("", "", "fetchpoint")
                        .map(|d| d.config_dir().to_owned().join("fetchpointrc.toml")),
                )
                .project_root(Some(root))
                .load()?
        })
    }

    pub async fn load() -> Result<()> {
        let start = std::time::Instant::now();
        let matches = Fetchpoint::command().get_matches();
        let mut fp = Fetchpoint::from_arg_matches(&matches).into_diagnostic()?;
        fp.setup_logging()?;
        let cfg = fp.load_config()?;
        fp.layer_config(&matches, &cfg)?;
        fp.execute().await?;
        tracing::info!("Ran in {}s", start.elapsed().as_millis() as f32 / 1000.0);
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum FetchpointCmd {
    /// Call a named endpoint and print the JSON it returns.
    Call(CallCmd),

    /// List the configured endpoints.
    Endpoints(EndpointsCmd),
}

#[async_trait]
impl FetchpointCommand for Fetchpoint {
    async fn execute(self) -> Result<()> {
        tracing::debug!("Running command: {:#?}", self.subcommand);
        match self.subcommand {
            FetchpointCmd::Call(call) => call.execute().await,
            FetchpointCmd::Endpoints(endpoints) => endpoints.execute().await,
        }
    }
}

impl FetchpointConfigLayer for Fetchpoint {
    fn layer_config(&mut self, args: &ArgMatches, conf: &FetchpointConfig) -> Result<()> {
        let sub_args = args
            .subcommand()
            .map(|(_, sub_args)| sub_args)
            .unwrap_or(args);
        match self.subcommand {
            FetchpointCmd::Call(ref mut call) => call.layer_config(sub_args, conf),
            FetchpointCmd::Endpoints(ref mut endpoints) => endpoints.layer_config(sub_args, conf),
        }
    }
}
