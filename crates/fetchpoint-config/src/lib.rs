use std::path::{Path, PathBuf};
use std::time::Duration;

pub use clap::ArgMatches;
pub use config::Config as FetchpointConfig;
use config::{ConfigError, Environment, File};
use fetchpoint_client::{EndpointTable, FetchClientBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub use error::FetchpointConfigError;
use kdl_source::KdlFormat;

mod error;
mod kdl_source;

pub type Result<T> = std::result::Result<T, FetchpointConfigError>;

const PROJECT_FILES: &[&str] = &[
    "fetchpointrc",
    ".fetchpointrc",
    "fetchpointrc.toml",
    ".fetchpointrc.toml",
];
const PROJECT_KDL_FILES: &[&str] = &["fetchpointrc.kdl", ".fetchpointrc.kdl"];

/// Lets command line structs fill in anything the user didn't pass
/// explicitly from the loaded configuration.
pub trait FetchpointConfigLayer {
    fn layer_config(
        &mut self,
        _matches: &ArgMatches,
        _config: &FetchpointConfig,
    ) -> miette::Result<()> {
        Ok(())
    }
}

/// Typed access to the keys fetchpoint understands.
pub trait FetchpointConfigExt {
    /// `base_url`, if configured.
    fn base_url(&self) -> Result<Option<Url>>;

    /// `endpoints`, or an empty table when none are configured.
    fn endpoint_table(&self) -> Result<EndpointTable>;

    /// A client builder preloaded with every configured client option.
    fn client_builder(&self) -> Result<FetchClientBuilder>;
}

impl FetchpointConfigExt for FetchpointConfig {
    fn base_url(&self) -> Result<Option<Url>> {
        match self.get_string("base_url") {
            Ok(url) => Url::parse(&url)
                .map(Some)
                .map_err(|source| FetchpointConfigError::InvalidBaseUrl { url, source }),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn endpoint_table(&self) -> Result<EndpointTable> {
        match self.get::<EndpointTable>("endpoints") {
            Ok(table) => Ok(table),
            Err(ConfigError::NotFound(_)) => Ok(EndpointTable::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn client_builder(&self) -> Result<FetchClientBuilder> {
        let mut builder = FetchClientBuilder::new().endpoints(self.endpoint_table()?);
        if let Some(base_url) = self.base_url()? {
            builder = builder.base_url(base_url);
        }
        if let Some(user_agent) = optional::<String>(self, "user_agent")? {
            builder = builder.user_agent(user_agent);
        }
        if let Some(secs) = optional::<u64>(self, "timeout_secs")? {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder)
    }
}

fn optional<T: DeserializeOwned>(config: &FetchpointConfig, key: &str) -> Result<Option<T>> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub struct FetchpointConfigOptions {
    global: bool,
    env: bool,
    project_root: Option<PathBuf>,
    global_config_file: Option<PathBuf>,
}

impl Default for FetchpointConfigOptions {
    fn default() -> Self {
        FetchpointConfigOptions {
            global: true,
            env: true,
            project_root: None,
            global_config_file: None,
        }
    }
}

impl FetchpointConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    pub fn env(mut self, env: bool) -> Self {
        self.env = env;
        self
    }

    pub fn project_root(mut self, root: Option<PathBuf>) -> Self {
        self.project_root = root;
        self
    }

    pub fn global_config_file(mut self, file: Option<PathBuf>) -> Self {
        self.global_config_file = file;
        self
    }

    /// Layers the global config file, then project files, then
    /// `FETCHPOINT_*` environment variables. Later sources win.
    pub fn load(self) -> Result<FetchpointConfig> {
        let mut builder = FetchpointConfig::builder();
        if self.global {
            if let Some(config_file) = self.global_config_file {
                tracing::debug!("global config: {}", config_file.display());
                builder = if is_kdl(&config_file) {
                    builder.add_source(
                        File::new(&config_file.display().to_string(), KdlFormat).required(false),
                    )
                } else {
                    builder.add_source(
                        File::with_name(&config_file.display().to_string()).required(false),
                    )
                };
            }
        }
        if let Some(root) = self.project_root {
            for name in PROJECT_FILES {
                builder = builder.add_source(
                    File::with_name(&root.join(name).display().to_string()).required(false),
                );
            }
            for name in PROJECT_KDL_FILES {
                builder = builder.add_source(
                    File::new(&root.join(name).display().to_string(), KdlFormat).required(false),
                );
            }
        }
        if self.env {
            builder = builder.add_source(Environment::with_prefix("fetchpoint"));
        }
        Ok(builder.build()?)
    }
}

fn is_kdl(path: &Path) -> bool {
    path.extension().map(|ext| ext == "kdl").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::fs;

    use fetchpoint_client::{Endpoint, Method};
    use maplit::btreemap;
    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn env_configs() -> Result<()> {
        env::set_var("FETCHPOINT_BASE_URL", "http://localhost:9000");
        let config = FetchpointConfigOptions::new().global(false).load()?;
        env::remove_var("FETCHPOINT_BASE_URL");
        assert_eq!(
            config.base_url()?,
            Some(Url::parse("http://localhost:9000").into_diagnostic()?)
        );
        Ok(())
    }

    #[test]
    fn global_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let file = dir.path().join("fetchpointrc.toml");
        fs::write(
            &file,
            r#"
            base_url = "http://localhost:8000"
            user_agent = "covid-dashboard"

            [endpoints.cases]
            method = "GET"
            uri = "/cases"

            [endpoints.report]
            method = "post"
            uri = "/report"
            "#,
        )
        .into_diagnostic()?;
        let config = FetchpointConfigOptions::new()
            .env(false)
            .global_config_file(Some(file))
            .load()?;
        assert_eq!(
            config.base_url()?,
            Some(Url::parse("http://localhost:8000").into_diagnostic()?)
        );
        assert_eq!(
            config.endpoint_table()?,
            btreemap! {
                "cases".to_string() => Endpoint::get("/cases"),
                "report".to_string() => Endpoint::new(Method::POST, "/report"),
            }
        );
        let client = config.client_builder()?.build()?;
        assert_eq!(client.endpoints().len(), 2);
        Ok(())
    }

    #[test]
    fn project_config_overrides_global() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let global = dir.path().join("global.toml");
        fs::write(&global, "base_url = \"http://global:8000\"").into_diagnostic()?;
        fs::write(
            dir.path().join("fetchpointrc.kdl"),
            r#"
            options {
                base_url "http://project:8000"
                endpoints {
                    countries method="GET" uri="/countries"
                }
            }
            "#,
        )
        .into_diagnostic()?;
        let config = FetchpointConfigOptions::new()
            .env(false)
            .global_config_file(Some(global))
            .project_root(Some(dir.path().to_owned()))
            .load()?;
        assert_eq!(
            config.base_url()?,
            Some(Url::parse("http://project:8000").into_diagnostic()?)
        );
        assert_eq!(
            config.endpoint_table()?,
            btreemap! {
                "countries".to_string() => Endpoint::get("/countries"),
            }
        );
        Ok(())
    }

    #[test]
    fn invalid_base_url() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let file = dir.path().join("fetchpointrc.toml");
        fs::write(&file, "base_url = \"not a url\"").into_diagnostic()?;
        let config = FetchpointConfigOptions::new()
            .env(false)
            .global_config_file(Some(file))
            .load()?;
        assert!(matches!(
            config.base_url(),
            Err(FetchpointConfigError::InvalidBaseUrl { .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_config() -> Result<()> {
        let config = FetchpointConfigOptions::new().global(false).env(false).load()?;
        assert_eq!(config.base_url()?, None);
        assert!(config.endpoint_table()?.is_empty());
        Ok(())
    }
}
