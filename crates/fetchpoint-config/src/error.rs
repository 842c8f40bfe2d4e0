use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchpointConfigError {
    #[error(transparent)]
    #[diagnostic(code(fetchpoint_config::error))]
    ConfigError(#[from] config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(fetchpoint_config::parse_error))]
    ConfigParseError(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// `base_url` was set, but isn't a URL.
    #[error("Configured base_url `{url}` is not a valid URL.")]
    #[diagnostic(
        code(fetchpoint_config::invalid_base_url),
        help("Base URLs look like `http://localhost:8000`.")
    )]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
