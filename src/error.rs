use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchpointError {
    /// Parameters passed to `fp call` have to look like `key=value`.
    #[error("`{0}` is not a valid parameter. Parameters look like `key=value`.")]
    #[diagnostic(
        code(fp::call::invalid_param),
        url(docsrs),
        help("Use `--body` to send a raw payload instead.")
    )]
    InvalidParam(String),
}
