use std::time::Instant;

use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use task_local_extensions::Extensions;

/// Emits a `debug` event for every request that goes out and the status it
/// came back with.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogMiddleware;

#[async_trait::async_trait]
impl Middleware for LogMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        tracing::debug!("{method} {url}");
        let start = Instant::now();
        let res = next.run(req, extensions).await;
        let elapsed = start.elapsed().as_micros() as f32 / 1000.0;
        match &res {
            Ok(response) => {
                tracing::debug!("{method} {url} -> {} ({elapsed}ms)", response.status())
            }
            Err(err) => tracing::debug!("{method} {url} failed after {elapsed}ms: {err}"),
        }
        res
    }
}
