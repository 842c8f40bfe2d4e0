use hyper::ext::ReasonPhrase;
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::{FetchClient, FetchClientError, RequestData};

impl FetchClient {
    /// Calls the named endpoint and parses a successful response body as
    /// JSON. Any status outside 200-299 is an
    /// [`HttpError`](FetchClientError::HttpError).
    ///
    /// Use `serde_json::Value` as `T` to get the body back untyped.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data: impl Into<RequestData>,
    ) -> Result<T, FetchClientError> {
        let response = self.request(endpoint, data).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchClientError::from_status(status, status_text(&response)));
        }
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(move |e| FetchClientError::from_json_err(e, url, text))
    }
}

/// The reason phrase the server sent. hyper only keeps it around when it
/// differs from the canonical one for the code.
fn status_text(response: &Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}
