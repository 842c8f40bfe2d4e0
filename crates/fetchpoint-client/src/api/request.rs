use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use url::{form_urlencoded, Url};

use crate::{FetchClient, FetchClientError, RequestData};

impl FetchClient {
    /// The URL a call to `endpoint` with `data` would be sent to.
    ///
    /// For `GET` endpoints `data` replaces the query string. For any other
    /// method the URL is the endpoint's own.
    pub fn endpoint_url(
        &self,
        endpoint: &str,
        data: &RequestData,
    ) -> Result<Url, FetchClientError> {
        let target = self.endpoint(endpoint)?;
        let mut url = target.url(endpoint, &self.base_url)?;
        if target.method == Method::GET {
            url.set_query(None);
            match data {
                RequestData::Raw(raw) => {
                    let raw = raw.strip_prefix('?').unwrap_or(raw);
                    let pairs = form_urlencoded::parse(raw.as_bytes()).collect::<Vec<_>>();
                    if !pairs.is_empty() {
                        url.query_pairs_mut().extend_pairs(pairs);
                    }
                }
                RequestData::Params(_) if !data.is_empty() => {
                    url.query_pairs_mut().extend_pairs(data.query_pairs());
                }
                RequestData::Params(_) | RequestData::Empty => {}
            }
        }
        Ok(url)
    }

    /// Sends a request to the named endpoint and hands back the response
    /// without looking at its status.
    pub async fn request(
        &self,
        endpoint: &str,
        data: impl Into<RequestData>,
    ) -> Result<Response, FetchClientError> {
        let data = data.into();
        let method = self.endpoint(endpoint)?.method.clone();
        let url = self.endpoint_url(endpoint, &data)?;
        tracing::trace!("request {endpoint}: {method} {url}");

        let mut req = self.client.request(method.clone(), url);
        if method != Method::GET {
            req = match data {
                RequestData::Empty => req,
                RequestData::Raw(body) => req.body(body),
                RequestData::Params(params) => req
                    .header(CONTENT_TYPE, "application/json")
                    .body(serde_json::Value::Object(params).to_string()),
            };
        }
        Ok(req.send().await?)
    }
}

#[cfg(test)]
mod test {
    use maplit::btreemap;
    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::Endpoint;

    fn client(base_url: &str) -> Result<FetchClient> {
        Ok(FetchClient::new(
            base_url.parse().into_diagnostic()?,
            btreemap! {
                "items".to_string() => Endpoint::get("/items"),
                "search".to_string() => Endpoint::get("/search?limit=10"),
                "newItem".to_string() => Endpoint::post("/items"),
                "dropItem".to_string() => Endpoint::delete("/items"),
            },
        )?)
    }

    #[test]
    fn get_url_encodes_params() -> Result<()> {
        let client = client("http://localhost:8000")?;
        let data = RequestData::from(json!({"id": "5"}));
        assert_eq!(
            client.endpoint_url("items", &data)?.as_str(),
            "http://localhost:8000/items?id=5"
        );

        let data = RequestData::from(json!({
            "countries": ["RUS", "USA"],
            "from": "2021-01-01",
            "page": 2,
        }));
        let url = client.endpoint_url("items", &data)?;
        let mut pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("countries".to_string(), "RUS,USA".to_string()),
                ("from".to_string(), "2021-01-01".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn get_url_replaces_configured_query() -> Result<()> {
        let client = client("http://localhost:8000")?;
        assert_eq!(
            client
                .endpoint_url("search", &json!({"q": "a b&c"}).into())?
                .as_str(),
            "http://localhost:8000/search?q=a+b%26c"
        );
        assert_eq!(
            client
                .endpoint_url("search", &RequestData::Empty)?
                .as_str(),
            "http://localhost:8000/search"
        );
        assert_eq!(
            client
                .endpoint_url("search", &RequestData::from("?x=1&y=2"))?
                .as_str(),
            "http://localhost:8000/search?x=1&y=2"
        );
        Ok(())
    }

    #[test]
    fn get_url_reencodes_raw_query() -> Result<()> {
        let client = client("http://localhost:8000")?;
        assert_eq!(
            client
                .endpoint_url("items", &RequestData::from("a b=c&d=%2F"))?
                .as_str(),
            "http://localhost:8000/items?a+b=c&d=%2F"
        );
        assert_eq!(
            client.endpoint_url("items", &RequestData::from("&"))?.as_str(),
            "http://localhost:8000/items"
        );
        Ok(())
    }

    #[test]
    fn non_get_url_has_no_data_in_query() -> Result<()> {
        let client = client("http://localhost:8000/api")?;
        assert_eq!(
            client
                .endpoint_url("newItem", &json!({"id": "5"}).into())?
                .as_str(),
            "http://localhost:8000/api/items"
        );
        Ok(())
    }

    #[test]
    fn unknown_endpoint_fails_before_io() -> Result<()> {
        let client = client("http://localhost:8000")?;
        assert!(matches!(
            client.endpoint_url("missing", &RequestData::Empty),
            Err(FetchClientError::UnknownEndpoint(ref name)) if name == "missing"
        ));
        Ok(())
    }

    #[async_std::test]
    async fn get_sends_query() -> Result<()> {
        let mock_server = MockServer::start().await;
        let client = client(&mock_server.uri())?;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("id", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client.request("items", json!({"id": "5"})).await?;
        assert_eq!(res.status(), 200);
        Ok(())
    }

    #[async_std::test]
    async fn post_sends_raw_body_verbatim() -> Result<()> {
        let mock_server = MockServer::start().await;
        let client = client(&mock_server.uri())?;

        Mock::given(method("POST"))
            .and(path("/items"))
            .and(body_string("name=widget&qty=3"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client.request("newItem", "name=widget&qty=3").await?;
        assert_eq!(res.status(), 201);

        let requests = mock_server
            .received_requests()
            .await
            .expect("request recording is on by default");
        let req: &Request = &requests[0];
        assert_eq!(req.url.query(), None);
        Ok(())
    }

    #[async_std::test]
    async fn post_sends_params_as_json() -> Result<()> {
        let mock_server = MockServer::start().await;
        let client = client(&mock_server.uri())?;

        Mock::given(method("POST"))
            .and(path("/items"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "widget", "qty": 3})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client
            .request("newItem", json!({"name": "widget", "qty": 3}))
            .await?;
        assert_eq!(res.status(), 201);
        Ok(())
    }

    #[async_std::test]
    async fn request_does_not_check_status() -> Result<()> {
        let mock_server = MockServer::start().await;
        let client = client(&mock_server.uri())?;

        Mock::given(method("DELETE"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client.request("dropItem", ()).await?;
        assert_eq!(res.status(), 500);
        Ok(())
    }
}
