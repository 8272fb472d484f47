//! Client for the REST content API (everything that is not GraphQL).

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::ApiError;

/// Method, extra headers, and optional JSON body for a REST call.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RestRequest {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RestRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug)]
pub struct RestClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl RestClient {
    pub fn new(client: Client, base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RestRequest::default()).await
    }

    /// Call `base_url + endpoint` and decode the JSON body as `T`.
    ///
    /// Caller headers override the JSON content type; the stored bearer token,
    /// if any, is always attached.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RestRequest,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.build_headers(&request.headers)?;

        debug!(method = %request.method, url = %url, "Sending REST request");

        let mut builder = self.client.request(request.method, &url).headers(headers);
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!(url = %url, "REST request unauthorized, clearing stored token");
                self.tokens.clear_token();
                return Err(ApiError::AuthenticationExpired);
            }
            return Err(ApiError::Http {
                status,
                message: format!(
                    "API request failed: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                ),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "{}: {}",
                e,
                ApiError::truncate_body(&body)
            ))
        })
    }

    fn build_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, value);
        }

        if let Some(token) = self.tokens.get_token() {
            let value = HeaderValue::from_str(&token.bearer())
                .map_err(|e| ApiError::InvalidHeader(format!("authorization: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct WpPage {
        id: i64,
        slug: String,
    }

    fn client_for(server: &MockServer, tokens: TokenStore) -> RestClient {
        RestClient::new(Client::new(), format!("{}/wp-json/wp/v2", server.uri()), tokens)
    }

    #[tokio::test]
    async fn test_get_appends_endpoint_to_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/pages"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "slug": "about"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let pages: Vec<WpPage> = client.get("/pages").await.expect("pages");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, 7);
        assert_eq!(pages[0].slug, "about");

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_post_with_headers_body_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/comments"))
            .and(header("authorization", "Bearer abc"))
            .and(header("x-wp-nonce", "n1"))
            .and(body_json(json!({"post": 7, "content": "Great"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99, "slug": "c"})))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("abc", 3600);
        let client = client_for(&server, tokens);

        let request = RestRequest::new(Method::POST)
            .header("X-WP-Nonce", "n1")
            .json(json!({"post": 7, "content": "Great"}));
        let created: WpPage = client.request("/comments", request).await.expect("created");
        assert_eq!(created.id, 99);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("stale", 3600);
        let client = client_for(&server, tokens.clone());

        let result: Result<Value, _> = client.get("/users/me").await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired)));
        assert!(tokens.get_token().is_none());
    }

    #[tokio::test]
    async fn test_other_status_reports_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("abc", 3600);
        let client = client_for(&server, tokens.clone());

        let result: Result<Value, _> = client.get("/pages/12345").await;
        match result {
            Err(e @ ApiError::Http { .. }) => {
                assert_eq!(e.to_string(), "API request failed: Not Found");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert!(tokens.get_token().is_some());
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_rejected_before_sending() {
        let server = MockServer::start().await;
        let client = client_for(&server, TokenStore::in_memory());

        let request = RestRequest::default().header("bad header", "x");
        let result: Result<Value, _> = client.request("/pages", request).await;
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
