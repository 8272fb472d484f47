//! GraphQL query dispatch with optional bearer authentication.
//!
//! The `Authorization` header is built for each request from the current
//! token; the shared `reqwest::Client` never carries auth state, so calls
//! issued concurrently cannot observe each other's credentials.

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::ApiError;

/// A query document plus its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    query: String,
    variables: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    /// Set a variable, replacing any previous value under the same name.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Operation name declared in the document, for logging.
    pub fn operation_name(&self) -> Option<&str> {
        let rest = self.query.trim_start();
        let rest = rest
            .strip_prefix("query")
            .or_else(|| rest.strip_prefix("mutation"))?;
        let name = rest
            .trim_start()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()?;
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    variables: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
}

/// Query dispatcher for the GraphQL endpoint.
/// Clone is cheap - the HTTP client and token store are shared.
#[derive(Clone, Debug)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    tokens: TokenStore,
}

impl GraphQlClient {
    pub fn new(client: Client, endpoint: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tokens,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a query with whatever token is stored.
    pub async fn fetch_public<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
    ) -> Result<T, ApiError> {
        self.dispatch(request, false).await
    }

    /// Run a query that must be authenticated.
    pub async fn fetch_private<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
    ) -> Result<T, ApiError> {
        self.dispatch(request, true).await
    }

    /// Send `request` and decode its `data` as `T`.
    ///
    /// With `require_auth` and no valid token this fails before touching the
    /// network. Any unauthorized response clears the token store.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
        require_auth: bool,
    ) -> Result<T, ApiError> {
        let token = self.tokens.get_token();
        if require_auth && token.is_none() {
            return Err(ApiError::AuthenticationRequired);
        }

        debug!(
            operation = request.operation_name().unwrap_or("anonymous"),
            authenticated = token.is_some(),
            "Dispatching GraphQL request"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&RequestBody {
                query: &request.query,
                variables: &request.variables,
            });
        if let Some(ref token) = token {
            builder = builder.header(header::AUTHORIZATION, token.bearer());
        }

        match self.execute(builder).await {
            Ok(data) => Ok(data),
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "GraphQL request unauthorized, clearing stored token");
                self.tokens.clear_token();
                Err(ApiError::AuthenticationExpired)
            }
            Err(e) => Err(e),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status,
                message: format!(
                    "GraphQL request failed with status {}: {}",
                    status,
                    ApiError::truncate_body(&body)
                ),
            });
        }

        let envelope: ResponseEnvelope = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "{}: {}",
                e,
                ApiError::truncate_body(&body)
            ))
        })?;

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::GraphQl(messages.join("; ")));
        }

        let data = envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("response contained no data".to_string()))?;
        serde_json::from_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Viewer {
        viewer: ViewerName,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ViewerName {
        name: String,
    }

    const VIEWER_QUERY: &str = "query GetViewer { viewer { name } }";

    fn client_for(server: &MockServer, tokens: TokenStore) -> GraphQlClient {
        GraphQlClient::new(Client::new(), format!("{}/graphql", server.uri()), tokens)
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(QueryRequest::new(VIEWER_QUERY).operation_name(), Some("GetViewer"));
        assert_eq!(
            QueryRequest::new("\n  query GetPostBySlug($slug: ID!) { post }").operation_name(),
            Some("GetPostBySlug")
        );
        assert_eq!(QueryRequest::new("{ viewer { name } }").operation_name(), None);
        assert_eq!(QueryRequest::new("query { viewer }").operation_name(), None);
    }

    #[test]
    fn test_variable_replaces_existing_key() {
        let request = QueryRequest::new(VIEWER_QUERY)
            .variable("first", 10)
            .variable("first", 5);
        assert_eq!(request.variables().len(), 1);
        assert_eq!(request.variables()["first"], json!(5));
    }

    #[tokio::test]
    async fn test_private_fetch_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let result: Result<Value, _> = client.fetch_private(&QueryRequest::new(VIEWER_QUERY)).await;

        assert!(matches!(result, Err(ApiError::AuthenticationRequired)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_public_fetch_sends_query_and_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "query": VIEWER_QUERY,
                "variables": {"first": 3}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"viewer": {"name": "Trimax"}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let request = QueryRequest::new(VIEWER_QUERY).variable("first", 3);
        let viewer: Viewer = client.fetch_public(&request).await.expect("query succeeds");

        assert_eq!(viewer.viewer.name, "Trimax");
        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_stored_token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"viewer": {"name": "Editor"}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("abc", 3600);
        let client = client_for(&server, tokens);

        let viewer: Viewer = client
            .fetch_private(&QueryRequest::new(VIEWER_QUERY))
            .await
            .expect("authorized query succeeds");
        assert_eq!(viewer.viewer.name, "Editor");
    }

    #[tokio::test]
    async fn test_unauthorized_status_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("jwt_auth_invalid_token"))
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("stale", 3600);
        let client = client_for(&server, tokens.clone());

        let result: Result<Value, _> = client.fetch_private(&QueryRequest::new(VIEWER_QUERY)).await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired)));
        assert!(tokens.get_token().is_none());

        // Next private call fails locally instead of repeating the doomed request
        let result: Result<Value, _> = client.fetch_private(&QueryRequest::new(VIEWER_QUERY)).await;
        assert!(matches!(result, Err(ApiError::AuthenticationRequired)));
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
    }

    #[tokio::test]
    async fn test_error_text_mentioning_401_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Internal server error (401 Unauthorized)"}]
            })))
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("stale", 3600);
        let client = client_for(&server, tokens.clone());

        let result: Result<Value, _> = client.fetch_public(&QueryRequest::new(VIEWER_QUERY)).await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired)));
        assert!(tokens.get_token().is_none());
    }

    #[tokio::test]
    async fn test_other_failures_propagate_and_keep_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Cannot query field \"bogus\""}]
            })))
            .mount(&server)
            .await;

        let tokens = TokenStore::in_memory();
        tokens.set_token("abc", 3600);
        let client = client_for(&server, tokens.clone());

        let result: Result<Value, _> = client.fetch_public(&QueryRequest::new("{ bogus }")).await;
        match result {
            Err(ApiError::GraphQl(message)) => assert!(message.contains("bogus")),
            other => panic!("expected GraphQl error, got {other:?}"),
        }
        assert!(tokens.get_token().is_some());
    }

    #[tokio::test]
    async fn test_server_error_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let result: Result<Value, _> = client.fetch_public(&QueryRequest::new(VIEWER_QUERY)).await;
        match result {
            Err(ApiError::Http { status, message }) => {
                assert_eq!(status.as_u16(), 503);
                assert!(message.contains("maintenance"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"viewer": null}})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, TokenStore::in_memory());
        let result: Result<Viewer, _> = client.fetch_public(&QueryRequest::new(VIEWER_QUERY)).await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }
}
