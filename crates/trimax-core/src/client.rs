//! The `ContentClient` facade.
//!
//! One HTTP connection pool and one `TokenStore` shared by the GraphQL
//! dispatcher, the REST client, and the login flow, so a login made through
//! the facade is immediately visible to every fetch.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api::{ApiError, GraphQlClient, QueryRequest, RestClient, RestRequest};
use crate::auth::{AuthClient, Credentials, LoginOutcome, StorageContext, TokenStore};
use crate::config::{Config, Endpoints};
use crate::models::{Category, Connection, Portfolio, Post, Service, SiteInfo};
use crate::queries::{self, CategoriesData, PortfolioData, PostData, PostSlugsData, PostsData, ServicesData};

/// Client for the headless content backend.
/// Clone is cheap - every part shares the same pool and token store.
#[derive(Clone, Debug)]
pub struct ContentClient {
    graphql: GraphQlClient,
    rest: RestClient,
    auth: AuthClient,
    tokens: TokenStore,
}

impl ContentClient {
    pub fn new(endpoints: &Endpoints, storage: StorageContext) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(endpoints.timeout).build()?;
        Ok(Self::with_client(client, endpoints, TokenStore::from_context(storage)))
    }

    /// Build from the environment, persisting tokens in the user data
    /// directory when the platform has one.
    pub fn from_env() -> Result<Self, ApiError> {
        let storage = match Config::token_path() {
            Some(path) => StorageContext::Persistent(path),
            None => StorageContext::Detached,
        };
        Self::new(&Endpoints::from_env(), storage)
    }

    pub fn with_client(client: Client, endpoints: &Endpoints, tokens: TokenStore) -> Self {
        Self {
            graphql: GraphQlClient::new(client.clone(), &endpoints.graphql_url, tokens.clone()),
            rest: RestClient::new(client.clone(), &endpoints.api_url, tokens.clone()),
            auth: AuthClient::new(client, &endpoints.auth_url, tokens.clone()),
            tokens,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn graphql(&self) -> &GraphQlClient {
        &self.graphql
    }

    // ===== Auth =====

    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        self.auth.login(credentials).await
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    // ===== Raw access =====

    pub async fn fetch_public<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
    ) -> Result<T, ApiError> {
        self.graphql.fetch_public(request).await
    }

    pub async fn fetch_private<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
    ) -> Result<T, ApiError> {
        self.graphql.fetch_private(request).await
    }

    pub async fn rest<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RestRequest,
    ) -> Result<T, ApiError> {
        self.rest.request(endpoint, request).await
    }

    // ===== Site content =====

    pub async fn all_posts(&self, first: u32, after: Option<&str>) -> Result<Connection<Post>, ApiError> {
        let data: PostsData = self.fetch_public(&queries::all_posts(first, after)).await?;
        Ok(data.posts.unwrap_or_default())
    }

    /// `None` when no published post has this slug.
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, ApiError> {
        let data: PostData = self.fetch_public(&queries::post_by_slug(slug)).await?;
        Ok(data.post)
    }

    pub async fn recent_posts(&self, first: u32) -> Result<Vec<Post>, ApiError> {
        let data: PostsData = self.fetch_public(&queries::recent_posts(first)).await?;
        Ok(data.posts.unwrap_or_default().nodes)
    }

    pub async fn posts_by_category(
        &self,
        category_slug: &str,
        first: u32,
        after: Option<&str>,
    ) -> Result<Connection<Post>, ApiError> {
        let request = queries::posts_by_category(category_slug, first, after);
        let data: PostsData = self.fetch_public(&request).await?;
        Ok(data.posts.unwrap_or_default())
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let data: CategoriesData = self.fetch_public(&queries::categories()).await?;
        Ok(data.categories.unwrap_or_default().nodes)
    }

    pub async fn all_post_slugs(&self) -> Result<Vec<String>, ApiError> {
        let data: PostSlugsData = self.fetch_public(&queries::all_post_slugs()).await?;
        Ok(data
            .posts
            .unwrap_or_default()
            .nodes
            .into_iter()
            .map(|p| p.slug)
            .collect())
    }

    pub async fn services(&self, first: u32) -> Result<Vec<Service>, ApiError> {
        let data: ServicesData = self.fetch_public(&queries::services(first)).await?;
        Ok(data.services.unwrap_or_default().nodes)
    }

    pub async fn portfolio_items(&self, first: u32) -> Result<Vec<Portfolio>, ApiError> {
        let data: PortfolioData = self.fetch_public(&queries::portfolio_items(first)).await?;
        Ok(data.portfolios.unwrap_or_default().nodes)
    }

    pub async fn site_info(&self) -> Result<SiteInfo, ApiError> {
        self.fetch_public(&queries::site_info()).await
    }
}
