//! Core library for trimax.
//!
//! Client for the headless content backend behind the Trimax site:
//! - `auth`: token storage with expiry and the credential login flow
//! - `api`: GraphQL query dispatch and the REST content endpoint
//! - `client`: `ContentClient`, the facade that wires everything together
//! - `models` / `queries`: typed site content and the canned query documents
//! - `config`: endpoint configuration and on-disk app settings

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod models;
pub mod queries;
pub mod utils;

pub use api::{ApiError, GraphQlClient, QueryRequest, RestClient, RestRequest};
pub use auth::{
    AuthClient, AuthUser, Credentials, KeyValueStore, LoginOutcome, StorageContext, Token,
    TokenStore,
};
pub use client::ContentClient;
pub use config::{Config, Endpoints};
