//! HTTP client module for the headless content backend.
//!
//! This module provides the `GraphQlClient` for dispatching query documents
//! to the single GraphQL endpoint, and the `RestClient` for the plain REST
//! content API.
//!
//! Both attach a JWT bearer token from the shared `TokenStore` when one is
//! stored, and clear it when the backend answers 401.

pub mod error;
pub mod graphql;
pub mod rest;

pub use error::ApiError;
pub use graphql::{GraphQlClient, QueryRequest};
pub use rest::{RestClient, RestRequest};
