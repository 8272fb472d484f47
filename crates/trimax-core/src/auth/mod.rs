//! Authentication module for token storage and credential login.
//!
//! This module provides:
//! - `KeyValueStore`: the storage capability tokens are persisted through
//! - `TokenStore`: bearer token with absolute expiry, cleared once expired
//! - `AuthClient`: exchanges credentials for a token at the JWT endpoint
//!
//! Tokens default to a one hour lifetime.

pub mod flow;
pub mod storage;
pub mod token;

pub use flow::{AuthClient, AuthUser, Credentials, LoginOutcome};
pub use storage::{Entries, FileStore, KeyValueStore, MemoryStore, NoopStore, StorageContext};
pub use token::{Token, TokenStore, DEFAULT_TOKEN_TTL_SECS};
