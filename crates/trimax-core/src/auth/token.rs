use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeDelta, TimeZone, Utc};
use tracing::{debug, warn};

use super::storage::{Entries, KeyValueStore, StorageContext};

/// Storage key for the token value
const TOKEN_KEY: &str = "wp_jwt_token";

/// Storage key for the token expiry, epoch milliseconds as a decimal string
const TOKEN_EXPIRY_KEY: &str = "wp_jwt_token_expiry";

/// Token lifetime applied when the caller does not supply one.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

// Keep the credential out of logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// The expiry instant itself counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

/// Single source of truth for the current bearer token.
///
/// Clones share the same backing store.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn from_context(context: StorageContext) -> Self {
        Self::new(context.into_store())
    }

    pub fn in_memory() -> Self {
        Self::from_context(StorageContext::Ephemeral)
    }

    pub fn detached() -> Self {
        Self::from_context(StorageContext::Detached)
    }

    /// Return the stored token if it has not expired.
    pub fn get_token(&self) -> Option<Token> {
        self.get_token_at(Utc::now())
    }

    /// Return the stored token if it is still valid at `now`.
    ///
    /// A stored value with a missing, unparseable, or past expiry is cleared.
    /// The read and any clear happen as one storage step, so a concurrent
    /// `set_token` is never half-observed or wiped.
    pub fn get_token_at(&self, now: DateTime<Utc>) -> Option<Token> {
        let mut found = None;
        self.store.update(&mut |entries| {
            let Some(value) = entries.get(TOKEN_KEY).cloned() else {
                return false;
            };
            let expires_at = entries
                .get(TOKEN_EXPIRY_KEY)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

            let Some(expires_at) = expires_at else {
                warn!("Stored token has no usable expiry, clearing");
                return remove_token_entries(entries);
            };

            let token = Token { value, expires_at };
            if token.is_expired_at(now) {
                debug!(expired_at = %expires_at, "Stored token expired, clearing");
                return remove_token_entries(entries);
            }
            found = Some(token);
            false
        });
        found
    }

    /// Store `value`, valid for `ttl_secs` from now.
    pub fn set_token(&self, value: &str, ttl_secs: i64) -> Token {
        self.set_token_at(value, ttl_secs, Utc::now())
    }

    pub fn set_token_default(&self, value: &str) -> Token {
        self.set_token(value, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Store `value`, valid for `ttl_secs` from `now`.
    ///
    /// A TTL that runs past the representable range saturates at the
    /// latest (or, for negative TTLs, earliest) instant.
    pub fn set_token_at(&self, value: &str, ttl_secs: i64, now: DateTime<Utc>) -> Token {
        let expires_at = expiry_after(now, ttl_secs);
        let millis = expires_at.timestamp_millis().to_string();
        self.store.update(&mut |entries| {
            entries.insert(TOKEN_KEY.to_string(), value.to_string());
            entries.insert(TOKEN_EXPIRY_KEY.to_string(), millis.clone());
            true
        });
        Token {
            value: value.to_string(),
            expires_at,
        }
    }

    pub fn clear_token(&self) {
        self.store.update(&mut |entries| remove_token_entries(entries));
    }
}

fn remove_token_entries(entries: &mut Entries) -> bool {
    let value = entries.remove(TOKEN_KEY).is_some();
    let expiry = entries.remove(TOKEN_EXPIRY_KEY).is_some();
    value || expiry
}

fn expiry_after(now: DateTime<Utc>, ttl_secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(if ttl_secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}
