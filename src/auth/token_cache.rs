// Parcel Carriers - Multi-carrier shipping SDK
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! OAuth bearer token cache
//!
//! One `TokenCache` exists per carrier credential set and lives as long as
//! the clients that share it. Reads of a fresh token take a short read
//! lock and never await. Refreshes are serialized by an async mutex with a
//! double check, so however many callers find the token stale at once,
//! exactly one request reaches the token endpoint and every waiter gets
//! the token it produced.
//!
//! The cached token is treated as stale [`DEFAULT_EXPIRY_BUFFER`] before
//! its real expiry so it cannot lapse between being read and being used
//! on the wire.
//!
//! Cancelling a caller (dropping its future) while it holds the refresh
//! lock releases the lock; the next waiter performs the refresh instead.

use crate::config::mask;
use crate::error::{Carrier, CarrierError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Safety margin subtracted from the token lifetime
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Token as issued by a token endpoint
#[derive(Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds as reported by the endpoint
    pub expires_in: i64,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &mask(&self.access_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Performs one network-bound token request
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<TokenGrant>;
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant, buffer: Duration) -> bool {
        self.expires_at
            .checked_sub(buffer)
            .map_or(false, |deadline| now < deadline)
    }
}

pub struct TokenCache {
    carrier: Carrier,
    source: Arc<dyn TokenSource>,
    buffer: Duration,
    cached: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("carrier", &self.carrier)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl TokenCache {
    pub fn new(carrier: Carrier, source: Arc<dyn TokenSource>) -> Self {
        Self::with_buffer(carrier, source, DEFAULT_EXPIRY_BUFFER)
    }

    pub fn with_buffer(carrier: Carrier, source: Arc<dyn TokenSource>, buffer: Duration) -> Self {
        Self {
            carrier,
            source,
            buffer,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Current access token, refreshing it first if it is stale
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_token() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.fresh_token() {
            debug!(carrier = %self.carrier, "token refreshed by concurrent caller");
            return Ok(token);
        }

        let grant = self.source.fetch_token().await?;
        if grant.access_token.trim().is_empty() {
            return Err(CarrierError::InvalidTokenResponse(
                "token endpoint returned an empty access token".to_string(),
            ));
        }
        if grant.expires_in <= 0 {
            return Err(CarrierError::InvalidTokenResponse(format!(
                "token endpoint returned non-positive expires_in {}",
                grant.expires_in
            )));
        }

        let lifetime = Duration::from_secs(grant.expires_in as u64);
        let expires_at = Instant::now().checked_add(lifetime).ok_or_else(|| {
            CarrierError::InvalidTokenResponse(format!(
                "token endpoint returned out-of-range expires_in {}",
                grant.expires_in
            ))
        })?;
        info!(
            carrier = %self.carrier,
            expires_in = grant.expires_in,
            token = %mask(&grant.access_token),
            "acquired access token"
        );

        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedToken {
            access_token: grant.access_token.clone(),
            expires_at,
        });

        Ok(grant.access_token)
    }

    /// Drop the cached token so the next caller fetches a new one
    ///
    /// [`BearerAuthorizer`](super::BearerAuthorizer) calls this when the
    /// carrier answers 401.
    pub fn invalidate(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fresh_token(&self) -> Option<String> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|token| token.is_fresh(Instant::now(), self.buffer))
            .map(|token| token.access_token.clone())
    }
}
