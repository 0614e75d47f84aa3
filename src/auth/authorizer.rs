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


//! Credential headers for outgoing carrier requests

use super::token_cache::TokenCache;
use crate::error::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;

/// Adds whatever credentials a carrier API expects to a request
#[async_trait]
pub trait RequestAuthorizer: Send + Sync {
    async fn authorize(&self, headers: &mut Vec<(String, String)>) -> Result<()>;

    /// The carrier answered 401 to a request carrying these credentials
    fn rejected(&self) {}
}

/// For endpoints that embed credentials in the request itself
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl RequestAuthorizer for NoAuth {
    async fn authorize(&self, _headers: &mut Vec<(String, String)>) -> Result<()> {
        Ok(())
    }
}

/// `Authorization: Bearer <token>` from a shared [`TokenCache`]
#[derive(Debug, Clone)]
pub struct BearerAuthorizer {
    cache: Arc<TokenCache>,
    /// Extra API key header some gateways require next to the token
    api_key: Option<(String, String)>,
}

impl BearerAuthorizer {
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self { cache, api_key: None }
    }

    pub fn with_api_key<K: Into<String>, V: Into<String>>(mut self, header: K, key: V) -> Self {
        self.api_key = Some((header.into(), key.into()));
        self
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }
}

#[async_trait]
impl RequestAuthorizer for BearerAuthorizer {
    async fn authorize(&self, headers: &mut Vec<(String, String)>) -> Result<()> {
        let token = self.cache.access_token().await?;
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        if let Some((header, key)) = &self.api_key {
            headers.push((header.clone(), key.clone()));
        }
        Ok(())
    }

    fn rejected(&self) {
        self.cache.invalidate();
    }
}

/// Static API key header, e.g. `DHL-API-Key`
#[derive(Debug, Clone)]
pub struct ApiKeyAuthorizer {
    header: String,
    key: String,
}

impl ApiKeyAuthorizer {
    pub fn new<K: Into<String>, V: Into<String>>(header: K, key: V) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl RequestAuthorizer for ApiKeyAuthorizer {
    async fn authorize(&self, headers: &mut Vec<(String, String)>) -> Result<()> {
        headers.push((self.header.clone(), self.key.clone()));
        Ok(())
    }
}

/// HTTP basic authentication
#[derive(Debug, Clone)]
pub struct BasicAuthorizer {
    header_value: String,
}

impl BasicAuthorizer {
    pub fn new(username: &str, password: &str) -> Self {
        let encoded = BASE64.encode(format!("{}:{}", username, password));
        Self {
            header_value: format!("Basic {}", encoded),
        }
    }
}

#[async_trait]
impl RequestAuthorizer for BasicAuthorizer {
    async fn authorize(&self, headers: &mut Vec<(String, String)>) -> Result<()> {
        headers.push(("Authorization".to_string(), self.header_value.clone()));
        Ok(())
    }
}
