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


//! Authorized JSON client shared by the carrier adapters
//!
//! `ApiClient` joins endpoint paths onto a carrier base URL, asks its
//! [`RequestAuthorizer`] for credentials, sends through the
//! [`HttpTransport`] and classifies the outcome:
//!
//! - 2xx with a readable body: deserialized into the caller's type
//! - 2xx with an empty or unreadable body: `Deserialization`
//! - anything else: `Api`, carrying the status and extracted detail
//!
//! A 401 tells the authorizer its credentials were rejected, which drops a
//! cached bearer token. No request is retried.

use crate::auth::RequestAuthorizer;
use crate::error::{Carrier, CarrierError, Result};
use crate::http::error_detail::api_error;
use crate::http::transport::{HttpRequest, HttpTransport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use url::Url;

pub struct ApiClient {
    carrier: Carrier,
    /// API base URL without trailing slash
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    authorizer: Arc<dyn RequestAuthorizer>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("carrier", &self.carrier)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new<S: Into<String>>(
        carrier: Carrier,
        base_url: S,
        transport: Arc<dyn HttpTransport>,
        authorizer: Arc<dyn RequestAuthorizer>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            carrier,
            base_url,
            transport,
            authorizer,
        }
    }

    pub fn carrier(&self) -> Carrier {
        self.carrier
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint` with `query` appended
    pub fn url(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    /// Perform a GET request
    pub async fn get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(Method::GET, self.url(endpoint, query)?);
        self.send_json(request, endpoint).await
    }

    /// Perform a POST request with JSON body
    pub async fn post<T, B>(&self, endpoint: &str, query: &[(&str, String)], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let request = HttpRequest::new(Method::POST, self.url(endpoint, query)?)
            .json(serde_json::to_value(body)?);
        self.send_json(request, endpoint).await
    }

    /// Perform a DELETE request
    pub async fn delete<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(Method::DELETE, self.url(endpoint, query)?);
        self.send_json(request, endpoint).await
    }

    /// Authorize and send, returning the body of a 2xx response as text
    pub async fn send_text(&self, mut request: HttpRequest, endpoint: &str) -> Result<String> {
        self.authorizer.authorize(&mut request.headers).await?;

        let response = self.transport.send(request).await?;
        if response.status == 401 {
            warn!(carrier = %self.carrier, endpoint, "credentials rejected, dropping cached token");
            self.authorizer.rejected();
        }
        if !response.is_success() {
            return Err(api_error(self.carrier, response.status, &response.body, Some(endpoint)));
        }

        if response.body.trim().is_empty() {
            return Err(CarrierError::deserialization(
                self.carrier,
                format!("empty response body from {}", endpoint),
                None,
            ));
        }

        Ok(response.body)
    }

    async fn send_json<T>(&self, request: HttpRequest, endpoint: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.send_text(request, endpoint).await?;
        parse_json(self.carrier, &body)
    }
}

const CONTEXT_BYTES: usize = 200;

/// Byte offset of a 1-based `line`/`column` position in `body`
fn byte_offset(body: &str, line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split('\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column).min(body.len())
}

/// Up to [`CONTEXT_BYTES`] either side of `offset`, on char boundaries
fn context_around(body: &str, offset: usize) -> &str {
    let mut start = offset.saturating_sub(CONTEXT_BYTES);
    while !body.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + CONTEXT_BYTES).min(body.len());
    while !body.is_char_boundary(end) {
        end += 1;
    }
    &body[start..end]
}

/// Deserialize a successful body, keeping context around the failure point
pub(crate) fn parse_json<T: DeserializeOwned>(carrier: Carrier, body: &str) -> Result<T> {
    serde_json::from_str::<T>(body).map_err(|e| {
        let context = context_around(body, byte_offset(body, e.line(), e.column()));

        CarrierError::deserialization(
            carrier,
            format!("{} at line {} col {}. Context: ...{}...", e, e.line(), e.column(), context),
            Some(body.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BearerAuthorizer, NoAuth, TokenCache, TokenGrant, TokenSource};
    use crate::http::transport::HttpResponse;
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StaticTransport {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl HttpTransport for StaticTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: i32,
    }

    fn client(status: u16, body: &str) -> (ApiClient, Arc<StaticTransport>) {
        let transport = Arc::new(StaticTransport {
            response: HttpResponse::new(status, body),
            seen: Mutex::new(Vec::new()),
        });
        let client = ApiClient::new(
            Carrier::Dhl,
            "https://api.example.test/v2/",
            transport.clone(),
            Arc::new(NoAuth),
        );
        (client, transport)
    }

    #[test]
    fn test_url_joins_base_and_query() {
        let (client, _) = client(200, "{}");
        let url = client
            .url("/orders", &[("profile", "STANDARD GRUPPENPROFIL".to_string())])
            .unwrap();
        assert_eq!(url, "https://api.example.test/v2/orders?profile=STANDARD+GRUPPENPROFIL");
    }

    #[tokio::test]
    async fn test_success_deserializes() {
        let (client, transport) = client(200, r#"{"value":7}"#);
        let echo: Echo = client.get("/echo", &[]).await.unwrap();
        assert_eq!(echo.value, 7);
        assert_eq!(transport.seen.lock().unwrap()[0].method, Method::GET);
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let (client, _) = client(400, r#"{"status":{"detail":"Invalid billing number."}}"#);
        let err = client.get::<Echo>("/orders", &[]).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("Invalid billing number."));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_deserialization_error() {
        let (client, _) = client(200, "  ");
        let err = client.get::<Echo>("/echo", &[]).await.unwrap_err();
        assert!(err.is_deserialization_error());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_parse_context_follows_error_line() {
        let body = format!("{{\"padding\": \"{}\",\n\"value\": oops}}", "A".repeat(600));
        let err = parse_json::<Echo>(Carrier::Dhl, &body).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("oops"), "{message}");
    }

    #[test]
    fn test_parse_context_respects_char_boundaries() {
        let body = format!("{{\"city\": \"{}\", \"value\": ?}}", "Köln ".repeat(80));
        let err = parse_json::<Echo>(Carrier::Dhl, &body).unwrap_err();
        assert!(err.to_string().contains("value"));
    }

    struct CountingSource(AtomicUsize);

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self) -> Result<TokenGrant> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenGrant {
                access_token: format!("token-{}", n),
                expires_in: 1800,
            })
        }
    }

    #[tokio::test]
    async fn test_unauthorized_drops_cached_token() {
        let source = Arc::new(CountingSource(AtomicUsize::new(0)));
        let cache = Arc::new(TokenCache::new(Carrier::Dhl, source.clone()));
        let transport = Arc::new(StaticTransport {
            response: HttpResponse::new(401, r#"{"detail":"Unauthorized"}"#),
            seen: Mutex::new(Vec::new()),
        });
        let client = ApiClient::new(
            Carrier::Dhl,
            "https://api.example.test/v2",
            transport.clone(),
            Arc::new(BearerAuthorizer::new(cache)),
        );

        for _ in 0..2 {
            let err = client.get::<Echo>("/orders", &[]).await.unwrap_err();
            assert_eq!(err.status_code(), Some(401));
        }

        assert_eq!(source.0.load(Ordering::SeqCst), 2);
        let seen = transport.seen.lock().unwrap();
        assert!(seen[1].headers.contains(&("Authorization".to_string(), "Bearer token-2".to_string())));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_deserialization_error() {
        let (client, _) = client(200, r#"{"other":true}"#);
        let err = client.get::<Echo>("/echo", &[]).await.unwrap_err();
        assert!(matches!(err, CarrierError::Deserialization { .. }));
        assert_eq!(err.response_body(), Some(r#"{"other":true}"#));
    }
}
