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


//! Token endpoints of the authenticated DHL APIs
//!
//! - Parcel DE (Shipping, Pickup, Returns): resource owner password grant
//!   against `/account/auth/ropc/v1/token` with the app's client id and
//!   secret plus the business customer's portal login.
//! - Internetmarke: its own `/user` endpoint with a client credentials
//!   style form that additionally carries the Portokasse login.

use super::token_cache::{TokenGrant, TokenSource};
use crate::config::{DhlParcelConfig, InternetmarkeConfig};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::error_detail::extract_detail;
use crate::http::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Whole seconds of a fractional `expires_in`, if it fits in an `i64`
fn float_seconds(value: f64) -> Option<i64> {
    let seconds = value.trunc();
    (seconds.is_finite() && seconds >= i64::MIN as f64 && seconds < i64::MAX as f64).then(|| seconds as i64)
}

/// Read `access_token` and `expires_in` from a token endpoint body
///
/// `expires_in` is accepted as a JSON number or numeric string; anything
/// else is an [`CarrierError::InvalidTokenResponse`].
pub fn parse_token_grant(body: &str) -> Result<TokenGrant> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        CarrierError::InvalidTokenResponse(format!("token response is not JSON: {}", e))
    })?;

    let access_token = json
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| CarrierError::InvalidTokenResponse("missing access_token".to_string()))?
        .to_string();

    let expires_in = match json.get("expires_in") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(float_seconds)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        CarrierError::InvalidTokenResponse(format!(
            "missing or malformed expires_in: {}",
            json.get("expires_in").map(Value::to_string).unwrap_or_default()
        ))
    })?;

    Ok(TokenGrant { access_token, expires_in })
}

async fn request_token(
    transport: &dyn HttpTransport,
    carrier: Carrier,
    url: &str,
    form: Vec<(String, String)>,
) -> Result<TokenGrant> {
    debug!(%carrier, url, "requesting access token");

    let request = HttpRequest::new(Method::POST, url).form(form);
    let response = transport.send(request).await?;

    if !response.is_success() {
        return Err(CarrierError::AuthenticationFailed {
            carrier,
            message: format!(
                "token endpoint returned HTTP {}: {}",
                response.status,
                extract_detail(&response.body)
            ),
            status_code: Some(response.status),
        });
    }

    parse_token_grant(&response.body)
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Password grant for the Parcel DE API family
pub struct DhlPasswordGrant {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
}

impl DhlPasswordGrant {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &DhlParcelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl TokenSource for DhlPasswordGrant {
    async fn fetch_token(&self) -> Result<TokenGrant> {
        let form = vec![
            pair("grant_type", "password"),
            pair("username", &self.username),
            pair("password", &self.password),
            pair("client_id", &self.client_id),
            pair("client_secret", &self.client_secret),
        ];
        request_token(self.transport.as_ref(), Carrier::Dhl, &self.token_url, form).await
    }
}

/// Client credentials style grant for Internetmarke
pub struct InternetmarkeGrant {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
}

impl InternetmarkeGrant {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &InternetmarkeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            token_url: format!("{}/user", config.base_url.trim_end_matches('/')),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl TokenSource for InternetmarkeGrant {
    async fn fetch_token(&self) -> Result<TokenGrant> {
        let form = vec![
            pair("grant_type", "client_credentials"),
            pair("client_id", &self.client_id),
            pair("client_secret", &self.client_secret),
            pair("username", &self.username),
            pair("password", &self.password),
        ];
        request_token(self.transport.as_ref(), Carrier::Dhl, &self.token_url, form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::{HttpResponse, RequestBody};
    use std::sync::Mutex;

    struct CannedTransport {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse::new(status, body),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn parcel_config() -> DhlParcelConfig {
        DhlParcelConfig::builder()
            .client_id("app-key")
            .client_secret("app-secret")
            .username("user-valid")
            .password("SandboxPasswort2023!")
            .build()
            .unwrap()
    }

    fn form_value<'a>(request: &'a HttpRequest, key: &str) -> Option<&'a str> {
        match &request.body {
            Some(RequestBody::Form(fields)) => fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_parse_token_grant_variants() {
        let grant = parse_token_grant(r#"{"access_token":"abc","token_type":"Bearer","expires_in":1799}"#).unwrap();
        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.expires_in, 1799);

        let grant = parse_token_grant(r#"{"access_token":"abc","expires_in":"3600"}"#).unwrap();
        assert_eq!(grant.expires_in, 3600);
    }

    #[test]
    fn test_parse_token_grant_rejects_malformed() {
        assert!(parse_token_grant(r#"{"access_token":"abc","expires_in":"soon"}"#).is_err());
        assert!(parse_token_grant(r#"{"access_token":"abc"}"#).is_err());
        assert!(parse_token_grant(r#"{"expires_in":60}"#).is_err());
        assert!(parse_token_grant("<html/>").is_err());
    }

    #[test]
    fn test_parse_token_grant_float_expires_in() {
        let grant = parse_token_grant(r#"{"access_token":"abc","expires_in":3600.5}"#).unwrap();
        assert_eq!(grant.expires_in, 3600);

        let err = parse_token_grant(r#"{"access_token":"abc","expires_in":1e300}"#).unwrap_err();
        assert!(matches!(err, CarrierError::InvalidTokenResponse(_)));
    }

    #[tokio::test]
    async fn test_password_grant_form() {
        let transport = CannedTransport::new(200, r#"{"access_token":"tok","expires_in":1799}"#);
        let grant = DhlPasswordGrant::new(transport.clone(), &parcel_config()).unwrap();

        let token = grant.fetch_token().await.unwrap();
        assert_eq!(token.access_token, "tok");

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://api-sandbox.dhl.com/parcel/de/account/auth/ropc/v1/token");
        assert_eq!(form_value(request, "grant_type"), Some("password"));
        assert_eq!(form_value(request, "username"), Some("user-valid"));
        assert_eq!(form_value(request, "client_secret"), Some("app-secret"));
    }

    #[tokio::test]
    async fn test_internetmarke_grant_uses_user_endpoint() {
        let transport = CannedTransport::new(200, r#"{"access_token":"im","expires_in":86399,"walletBalance":1000}"#);
        let config = InternetmarkeConfig::new("cid", "csecret", "portokasse@example.com", "pw");
        let grant = InternetmarkeGrant::new(transport.clone(), &config).unwrap();

        assert_eq!(grant.fetch_token().await.unwrap().expires_in, 86399);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://api-eu.dhl.com/post/de/shipping/im/v1/user");
        assert_eq!(form_value(&seen[0], "grant_type"), Some("client_credentials"));
        assert_eq!(form_value(&seen[0], "username"), Some("portokasse@example.com"));
    }

    #[tokio::test]
    async fn test_token_endpoint_error_reports_status_and_body() {
        let transport = CannedTransport::new(401, r#"{"detail":"Invalid client credentials"}"#);
        let grant = DhlPasswordGrant::new(transport, &parcel_config()).unwrap();

        let err = grant.fetch_token().await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid client credentials"));
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let mut config = parcel_config();
        config.client_secret = String::new();
        let transport = CannedTransport::new(200, "{}");
        let err = DhlPasswordGrant::new(transport, &config).err().unwrap();
        assert!(err.is_configuration_error());
    }
}
