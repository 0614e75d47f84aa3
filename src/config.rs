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


//! Carrier credentials and endpoints
//!
//! Each carrier API family has its own config struct. All of them can be
//! built in code or loaded from environment variables, and all of them
//! fail fast with [`CarrierError::MissingCredential`] when a required value
//! is absent or blank.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `DHL_PARCEL_BASE_URL` | no | DHL sandbox |
//! | `DHL_CLIENT_ID`, `DHL_CLIENT_SECRET` | yes | |
//! | `DHL_USERNAME`, `DHL_PASSWORD` | yes | |
//! | `DHL_TIMEOUT_SECS` | no | 30 |
//! | `INTERNETMARKE_BASE_URL` | no | production |
//! | `INTERNETMARKE_CLIENT_ID`, `INTERNETMARKE_CLIENT_SECRET` | yes | |
//! | `INTERNETMARKE_USERNAME`, `INTERNETMARKE_PASSWORD` | yes | |
//! | `DHL_TRACKING_URL` | no | production |
//! | `DHL_TRACKING_APP_NAME`, `DHL_TRACKING_PASSWORD` | yes | |
//! | `DHL_TRACKING_LANGUAGE` | no | `de` |
//! | `DHL_TRACKING_GATEWAY_USER`, `DHL_TRACKING_GATEWAY_KEY` | no | |
//! | `DHL_LOCATION_FINDER_URL` | no | production |
//! | `DHL_LOCATION_FINDER_API_KEY` | yes | |
//! | `GO_EXPRESS_BASE_URL` | no | test system |
//! | `GO_EXPRESS_USERNAME`, `GO_EXPRESS_PASSWORD` | yes | |
//! | `GO_EXPRESS_RESPONSIBLE_STATION`, `GO_EXPRESS_CUSTOMER_ID` | yes | |

use crate::error::{Carrier, CarrierError, Result};
use crate::http::transport::DEFAULT_TIMEOUT_SECS;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DHL_PARCEL_SANDBOX_URL: &str = "https://api-sandbox.dhl.com/parcel/de";
pub const DHL_PARCEL_PRODUCTION_URL: &str = "https://api-eu.dhl.com/parcel/de";
pub const INTERNETMARKE_URL: &str = "https://api-eu.dhl.com/post/de/shipping/im/v1";
pub const DHL_TRACKING_URL: &str = "https://cig.dhl.de/services/production/rest/sendungsverfolgung";
pub const DHL_LOCATION_FINDER_URL: &str = "https://api.dhl.com/location-finder/v1";
pub const GO_EXPRESS_TEST_URL: &str = "https://ws-tst.api.general-overnight.com/external/ci";

/// Mask a secret for display: first and last two characters survive
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "[empty]".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 4), tail)
}

fn require(carrier: Carrier, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CarrierError::missing(carrier, field));
    }
    Ok(())
}

fn require_url(carrier: Carrier, field: &str, value: &str) -> Result<()> {
    require(carrier, field, value)?;
    Url::parse(value).map_err(|e| {
        CarrierError::InvalidConfiguration(format!("{} '{}' is not a valid URL: {}", field, value, e))
    })?;
    Ok(())
}

/// Variable lookup used by the `from_lookup` loaders
struct Vars<F: Fn(&str) -> Option<String>> {
    carrier: Carrier,
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn required(&self, name: &str) -> Result<String> {
        match (self.lookup)(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(CarrierError::missing(self.carrier, name)),
        }
    }

    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ============================================================================
// DHL Parcel DE (Shipping, Pickup, Returns)
// ============================================================================

/// DHL Parcel DE family: one OAuth credential set shared by Shipping,
/// Pickup and Returns
#[derive(Clone)]
pub struct DhlParcelConfig {
    pub shipping_url: String,
    pub pickup_url: String,
    pub returns_url: String,
    pub token_url: String,
    /// API key of the developer app, also sent as `dhl-api-key`
    pub client_id: String,
    pub client_secret: String,
    /// Business customer portal user
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for DhlParcelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhlParcelConfig")
            .field("shipping_url", &self.shipping_url)
            .field("pickup_url", &self.pickup_url)
            .field("returns_url", &self.returns_url)
            .field("token_url", &self.token_url)
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DhlParcelConfig {
    pub fn builder() -> DhlParcelConfigBuilder {
        DhlParcelConfigBuilder::new()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let vars = Vars { carrier: Carrier::Dhl, lookup };

        let mut builder = Self::builder()
            .base_url(vars.or("DHL_PARCEL_BASE_URL", DHL_PARCEL_SANDBOX_URL))
            .client_id(vars.required("DHL_CLIENT_ID")?)
            .client_secret(vars.required("DHL_CLIENT_SECRET")?)
            .username(vars.required("DHL_USERNAME")?)
            .password(vars.required("DHL_PASSWORD")?);

        if let Some(secs) = vars.optional("DHL_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                CarrierError::InvalidConfiguration(format!("DHL_TIMEOUT_SECS '{}' is not a number", secs))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        require_url(Carrier::Dhl, "shipping_url", &self.shipping_url)?;
        require_url(Carrier::Dhl, "pickup_url", &self.pickup_url)?;
        require_url(Carrier::Dhl, "returns_url", &self.returns_url)?;
        require_url(Carrier::Dhl, "token_url", &self.token_url)?;
        require(Carrier::Dhl, "client_id", &self.client_id)?;
        require(Carrier::Dhl, "client_secret", &self.client_secret)?;
        require(Carrier::Dhl, "username", &self.username)?;
        require(Carrier::Dhl, "password", &self.password)?;
        if self.timeout.is_zero() {
            return Err(CarrierError::InvalidConfiguration("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for DhlParcelConfig
#[derive(Debug)]
pub struct DhlParcelConfigBuilder {
    config: DhlParcelConfig,
}

impl DhlParcelConfigBuilder {
    pub fn new() -> Self {
        let builder = Self {
            config: DhlParcelConfig {
                shipping_url: String::new(),
                pickup_url: String::new(),
                returns_url: String::new(),
                token_url: String::new(),
                client_id: String::new(),
                client_secret: String::new(),
                username: String::new(),
                password: String::new(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
        };
        builder.base_url(DHL_PARCEL_SANDBOX_URL)
    }

    /// Derive all four endpoints from the Parcel DE gateway root
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        self.config.shipping_url = format!("{}/shipping/v2", base);
        self.config.pickup_url = format!("{}/transportation/pickup/v3", base);
        self.config.returns_url = format!("{}/shipping/returns/v1", base);
        self.config.token_url = format!("{}/account/auth/ropc/v1/token", base);
        self
    }

    pub fn shipping_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.shipping_url = url.into();
        self
    }

    pub fn token_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.token_url = url.into();
        self
    }

    pub fn client_id<S: Into<String>>(mut self, client_id: S) -> Self {
        self.config.client_id = client_id.into();
        self
    }

    pub fn client_secret<S: Into<String>>(mut self, client_secret: S) -> Self {
        self.config.client_secret = client_secret.into();
        self
    }

    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DhlParcelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for DhlParcelConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DHL Internetmarke
// ============================================================================

#[derive(Clone)]
pub struct InternetmarkeConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Portokasse user
    pub username: String,
    pub password: String,
}

impl fmt::Debug for InternetmarkeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternetmarkeConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .finish()
    }
}

impl InternetmarkeConfig {
    pub fn new<S: Into<String>>(client_id: S, client_secret: S, username: S, password: S) -> Self {
        Self {
            base_url: INTERNETMARKE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let vars = Vars { carrier: Carrier::Dhl, lookup };
        let config = Self {
            base_url: vars.or("INTERNETMARKE_BASE_URL", INTERNETMARKE_URL),
            client_id: vars.required("INTERNETMARKE_CLIENT_ID")?,
            client_secret: vars.required("INTERNETMARKE_CLIENT_SECRET")?,
            username: vars.required("INTERNETMARKE_USERNAME")?,
            password: vars.required("INTERNETMARKE_PASSWORD")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require_url(Carrier::Dhl, "base_url", &self.base_url)?;
        require(Carrier::Dhl, "client_id", &self.client_id)?;
        require(Carrier::Dhl, "client_secret", &self.client_secret)?;
        require(Carrier::Dhl, "username", &self.username)?;
        require(Carrier::Dhl, "password", &self.password)
    }
}

// ============================================================================
// DHL legacy XML tracking
// ============================================================================

#[derive(Clone)]
pub struct DhlTrackingConfig {
    pub endpoint_url: String,
    /// ZT token name embedded as the `appname` attribute
    pub app_name: String,
    pub password: String,
    pub language_code: String,
    /// Developer portal credentials for the gateway's basic auth
    pub gateway_credentials: Option<(String, String)>,
}

impl fmt::Debug for DhlTrackingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhlTrackingConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("app_name", &self.app_name)
            .field("password", &mask(&self.password))
            .field("language_code", &self.language_code)
            .field("gateway_user", &self.gateway_credentials.as_ref().map(|(user, _)| user))
            .finish()
    }
}

impl DhlTrackingConfig {
    pub fn new<S: Into<String>>(app_name: S, password: S) -> Self {
        Self {
            endpoint_url: DHL_TRACKING_URL.to_string(),
            app_name: app_name.into(),
            password: password.into(),
            language_code: "de".to_string(),
            gateway_credentials: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let vars = Vars { carrier: Carrier::Dhl, lookup };
        let gateway_credentials = match (
            vars.optional("DHL_TRACKING_GATEWAY_USER"),
            vars.optional("DHL_TRACKING_GATEWAY_KEY"),
        ) {
            (Some(user), Some(key)) => Some((user, key)),
            (None, None) => None,
            (Some(_), None) => return Err(CarrierError::missing(Carrier::Dhl, "DHL_TRACKING_GATEWAY_KEY")),
            (None, Some(_)) => return Err(CarrierError::missing(Carrier::Dhl, "DHL_TRACKING_GATEWAY_USER")),
        };

        let config = Self {
            endpoint_url: vars.or("DHL_TRACKING_URL", DHL_TRACKING_URL),
            app_name: vars.required("DHL_TRACKING_APP_NAME")?,
            password: vars.required("DHL_TRACKING_PASSWORD")?,
            language_code: vars.or("DHL_TRACKING_LANGUAGE", "de"),
            gateway_credentials,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require_url(Carrier::Dhl, "endpoint_url", &self.endpoint_url)?;
        require(Carrier::Dhl, "app_name", &self.app_name)?;
        require(Carrier::Dhl, "password", &self.password)?;
        require(Carrier::Dhl, "language_code", &self.language_code)
    }
}

// ============================================================================
// DHL Location Finder
// ============================================================================

#[derive(Clone)]
pub struct LocationFinderConfig {
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for LocationFinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationFinderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask(&self.api_key))
            .finish()
    }
}

impl LocationFinderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            base_url: DHL_LOCATION_FINDER_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let vars = Vars { carrier: Carrier::Dhl, lookup };
        let config = Self {
            base_url: vars.or("DHL_LOCATION_FINDER_URL", DHL_LOCATION_FINDER_URL),
            api_key: vars.required("DHL_LOCATION_FINDER_API_KEY")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require_url(Carrier::Dhl, "base_url", &self.base_url)?;
        require(Carrier::Dhl, "api_key", &self.api_key)
    }
}

// ============================================================================
// GO! Express
// ============================================================================

#[derive(Clone)]
pub struct GoExpressConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// GO! station handling the customer's account, e.g. "FRA"
    pub responsible_station: String,
    pub customer_id: String,
}

impl fmt::Debug for GoExpressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoExpressConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("responsible_station", &self.responsible_station)
            .field("customer_id", &self.customer_id)
            .finish()
    }
}

impl GoExpressConfig {
    pub fn new<S: Into<String>>(username: S, password: S, responsible_station: S, customer_id: S) -> Self {
        Self {
            base_url: GO_EXPRESS_TEST_URL.to_string(),
            username: username.into(),
            password: password.into(),
            responsible_station: responsible_station.into(),
            customer_id: customer_id.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let vars = Vars { carrier: Carrier::GoExpress, lookup };
        let config = Self {
            base_url: vars.or("GO_EXPRESS_BASE_URL", GO_EXPRESS_TEST_URL),
            username: vars.required("GO_EXPRESS_USERNAME")?,
            password: vars.required("GO_EXPRESS_PASSWORD")?,
            responsible_station: vars.required("GO_EXPRESS_RESPONSIBLE_STATION")?,
            customer_id: vars.required("GO_EXPRESS_CUSTOMER_ID")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require_url(Carrier::GoExpress, "base_url", &self.base_url)?;
        require(Carrier::GoExpress, "username", &self.username)?;
        require(Carrier::GoExpress, "password", &self.password)?;
        require(Carrier::GoExpress, "responsible_station", &self.responsible_station)?;
        require(Carrier::GoExpress, "customer_id", &self.customer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(""), "[empty]");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("secret-value"), "se********ue");
    }

    #[test]
    fn test_dhl_parcel_from_lookup() {
        let config = DhlParcelConfig::from_lookup(lookup(&[
            ("DHL_CLIENT_ID", "app-key"),
            ("DHL_CLIENT_SECRET", "app-secret"),
            ("DHL_USERNAME", "user-valid"),
            ("DHL_PASSWORD", "SandboxPasswort2023!"),
            ("DHL_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();

        assert_eq!(config.shipping_url, "https://api-sandbox.dhl.com/parcel/de/shipping/v2");
        assert_eq!(config.token_url, "https://api-sandbox.dhl.com/parcel/de/account/auth/ropc/v1/token");
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_dhl_parcel_missing_password() {
        let err = DhlParcelConfig::from_lookup(lookup(&[
            ("DHL_CLIENT_ID", "app-key"),
            ("DHL_CLIENT_SECRET", "app-secret"),
            ("DHL_USERNAME", "user-valid"),
            ("DHL_PASSWORD", "   "),
        ]))
        .unwrap_err();

        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("DHL_PASSWORD"));
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = DhlParcelConfig::builder()
            .base_url("not a url")
            .client_id("a")
            .client_secret("b")
            .username("c")
            .password("d")
            .build()
            .unwrap_err();
        assert!(matches!(err, CarrierError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = GoExpressConfig::new("customer", "topsecret99", "FRA", "1234567");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret99"));
        assert!(debug.contains("to*******99"));
    }

    #[test]
    fn test_tracking_gateway_credentials_must_pair() {
        let err = DhlTrackingConfig::from_lookup(lookup(&[
            ("DHL_TRACKING_APP_NAME", "zt12345"),
            ("DHL_TRACKING_PASSWORD", "geheim"),
            ("DHL_TRACKING_GATEWAY_USER", "dev-id"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DHL_TRACKING_GATEWAY_KEY"));

        let config = DhlTrackingConfig::from_lookup(lookup(&[
            ("DHL_TRACKING_APP_NAME", "zt12345"),
            ("DHL_TRACKING_PASSWORD", "geheim"),
        ]))
        .unwrap();
        assert_eq!(config.language_code, "de");
        assert!(config.gateway_credentials.is_none());
    }

    #[test]
    fn test_go_express_requires_station() {
        let err = GoExpressConfig::from_lookup(lookup(&[
            ("GO_EXPRESS_USERNAME", "user"),
            ("GO_EXPRESS_PASSWORD", "pass"),
            ("GO_EXPRESS_CUSTOMER_ID", "42"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            CarrierError::MissingCredential { carrier: Carrier::GoExpress, .. }
        ));
    }
}
