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


//! Error types for the carrier adapter layer
//!
//! Errors fall into four groups:
//!
//! - **Configuration** - missing credentials, invalid consignee variants,
//!   unsupported package counts. Raised before any network call.
//! - **Transport/API** - non-2xx carrier responses, carrier faults reported
//!   inside a successful body, network failures, token endpoint failures.
//! - **Deserialization** - a 2xx status with an empty or unreadable body.
//! - **Library** - automatic conversions from reqwest, serde_json, roxmltree
//!   and url errors.
//!
//! Nothing in this crate retries or swallows these errors.

use std::fmt;
use thiserror::Error;

/// Result type alias using our CarrierError type
pub type Result<T> = std::result::Result<T, CarrierError>;

/// Carrier a request was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Carrier {
    Dhl,
    GoExpress,
}

impl Carrier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dhl => "DHL",
            Self::GoExpress => "GO! Express",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the carrier adapter layer
#[derive(Error, Debug)]
pub enum CarrierError {
    // ===== Configuration Errors =====

    /// A required credential or setting is absent or blank
    #[error("{carrier} configuration is missing required field '{field}'")]
    MissingCredential {
        carrier: Carrier,
        field: String,
    },

    /// Configuration present but unusable (bad URL, bad timeout, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Consignee variant lacks a field its wire shape requires
    #[error("Invalid consignee: {reason}")]
    InvalidConsignee {
        reason: String,
    },

    /// Carrier supports a different number of packages per shipment
    #[error("{carrier} expects {expected} package(s) per shipment, got {actual}")]
    PackageCardinality {
        carrier: Carrier,
        expected: String,
        actual: usize,
    },

    /// Request data rejected locally
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ===== Transport/API Errors =====

    /// Carrier answered with a non-success status
    #[error("{carrier} API request failed with HTTP {status_code}: {detail}")]
    Api {
        carrier: Carrier,
        status_code: u16,
        /// Carrier-assigned error code, when the body carries one
        error_code: Option<String>,
        /// Best available human-readable detail
        detail: String,
        /// Raw response body for diagnostics
        response_body: String,
        /// Endpoint path that failed
        endpoint: Option<String>,
    },

    /// Carrier reported an error inside a successful response body
    #[error("{carrier} reported error code {code}: {}", .message.as_deref().unwrap_or("no message"))]
    CarrierFault {
        carrier: Carrier,
        code: i64,
        message: Option<String>,
    },

    /// Connection, DNS, TLS or timeout failure
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Whether this error might be transient
        is_transient: bool,
    },

    /// Token endpoint rejected the credentials or failed
    #[error("{carrier} authentication failed: {message}")]
    AuthenticationFailed {
        carrier: Carrier,
        message: String,
        status_code: Option<u16>,
    },

    /// Token endpoint returned an unusable lifetime or token
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    // ===== Deserialization Errors =====

    /// 2xx response whose body could not be read into the expected shape
    #[error("Failed to deserialize {carrier} response: {message}")]
    Deserialization {
        carrier: Carrier,
        message: String,
        response_body: Option<String>,
    },

    /// 2xx response with no items where at least one was expected
    #[error("{carrier} returned no {what}")]
    EmptyResponse {
        carrier: Carrier,
        what: String,
    },

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Malformed XML document
    #[error("XML parse error: {0}")]
    XmlError(#[from] roxmltree::Error),

    /// Malformed URL in configuration or request building
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),
}

// Helper methods for creating common errors
impl CarrierError {
    /// Create a MissingCredential error
    pub fn missing<S: Into<String>>(carrier: Carrier, field: S) -> Self {
        CarrierError::MissingCredential {
            carrier,
            field: field.into(),
        }
    }

    /// Create an InvalidConsignee error
    pub fn invalid_consignee<S: Into<String>>(reason: S) -> Self {
        CarrierError::InvalidConsignee {
            reason: reason.into(),
        }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        CarrierError::InvalidRequest(message.into())
    }

    /// Create a Deserialization error
    pub fn deserialization<S: Into<String>>(
        carrier: Carrier,
        message: S,
        response_body: Option<String>,
    ) -> Self {
        CarrierError::Deserialization {
            carrier,
            message: message.into(),
            response_body,
        }
    }

    /// Create an EmptyResponse error
    pub fn empty<S: Into<String>>(carrier: Carrier, what: S) -> Self {
        CarrierError::EmptyResponse {
            carrier,
            what: what.into(),
        }
    }

    /// Create a NetworkError
    pub fn network_error<S: Into<String>>(message: S, is_transient: bool) -> Self {
        CarrierError::Network {
            message: message.into(),
            is_transient,
        }
    }

    /// Raised before any network call
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CarrierError::MissingCredential { .. }
                | CarrierError::InvalidConfiguration(_)
                | CarrierError::InvalidConsignee { .. }
                | CarrierError::PackageCardinality { .. }
                | CarrierError::InvalidRequest(_)
        )
    }

    /// Carrier answered but refused the request
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            CarrierError::Api { .. }
                | CarrierError::CarrierFault { .. }
                | CarrierError::AuthenticationFailed { .. }
        )
    }

    /// 2xx status but the body was unusable
    pub fn is_deserialization_error(&self) -> bool {
        matches!(
            self,
            CarrierError::Deserialization { .. }
                | CarrierError::EmptyResponse { .. }
                | CarrierError::SerdeJsonError(_)
                | CarrierError::XmlError(_)
        )
    }

    /// HTTP status code, when one applies
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CarrierError::Api { status_code, .. } => Some(*status_code),
            CarrierError::AuthenticationFailed { status_code, .. } => *status_code,
            CarrierError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw carrier response body, when one was captured
    pub fn response_body(&self) -> Option<&str> {
        match self {
            CarrierError::Api { response_body, .. } => Some(response_body),
            CarrierError::Deserialization { response_body, .. } => response_body.as_deref(),
            _ => None,
        }
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            CarrierError::MissingCredential { carrier, field } => {
                format!("The {} integration is not configured: '{}' must be set.", carrier, field)
            }
            CarrierError::Api { carrier, status_code: 401 | 403, .. } => {
                format!("{} rejected the credentials. Please check the account settings.", carrier)
            }
            CarrierError::Api { carrier, status_code, detail, .. } => {
                format!("{} could not process the request (HTTP {}): {}", carrier, status_code, detail)
            }
            CarrierError::Network { .. } => {
                "The carrier could not be reached. Please check your connection.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
