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


//! Human-readable detail from carrier error bodies
//!
//! Carrier error payloads are not uniform. DHL nests the message under
//! `status.detail`, other APIs put `detail` at the top level, and some
//! gateways answer with plain text or HTML. Extraction never fails; the
//! raw body is the last resort.

use crate::error::{Carrier, CarrierError};
use serde_json::Value;
use tracing::warn;

/// Best available message for an error body
pub fn extract_detail(raw_body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(raw_body) else {
        return raw_body.to_string();
    };

    json.pointer("/status/detail")
        .and_then(non_empty_str)
        .or_else(|| json.get("detail").and_then(non_empty_str))
        .map(str::to_string)
        .unwrap_or_else(|| raw_body.to_string())
}

/// Carrier-assigned error code, if the body carries one
///
/// Looks at `status.statusCode`, then `status.title`, then top-level
/// `code`/`errorCode`. Numbers are rendered as decimal strings.
pub fn extract_error_code(raw_body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(raw_body).ok()?;

    ["/status/statusCode", "/status/title", "/code", "/errorCode"]
        .iter()
        .filter_map(|pointer| json.pointer(pointer))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Build the API error for a non-success response
pub fn api_error(carrier: Carrier, status_code: u16, raw_body: &str, endpoint: Option<&str>) -> CarrierError {
    let detail = extract_detail(raw_body);
    warn!(%carrier, status_code, endpoint, %detail, "carrier request failed");

    CarrierError::Api {
        carrier,
        status_code,
        error_code: extract_error_code(raw_body),
        detail,
        response_body: raw_body.to_string(),
        endpoint: endpoint.map(str::to_string),
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_status_detail() {
        let body = r#"{"status":{"title":"Bad Request","statusCode":400,"detail":"Invalid billing number."}}"#;
        assert_eq!(extract_detail(body), "Invalid billing number.");
        assert_eq!(extract_error_code(body).as_deref(), Some("400"));
    }

    #[test]
    fn test_top_level_detail() {
        let body = r#"{"title":"Unauthorized","detail":"Unauthorized for given resource."}"#;
        assert_eq!(extract_detail(body), "Unauthorized for given resource.");
        assert_eq!(extract_error_code(body), None);
    }

    #[test]
    fn test_nested_detail_wins_over_top_level() {
        let body = r#"{"status":{"detail":"nested"},"detail":"top"}"#;
        assert_eq!(extract_detail(body), "nested");
    }

    #[test]
    fn test_falls_back_to_raw_body() {
        assert_eq!(extract_detail("<html>502 Bad Gateway</html>"), "<html>502 Bad Gateway</html>");
        assert_eq!(extract_detail(r#"{"message":"nope"}"#), r#"{"message":"nope"}"#);
        assert_eq!(extract_detail(r#"{"detail":""}"#), r#"{"detail":""}"#);
        assert_eq!(extract_detail(""), "");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"status":{"detail":"Invalid billing number."}}"#;
        let err = api_error(Carrier::Dhl, 400, body, Some("/orders"));
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("Invalid billing number."));
        assert_eq!(err.response_body(), Some(body));
    }
}
