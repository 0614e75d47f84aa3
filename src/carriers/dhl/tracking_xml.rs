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


//! DHL legacy XML tracking (Sendungsverfolgung)
//!
//! Both request and response are trees of generic `<data>` elements. The
//! role of a node is given by its `name` attribute:
//!
//! ```xml
//! <data name="pieceshipmentlist" code="0">
//!   <data name="piece-shipment" piece-code="00340434161094042557"
//!         delivery-event-flag="1" piece-status="5">
//!     <data name="piece-event-list">
//!       <data name="piece-event" event-timestamp="18.03.2016 10:02"
//!             event-location="Bonn" event-country="Deutschland"
//!             event-text="Die Sendung wurde zugestellt." standard-event-code="ZU"/>
//!     </data>
//!   </data>
//! </data>
//! ```
//!
//! Some response variants omit `name`, or use a direct child element
//! named `piece-event-list`/`piece-event` instead. Lookup tries the
//! `name` attribute first, then the element name, then position.

use crate::auth::{BasicAuthorizer, NoAuth, RequestAuthorizer};
use crate::carriers::format::parse_carrier_timestamp;
use crate::config::DhlTrackingConfig;
use crate::domain::tracking::format_location;
use crate::domain::{TrackingEvent, TrackingResult, TrackingStatus};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpRequest, HttpTransport};
use reqwest::Method;
use roxmltree::{Document, Node};
use std::sync::Arc;
use tracing::{debug, info};

const SHIPMENT: &str = "piece-shipment";
const EVENT_LIST: &str = "piece-event-list";
const EVENT: &str = "piece-event";

// ============================================================================
// NODE LOOKUP
// ============================================================================

fn data_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// `<data name="...">` or `<name>` children of `node`
fn named_children<'a, 'input>(node: Node<'a, 'input>, name: &'a str) -> impl Iterator<Item = Node<'a, 'input>> {
    data_children(node).filter(move |child| {
        child.attribute("name") == Some(name) || child.has_tag_name(name)
    })
}

/// First descendant playing role `name`, else the first unnamed
/// element child of `parent`
fn find_node<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    parent
        .descendants()
        .skip(1)
        .find(|node| node.is_element() && (node.attribute("name") == Some(name) || node.has_tag_name(name)))
        .or_else(|| data_children(parent).find(|child| child.attribute("name").is_none()))
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn code_of(node: Node<'_, '_>) -> Option<i64> {
    node.attribute("code").and_then(|code| code.trim().parse().ok())
}

/// First non-zero `code` on the root or its first element child
fn fault_node<'a, 'input>(doc: &'a Document<'input>) -> Option<(Node<'a, 'input>, i64)> {
    let root = doc.root_element();
    std::iter::once(root)
        .chain(data_children(root).take(1))
        .find_map(|node| code_of(node).filter(|code| *code != 0).map(|code| (node, code)))
}

// ============================================================================
// PARSER
// ============================================================================

/// Carrier error code of a response; 0 when the request succeeded
pub fn error_code(xml: &str) -> Result<i64> {
    let doc = Document::parse(xml)?;
    Ok(fault_node(&doc).map(|(_, code)| code).unwrap_or(0))
}

/// Error text accompanying a non-zero code
pub fn error_message(xml: &str) -> Result<Option<String>> {
    let doc = Document::parse(xml)?;
    Ok(fault_node(&doc).and_then(|(node, _)| attr(node, "error").or_else(|| attr(node, "error-message"))))
}

/// Numeric piece status to canonical status
///
/// "4" is the final delivery round, reported as out for delivery.
pub fn map_piece_status(code: &str) -> TrackingStatus {
    match code.trim() {
        "0" => TrackingStatus::PreTransit,
        "1" | "2" | "3" => TrackingStatus::InTransit,
        "4" => TrackingStatus::OutForDelivery,
        "5" => TrackingStatus::Delivered,
        "6" => TrackingStatus::Exception,
        "7" => TrackingStatus::Returned,
        _ => TrackingStatus::Unknown,
    }
}

fn resolve_status(shipment: Node<'_, '_>) -> TrackingStatus {
    if shipment.attribute("delivery-event-flag").map(str::trim) == Some("1") {
        return TrackingStatus::Delivered;
    }
    shipment
        .attribute("piece-status")
        .map(map_piece_status)
        .unwrap_or_default()
}

fn parse_event(node: Node<'_, '_>) -> TrackingEvent {
    let location = attr(node, "event-location");
    let country = attr(node, "event-country");

    TrackingEvent {
        timestamp: node.attribute("event-timestamp").and_then(parse_carrier_timestamp),
        location: format_location(location.as_deref(), country.as_deref()),
        description: attr(node, "event-text")
            .or_else(|| attr(node, "event-status"))
            .unwrap_or_default(),
        status_code: attr(node, "standard-event-code"),
    }
}

fn parse_events(shipment: Node<'_, '_>) -> Vec<TrackingEvent> {
    let Some(list) = find_node(shipment, EVENT_LIST) else {
        return Vec::new();
    };

    let named: Vec<Node<'_, '_>> = named_children(list, EVENT).collect();
    let events = if named.is_empty() {
        data_children(list).collect()
    } else {
        named
    };

    events.into_iter().map(parse_event).collect()
}

/// Parse a `d-get-piece-detail` response
///
/// A non-zero `code` yields [`CarrierError::CarrierFault`] without looking
/// at any events. Missing optional attributes degrade to `None` or
/// [`TrackingStatus::Unknown`].
pub fn parse_tracking_response(xml: &str) -> Result<TrackingResult> {
    let doc = Document::parse(xml)?;

    if let Some((node, code)) = fault_node(&doc) {
        return Err(CarrierError::CarrierFault {
            carrier: Carrier::Dhl,
            code,
            message: attr(node, "error").or_else(|| attr(node, "error-message")),
        });
    }

    let root = doc.root_element();
    let shipment = if root.attribute("name") == Some(SHIPMENT) {
        root
    } else {
        find_node(root, SHIPMENT).ok_or_else(|| CarrierError::empty(Carrier::Dhl, "piece-shipment"))?
    };

    let shipment_number = attr(shipment, "piece-code")
        .or_else(|| attr(shipment, "searched-piece-code"))
        .ok_or_else(|| {
            CarrierError::deserialization(Carrier::Dhl, "piece-shipment has no piece-code", Some(xml.to_string()))
        })?;

    Ok(TrackingResult {
        shipment_number,
        status: resolve_status(shipment),
        estimated_delivery: None,
        events: parse_events(shipment),
    })
}

// ============================================================================
// CLIENT
// ============================================================================

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The `<data>` request element, before URL encoding
pub fn build_request_xml(config: &DhlTrackingConfig, piece_code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><data appname="{}" language-code="{}" password="{}" piece-code="{}" request="d-get-piece-detail"/>"#,
        escape_attribute(&config.app_name),
        escape_attribute(&config.language_code),
        escape_attribute(&config.password),
        escape_attribute(piece_code),
    )
}

pub struct DhlTrackingClient {
    api: ApiClient,
    config: DhlTrackingConfig,
}

impl DhlTrackingClient {
    pub fn new(config: DhlTrackingConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let authorizer: Arc<dyn RequestAuthorizer> = match &config.gateway_credentials {
            Some((user, key)) => Arc::new(BasicAuthorizer::new(user, key)),
            None => Arc::new(NoAuth),
        };
        Ok(Self {
            api: ApiClient::new(Carrier::Dhl, config.endpoint_url.clone(), transport, authorizer),
            config,
        })
    }

    pub async fn track(&self, piece_code: &str) -> Result<TrackingResult> {
        let piece_code = piece_code.trim();
        if piece_code.is_empty() {
            return Err(CarrierError::invalid_request("piece code is required"));
        }

        let data = build_request_xml(&self.config, piece_code);
        let url = format!("{}?xml={}", self.api.base_url(), urlencoding::encode(&data));
        debug!(piece_code, "querying DHL XML tracking");

        let body = self
            .api
            .send_text(HttpRequest::new(Method::GET, url), "sendungsverfolgung")
            .await?;
        let result = parse_tracking_response(&body)?;

        info!(piece_code, status = %result.status, events = result.events.len(), "DHL tracking retrieved");
        Ok(result)
    }
}
