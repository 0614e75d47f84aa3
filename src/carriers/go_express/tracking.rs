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


//! GO! Express tracking
//!
//! `GET /api/v1/tracking?hwbNumber=` answers with a list of tracking
//! items, each carrying the current status and its history.

use super::shipping::GoExpressClient;
use crate::carriers::format::{non_blank, parse_carrier_timestamp};
use crate::domain::tracking::format_location;
use crate::domain::{TrackingEvent, TrackingResult, TrackingStatus};
use crate::error::{Carrier, CarrierError, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoTrackingResponse {
    #[serde(default)]
    pub tracking_items: Vec<GoTrackingItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoTrackingItem {
    #[serde(default)]
    pub hwb_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub history: Vec<GoTrackingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoTrackingEntry {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// GO! status vocabulary to canonical status
pub fn map_status(code: &str) -> TrackingStatus {
    match code.trim().to_ascii_uppercase().as_str() {
        "ORDER_RECEIVED" => TrackingStatus::PreTransit,
        "PICKED_UP" | "IN_TRANSIT" => TrackingStatus::InTransit,
        "OUT_FOR_DELIVERY" => TrackingStatus::OutForDelivery,
        "DELIVERED" => TrackingStatus::Delivered,
        "NOT_DELIVERED" | "CANCELLED" => TrackingStatus::Exception,
        "RETURNED" => TrackingStatus::Returned,
        _ => TrackingStatus::Unknown,
    }
}

/// Map the first tracking item; an empty list is an error
pub fn map_tracking_response(response: &GoTrackingResponse, requested: &str) -> Result<TrackingResult> {
    let item = response
        .tracking_items
        .first()
        .ok_or_else(|| CarrierError::empty(Carrier::GoExpress, "tracking items"))?;

    let events = item
        .history
        .iter()
        .map(|entry| TrackingEvent {
            timestamp: entry.timestamp.as_deref().and_then(parse_carrier_timestamp),
            location: format_location(entry.city.as_deref(), entry.country.as_deref()),
            description: entry.description.clone().unwrap_or_default(),
            status_code: entry.status_code.clone(),
        })
        .collect();

    Ok(TrackingResult {
        shipment_number: item
            .hwb_number
            .as_deref()
            .and_then(non_blank)
            .unwrap_or_else(|| requested.to_string()),
        status: item.status.as_deref().map(map_status).unwrap_or_default(),
        estimated_delivery: item.estimated_delivery.as_deref().and_then(parse_carrier_timestamp),
        events,
    })
}

impl GoExpressClient {
    pub async fn track_shipment(&self, hwb_number: &str) -> Result<TrackingResult> {
        let hwb_number = hwb_number.trim();
        if hwb_number.is_empty() {
            return Err(CarrierError::invalid_request("HWB number is required"));
        }

        let response: GoTrackingResponse = self
            .api
            .get("/api/v1/tracking", &[("hwbNumber", hwb_number.to_string())])
            .await?;
        let result = map_tracking_response(&response, hwb_number)?;

        info!(hwb = hwb_number, status = %result.status, "GO! Express tracking retrieved");
        Ok(result)
    }
}
