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


//! DHL Parcel DE Pickup API (v3)
//!
//! # Endpoints
//! - `POST /orders` - order a courier pickup
//! - `DELETE /orders?orderID=` - cancel a pickup order
//!
//! `pickupLocation` is either an inline address (`"type": "Address"`) or a
//! registered location id (`"type": "Id"`). `pickupDate` is either a
//! concrete date (`"type": "Date"`) or the next possible slot
//! (`"type": "ASAP"`).

use super::common::{WireContactAddress, WireStatus, WireWeight};
use crate::auth::{BearerAuthorizer, TokenCache};
use crate::carriers::format::{iso_date, non_blank, parse_carrier_date};
use crate::config::DhlParcelConfig;
use crate::domain::{PickupCancellation, PickupConfirmation, PickupDate, PickupLocation, PickupRequest};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// WIRE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupOrderRequest {
    pub customer_details: CustomerDetails,
    pub pickup_location: WirePickupLocation,
    pub pickup_details: WirePickupDetails,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact_person: Vec<WireContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_details: Option<WireShipmentDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub billing_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WirePickupLocation {
    #[serde(rename = "Address", rename_all = "camelCase")]
    Address { pickup_address: WireContactAddress },
    #[serde(rename = "Id", rename_all = "camelCase")]
    Id { as_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WirePickupDate {
    #[serde(rename = "Date")]
    Date { value: String },
    #[serde(rename = "ASAP")]
    Asap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePickupDetails {
    pub pickup_date: WirePickupDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<WireWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_notification: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireShipmentDetails {
    pub shipments: Vec<WirePickupShipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePickupShipment {
    pub transportation_type: String,
    pub shipment_no: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupOrderResponse {
    #[serde(default)]
    pub confirmation: Option<WireConfirmation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireConfirmation {
    #[serde(default)]
    pub value: Option<WireConfirmationValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConfirmationValue {
    #[serde(rename = "orderID", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub free_of_charge: bool,
    #[serde(default)]
    pub confirmed_shipments: Vec<WireConfirmedShipment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConfirmedShipment {
    #[serde(default)]
    pub shipment_no: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPickupResponse {
    #[serde(default)]
    pub confirmed_cancellations: Vec<WireCancellation>,
    #[serde(default)]
    pub failed_cancellations: Vec<WireCancellation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCancellation {
    #[serde(rename = "orderID", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<WireStatus>,
}

// ============================================================================
// MAPPING
// ============================================================================

pub fn build_pickup_order(request: &PickupRequest) -> Result<PickupOrderRequest> {
    if request.billing_number.trim().is_empty() {
        return Err(CarrierError::invalid_request("billing number is required"));
    }

    let pickup_location = match &request.location {
        PickupLocation::Address(address) => {
            address.validate()?;
            WirePickupLocation::Address {
                pickup_address: WireContactAddress::from_address(address),
            }
        }
        PickupLocation::Id(id) => WirePickupLocation::Id {
            as_id: non_blank(id).ok_or_else(|| CarrierError::invalid_request("pickup location id is empty"))?,
        },
    };

    let pickup_date = match request.date {
        PickupDate::Date(date) => WirePickupDate::Date { value: iso_date(date) },
        PickupDate::Asap => WirePickupDate::Asap,
    };

    let shipments: Vec<WirePickupShipment> = request
        .shipment_numbers
        .iter()
        .filter_map(|number| non_blank(number))
        .map(|shipment_no| WirePickupShipment {
            transportation_type: "PAKET".to_string(),
            shipment_no,
        })
        .collect();

    Ok(PickupOrderRequest {
        customer_details: CustomerDetails {
            billing_number: request.billing_number.clone(),
        },
        pickup_location,
        pickup_details: WirePickupDetails {
            pickup_date,
            total_weight: request.total_weight.as_ref().map(WireWeight::from_weight),
            comment: request.comment.as_deref().and_then(non_blank),
        },
        contact_person: request
            .contacts
            .iter()
            .map(|contact| WireContact {
                name: contact.name.clone(),
                phone: contact.phone.clone(),
                email: contact.email.clone(),
                email_notification: contact.email_notification,
            })
            .collect(),
        shipment_details: (!shipments.is_empty()).then_some(WireShipmentDetails { shipments }),
    })
}

pub fn map_pickup_response(response: &PickupOrderResponse, raw_body: &str) -> Result<PickupConfirmation> {
    let value = response
        .confirmation
        .as_ref()
        .and_then(|c| c.value.as_ref())
        .ok_or_else(|| CarrierError::empty(Carrier::Dhl, "pickup confirmation"))?;

    let order_id = value
        .order_id
        .as_deref()
        .and_then(non_blank)
        .ok_or_else(|| {
            CarrierError::deserialization(Carrier::Dhl, "pickup confirmation has no orderID", Some(raw_body.to_string()))
        })?;

    Ok(PickupConfirmation {
        order_id,
        pickup_date: value.pickup_date.as_deref().and_then(parse_carrier_date),
        free_of_charge: value.free_of_charge,
        confirmed_shipments: value
            .confirmed_shipments
            .iter()
            .filter_map(|s| s.shipment_no.clone())
            .collect(),
    })
}

fn map_cancellation(response: &CancelPickupResponse, order_id: &str) -> PickupCancellation {
    let matches = |c: &&WireCancellation| c.order_id.as_deref().map_or(true, |id| id == order_id);

    if response.confirmed_cancellations.iter().any(|c| matches(&c)) {
        return PickupCancellation {
            order_id: order_id.to_string(),
            cancelled: true,
            message: None,
        };
    }

    let message = response
        .failed_cancellations
        .iter()
        .find(matches)
        .and_then(|c| c.message.clone().or_else(|| c.status.as_ref().map(WireStatus::message)));

    PickupCancellation {
        order_id: order_id.to_string(),
        cancelled: false,
        message,
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct DhlPickupClient {
    api: ApiClient,
}

impl DhlPickupClient {
    pub fn new(config: &DhlParcelConfig, transport: Arc<dyn HttpTransport>, tokens: Arc<TokenCache>) -> Result<Self> {
        config.validate()?;
        let authorizer = BearerAuthorizer::new(tokens).with_api_key("dhl-api-key", config.client_id.clone());
        Ok(Self {
            api: ApiClient::new(Carrier::Dhl, config.pickup_url.clone(), transport, Arc::new(authorizer)),
        })
    }

    pub async fn create_pickup(&self, request: &PickupRequest) -> Result<PickupConfirmation> {
        let order = build_pickup_order(request)?;
        let raw: serde_json::Value = self.api.post("/orders", &[], &order).await?;
        let raw_body = raw.to_string();
        let response: PickupOrderResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::Dhl, e.to_string(), Some(raw_body.clone()))
        })?;

        let confirmation = map_pickup_response(&response, &raw_body)?;
        info!(order_id = %confirmation.order_id, "DHL pickup ordered");
        Ok(confirmation)
    }

    pub async fn cancel_pickup(&self, order_id: &str) -> Result<PickupCancellation> {
        let response: CancelPickupResponse = self
            .api
            .delete("/orders", &[("orderID", order_id.to_string())])
            .await?;

        let cancellation = map_cancellation(&response, order_id);
        info!(order_id, cancelled = cancellation.cancelled, "DHL pickup cancellation processed");
        Ok(cancellation)
    }
}
