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


//! DHL Parcel DE Returns API (v1)
//!
//! `POST /orders?labelType=BOTH` creates a return shipment to a receiver
//! configured in the business customer portal and answers with a PDF
//! label and a QR code for label-free drop-off.

use super::common::{tracking_url, WireContactAddress, WireDocument, WireMoney, WireStatus, WireWeight};
use crate::auth::{BearerAuthorizer, TokenCache};
use crate::carriers::format::{decode_base64, non_blank};
use crate::config::DhlParcelConfig;
use crate::domain::{Label, LabelFormat, ReturnRequest, ShipmentResponse};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOrderRequest {
    pub receiver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_reference: Option<String>,
    pub shipper: WireContactAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_weight: Option<WireWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_value: Option<WireMoney>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOrderResponse {
    #[serde(default)]
    pub shipment_no: Option<String>,
    #[serde(default)]
    pub sstatus: Option<WireStatus>,
    #[serde(default)]
    pub label: Option<WireDocument>,
    #[serde(default)]
    pub qr_label: Option<WireDocument>,
}

pub fn build_return_order(request: &ReturnRequest) -> Result<ReturnOrderRequest> {
    let receiver_id = non_blank(&request.receiver_id)
        .ok_or_else(|| CarrierError::invalid_request("return receiver id is required"))?;
    request.shipper.validate()?;

    Ok(ReturnOrderRequest {
        receiver_id,
        customer_reference: request.customer_reference.as_deref().and_then(non_blank),
        shipment_reference: request.shipment_reference.as_deref().and_then(non_blank),
        shipper: WireContactAddress::from_address(&request.shipper),
        item_weight: request.weight.as_ref().map(WireWeight::from_weight),
        item_value: request.value.as_ref().map(WireMoney::from_money),
    })
}

pub fn map_return_response(response: &ReturnOrderResponse, raw_body: &str) -> Result<ShipmentResponse> {
    if let Some(status) = response.sstatus.as_ref().filter(|s| s.is_error()) {
        return Err(CarrierError::Api {
            carrier: Carrier::Dhl,
            status_code: status.status_code.unwrap_or_default(),
            error_code: status.title.clone(),
            detail: status.message(),
            response_body: raw_body.to_string(),
            endpoint: Some("/orders".to_string()),
        });
    }

    let shipment_number = response
        .shipment_no
        .as_deref()
        .and_then(non_blank)
        .ok_or_else(|| {
            CarrierError::deserialization(Carrier::Dhl, "return order has no shipmentNo", Some(raw_body.to_string()))
        })?;

    let mut labels = Vec::new();
    if let Some(label) = response.label.as_ref().map(WireDocument::to_label).transpose()?.flatten() {
        labels.push(label);
    }
    // the QR code is always a PNG, whatever fileFormat says
    if let Some(b64) = response.qr_label.as_ref().and_then(|doc| doc.b64.as_deref()).filter(|s| !s.is_empty()) {
        labels.push(Label {
            format: LabelFormat::Png,
            content: decode_base64(Carrier::Dhl, b64)?,
        });
    }

    if labels.is_empty() {
        return Err(CarrierError::empty(Carrier::Dhl, "return labels"));
    }

    Ok(ShipmentResponse {
        tracking_url: Some(tracking_url(&shipment_number)),
        shipment_number,
        labels,
    })
}

pub struct DhlReturnsClient {
    api: ApiClient,
}

impl DhlReturnsClient {
    pub fn new(config: &DhlParcelConfig, transport: Arc<dyn HttpTransport>, tokens: Arc<TokenCache>) -> Result<Self> {
        config.validate()?;
        let authorizer = BearerAuthorizer::new(tokens).with_api_key("dhl-api-key", config.client_id.clone());
        Ok(Self {
            api: ApiClient::new(Carrier::Dhl, config.returns_url.clone(), transport, Arc::new(authorizer)),
        })
    }

    pub async fn create_return(&self, request: &ReturnRequest) -> Result<ShipmentResponse> {
        let order = build_return_order(request)?;
        let raw: serde_json::Value = self
            .api
            .post("/orders", &[("labelType", "BOTH".to_string())], &order)
            .await?;
        let raw_body = raw.to_string();
        let response: ReturnOrderResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::Dhl, e.to_string(), Some(raw_body.clone()))
        })?;

        let result = map_return_response(&response, &raw_body)?;
        info!(shipment_number = %result.shipment_number, "DHL return label created");
        Ok(result)
    }
}
