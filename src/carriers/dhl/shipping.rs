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


//! DHL Parcel DE Shipping API (v2)
//!
//! # Endpoints
//! - `POST /orders` - create shipments, labels returned inline
//! - `DELETE /orders?profile=&shipment=` - cancel a shipment
//!
//! # Request shape
//! ```json
//! {
//!   "profile": "STANDARD_GRUPPENPROFIL",
//!   "shipments": [{
//!     "product": "V01PAK", "billingNumber": "33333333330102",
//!     "shipper": { ... }, "consignee": { ... },
//!     "details": { "dim": { "uom": "cm", ... }, "weight": { "uom": "kg", "value": 2.5 } },
//!     "services": { ... }, "customs": { ... }
//!   }]
//! }
//! ```
//!
//! The consignee takes one of four shapes (contact address, locker, post
//! office, PO box). Each shape only carries its own fields: a locker
//! consignee never sends street or house number even when the caller's
//! address has them. The API accepts exactly one package per shipment.

use super::common::{tracking_url, WireContactAddress, WireDocument, WireMoney, WireStatus, WireWeight};
use crate::auth::{BearerAuthorizer, TokenCache};
use crate::carriers::format::{iso_date, non_blank, whole_cm};
use crate::config::DhlParcelConfig;
use crate::domain::{Address, LabelFormat, Money, ShipmentRequest, ShipmentResponse, Weight};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_PROFILE: &str = "STANDARD_GRUPPENPROFIL";

// ============================================================================
// REQUEST MODEL
// ============================================================================

/// How the consignee receives the parcel
///
/// The consignee's [`Address`] supplies name, postal code, city and
/// country for every variant; street and house number are only sent for
/// `ContactAddress`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DhlConsignee {
    #[default]
    ContactAddress,
    /// Packstation delivery
    Locker { locker_id: u32, post_number: String },
    /// Postfiliale delivery
    PostOffice {
        retail_id: u32,
        post_number: Option<String>,
        email: Option<String>,
    },
    PoBox { po_box_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VisualAgeCheck {
    #[serde(rename = "A16")]
    Sixteen,
    #[serde(rename = "A18")]
    Eighteen,
}

/// What happens to undeliverable international parcels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Endorsement {
    Return,
    Abandon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CashOnDelivery {
    pub amount: Money,
    pub account_reference: Option<String>,
    pub transfer_note: Option<String>,
}

/// Value-added services; the default value requests none
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DhlServices {
    pub preferred_neighbour: Option<String>,
    pub preferred_location: Option<String>,
    pub preferred_day: Option<NaiveDate>,
    pub visual_check_of_age: Option<VisualAgeCheck>,
    pub named_person_only: bool,
    pub signed_for_by_recipient: bool,
    pub no_neighbour_delivery: bool,
    pub endorsement: Option<Endorsement>,
    pub additional_insurance: Option<Money>,
    pub cash_on_delivery: Option<CashOnDelivery>,
    pub bulky_goods: bool,
    pub premium: bool,
    /// E-mail for parcel outlet routing notifications
    pub parcel_outlet_routing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportType {
    Other,
    Present,
    CommercialSample,
    Document,
    ReturnOfGoods,
    CommercialGoods,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomsItem {
    pub description: String,
    pub country_of_origin: Option<String>,
    pub hs_code: Option<String>,
    pub quantity: u32,
    /// Value per unit
    pub value: Money,
    /// Net weight per unit
    pub weight: Weight,
}

/// Customs declaration for shipments leaving the EU customs area
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DhlCustoms {
    pub invoice_no: Option<String>,
    pub export_type: Option<ExportType>,
    pub export_description: Option<String>,
    /// Incoterm such as "DAP" or "DDP"
    pub shipping_conditions: Option<String>,
    pub permit_no: Option<String>,
    pub attestation_no: Option<String>,
    pub postal_charges: Option<Money>,
    pub items: Vec<CustomsItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DhlShipmentRequest {
    pub shipment: ShipmentRequest,
    /// 14-digit EKP + procedure + participation
    pub billing_number: String,
    /// Product code such as "V01PAK" or "V53WPAK"
    pub product: String,
    pub profile: String,
    pub consignee: DhlConsignee,
    pub services: DhlServices,
    pub customs: Option<DhlCustoms>,
    pub label_format: LabelFormat,
}

impl DhlShipmentRequest {
    pub fn new<S: Into<String>>(shipment: ShipmentRequest, billing_number: S, product: S) -> Self {
        Self {
            shipment,
            billing_number: billing_number.into(),
            product: product.into(),
            profile: DEFAULT_PROFILE.to_string(),
            consignee: DhlConsignee::ContactAddress,
            services: DhlServices::default(),
            customs: None,
            label_format: LabelFormat::Pdf,
        }
    }

    pub fn with_consignee(mut self, consignee: DhlConsignee) -> Self {
        self.consignee = consignee;
        self
    }

    pub fn with_services(mut self, services: DhlServices) -> Self {
        self.services = services;
        self
    }

    pub fn with_customs(mut self, customs: DhlCustoms) -> Self {
        self.customs = Some(customs);
        self
    }
}

// ============================================================================
// WIRE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentOrderRequest {
    pub profile: String,
    pub shipments: Vec<WireShipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShipment {
    pub product: String,
    pub billing_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    pub shipper: WireContactAddress,
    pub consignee: WireConsignee,
    pub details: WireDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<WireServices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customs: Option<WireCustoms>,
}

/// The four consignee shapes; serialized without a tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireConsignee {
    Contact(WireContactAddress),
    Locker(WireLocker),
    PostOffice(WirePostOffice),
    PoBox(WirePoBox),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocker {
    pub name: String,
    #[serde(rename = "lockerID")]
    pub locker_id: u32,
    pub post_number: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePostOffice {
    pub name: String,
    #[serde(rename = "retailID")]
    pub retail_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePoBox {
    pub name1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name3: Option<String>,
    #[serde(rename = "poBoxID")]
    pub po_box_id: u32,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireDimensions {
    pub uom: String,
    pub height: u32,
    pub length: u32,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<WireDimensions>,
    pub weight: WireWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCashOnDelivery {
    pub amount: WireMoney,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_note1: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireServices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_neighbour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_check_of_age: Option<VisualAgeCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_person_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_for_by_recipient: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_neighbour_delivery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endorsement: Option<Endorsement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_insurance: Option<WireMoney>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_on_delivery: Option<WireCashOnDelivery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulky_goods: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_outlet_routing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCustomsItem {
    pub item_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_code: Option<String>,
    pub packaged_quantity: u32,
    pub item_value: WireMoney,
    pub item_weight: WireWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCustoms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_type: Option<ExportType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_charges: Option<WireMoney>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<WireCustomsItem>,
}

/// Response of `POST /orders` and `DELETE /orders`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentOrderResponse {
    #[serde(default)]
    pub status: Option<WireStatus>,
    #[serde(default)]
    pub items: Vec<ShipmentItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    #[serde(default)]
    pub shipment_no: Option<String>,
    #[serde(default)]
    pub return_shipment_no: Option<String>,
    #[serde(default)]
    pub sstatus: Option<WireStatus>,
    #[serde(default)]
    pub label: Option<WireDocument>,
    #[serde(default)]
    pub return_label: Option<WireDocument>,
    #[serde(default)]
    pub customs_doc: Option<WireDocument>,
    #[serde(default)]
    pub validation_messages: Vec<ValidationMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub validation_message: Option<String>,
    #[serde(default)]
    pub validation_state: Option<String>,
}

// ============================================================================
// REQUEST MAPPING
// ============================================================================

/// Build the wire request for one shipment
///
/// Fails before any network call when the package count is not exactly
/// one or the consignee variant misses a required identifier.
pub fn build_shipment_order(request: &DhlShipmentRequest) -> Result<ShipmentOrderRequest> {
    let shipment = &request.shipment;

    if shipment.packages.len() != 1 {
        return Err(CarrierError::PackageCardinality {
            carrier: Carrier::Dhl,
            expected: "exactly 1".to_string(),
            actual: shipment.packages.len(),
        });
    }
    if request.billing_number.trim().is_empty() {
        return Err(CarrierError::invalid_request("billing number is required"));
    }
    if request.product.trim().is_empty() {
        return Err(CarrierError::invalid_request("product code is required"));
    }
    shipment.shipper.validate()?;
    shipment.consignee.validate()?;

    let package = &shipment.packages[0];
    let dim = package.dimensions.map(|dimensions| {
        let (length, width, height) = dimensions.to_cm();
        WireDimensions {
            uom: "cm".to_string(),
            height: whole_cm(height),
            length: whole_cm(length),
            width: whole_cm(width),
        }
    });

    let wire = WireShipment {
        product: request.product.clone(),
        billing_number: request.billing_number.clone(),
        ref_no: shipment.reference.clone(),
        ship_date: shipment.ship_date.map(iso_date),
        shipper: WireContactAddress::from_address(&shipment.shipper),
        consignee: map_consignee(&shipment.consignee, &request.consignee)?,
        details: WireDetails {
            dim,
            weight: WireWeight::from_weight(&package.weight),
        },
        services: map_services(&request.services),
        customs: request.customs.as_ref().and_then(map_customs),
    };

    Ok(ShipmentOrderRequest {
        profile: request.profile.clone(),
        shipments: vec![wire],
    })
}

fn map_consignee(address: &Address, variant: &DhlConsignee) -> Result<WireConsignee> {
    let name = address.name_line(0).unwrap_or_default().to_string();

    let consignee = match variant {
        DhlConsignee::ContactAddress => {
            if address.street.trim().is_empty() {
                return Err(CarrierError::invalid_consignee("contact address requires a street"));
            }
            WireConsignee::Contact(WireContactAddress::from_address(address))
        }
        DhlConsignee::Locker { locker_id, post_number } => {
            if *locker_id == 0 {
                return Err(CarrierError::invalid_consignee("locker delivery requires a locker id"));
            }
            let post_number = non_blank(post_number).ok_or_else(|| {
                CarrierError::invalid_consignee("locker delivery requires a post number")
            })?;
            WireConsignee::Locker(WireLocker {
                name,
                locker_id: *locker_id,
                post_number,
                postal_code: address.postal_code.clone(),
                city: address.city.clone(),
                country: address.country_code.clone(),
            })
        }
        DhlConsignee::PostOffice { retail_id, post_number, email } => {
            if *retail_id == 0 {
                return Err(CarrierError::invalid_consignee("post office delivery requires a retail id"));
            }
            let post_number = post_number.as_deref().and_then(non_blank);
            let email = email.as_deref().and_then(non_blank);
            if post_number.is_none() && email.is_none() {
                return Err(CarrierError::invalid_consignee(
                    "post office delivery requires a post number or an e-mail address",
                ));
            }
            WireConsignee::PostOffice(WirePostOffice {
                name,
                retail_id: *retail_id,
                post_number,
                email,
                postal_code: address.postal_code.clone(),
                city: address.city.clone(),
                country: address.country_code.clone(),
            })
        }
        DhlConsignee::PoBox { po_box_id } => {
            if *po_box_id == 0 {
                return Err(CarrierError::invalid_consignee("PO box delivery requires a PO box id"));
            }
            WireConsignee::PoBox(WirePoBox {
                name1: name,
                name2: address.name_line(1).map(str::to_string),
                name3: address.name_line(2).map(str::to_string),
                po_box_id: *po_box_id,
                postal_code: address.postal_code.clone(),
                city: address.city.clone(),
                country: address.country_code.clone(),
            })
        }
    };

    Ok(consignee)
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

/// `None` unless at least one service is requested
fn map_services(services: &DhlServices) -> Option<WireServices> {
    let wire = WireServices {
        preferred_neighbour: services.preferred_neighbour.as_deref().and_then(non_blank),
        preferred_location: services.preferred_location.as_deref().and_then(non_blank),
        preferred_day: services.preferred_day.map(iso_date),
        visual_check_of_age: services.visual_check_of_age,
        named_person_only: flag(services.named_person_only),
        signed_for_by_recipient: flag(services.signed_for_by_recipient),
        no_neighbour_delivery: flag(services.no_neighbour_delivery),
        endorsement: services.endorsement,
        additional_insurance: services.additional_insurance.as_ref().map(WireMoney::from_money),
        cash_on_delivery: services.cash_on_delivery.as_ref().map(|cod| WireCashOnDelivery {
            amount: WireMoney::from_money(&cod.amount),
            account_reference: cod.account_reference.clone(),
            transfer_note1: cod.transfer_note.clone(),
        }),
        bulky_goods: flag(services.bulky_goods),
        premium: flag(services.premium),
        parcel_outlet_routing: services.parcel_outlet_routing.as_deref().and_then(non_blank),
    };

    (wire != WireServices::default()).then_some(wire)
}

/// `None` unless at least one customs field is filled
fn map_customs(customs: &DhlCustoms) -> Option<WireCustoms> {
    let wire = WireCustoms {
        invoice_no: customs.invoice_no.as_deref().and_then(non_blank),
        export_type: customs.export_type,
        export_description: customs.export_description.as_deref().and_then(non_blank),
        shipping_conditions: customs.shipping_conditions.as_deref().and_then(non_blank),
        permit_no: customs.permit_no.as_deref().and_then(non_blank),
        attestation_no: customs.attestation_no.as_deref().and_then(non_blank),
        postal_charges: customs.postal_charges.as_ref().map(WireMoney::from_money),
        items: customs
            .items
            .iter()
            .map(|item| WireCustomsItem {
                item_description: item.description.clone(),
                country_of_origin: item.country_of_origin.clone(),
                hs_code: item.hs_code.clone(),
                packaged_quantity: item.quantity,
                item_value: WireMoney::from_money(&item.value),
                item_weight: WireWeight::from_weight(&item.weight),
            })
            .collect(),
    };

    let empty = wire.invoice_no.is_none()
        && wire.export_type.is_none()
        && wire.export_description.is_none()
        && wire.shipping_conditions.is_none()
        && wire.permit_no.is_none()
        && wire.attestation_no.is_none()
        && wire.postal_charges.is_none()
        && wire.items.is_empty();

    (!empty).then_some(wire)
}

// ============================================================================
// RESPONSE MAPPING
// ============================================================================

fn item_error(item: &ShipmentItem, response_body: &str) -> Option<CarrierError> {
    let status = item.sstatus.as_ref().filter(|s| s.is_error())?;

    let messages: Vec<String> = item
        .validation_messages
        .iter()
        .filter_map(|m| match (&m.property, &m.validation_message) {
            (Some(property), Some(message)) => Some(format!("{}: {}", property, message)),
            (None, Some(message)) => Some(message.clone()),
            _ => None,
        })
        .collect();

    let detail = if messages.is_empty() {
        status.message()
    } else {
        format!("{} ({})", status.message(), messages.join("; "))
    };

    Some(CarrierError::Api {
        carrier: Carrier::Dhl,
        status_code: status.status_code.unwrap_or_default(),
        error_code: status.title.clone(),
        detail,
        response_body: response_body.to_string(),
        endpoint: Some("/orders".to_string()),
    })
}

/// Map the first created shipment into the carrier-agnostic result
pub fn map_shipment_response(response: &ShipmentOrderResponse, raw_body: &str) -> Result<ShipmentResponse> {
    let item = response
        .items
        .first()
        .ok_or_else(|| CarrierError::empty(Carrier::Dhl, "shipment items"))?;

    if let Some(err) = item_error(item, raw_body) {
        return Err(err);
    }

    let shipment_number = item
        .shipment_no
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            CarrierError::deserialization(Carrier::Dhl, "shipment item has no shipmentNo", Some(raw_body.to_string()))
        })?;

    let mut labels = Vec::new();
    for document in [&item.label, &item.return_label, &item.customs_doc].into_iter().flatten() {
        if let Some(label) = document.to_label()? {
            labels.push(label);
        }
    }

    Ok(ShipmentResponse {
        tracking_url: Some(tracking_url(&shipment_number)),
        shipment_number,
        labels,
    })
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct DhlShippingClient {
    api: ApiClient,
}

impl DhlShippingClient {
    /// `tokens` is the cache shared with the other Parcel DE clients
    pub fn new(config: &DhlParcelConfig, transport: Arc<dyn HttpTransport>, tokens: Arc<TokenCache>) -> Result<Self> {
        config.validate()?;
        let authorizer = BearerAuthorizer::new(tokens).with_api_key("dhl-api-key", config.client_id.clone());
        Ok(Self {
            api: ApiClient::new(Carrier::Dhl, config.shipping_url.clone(), transport, Arc::new(authorizer)),
        })
    }

    /// Create one shipment and return its number and labels
    pub async fn create_shipment(&self, request: &DhlShipmentRequest) -> Result<ShipmentResponse> {
        let doc_format = match request.label_format {
            LabelFormat::Pdf | LabelFormat::Zpl => request.label_format.as_str(),
            other => {
                return Err(CarrierError::invalid_request(format!(
                    "DHL shipping labels are available as PDF or ZPL2, not {}",
                    other.as_str()
                )))
            }
        };

        let order = build_shipment_order(request)?;
        debug!(product = %request.product, "creating DHL shipment");

        let raw: serde_json::Value = self
            .api
            .post("/orders", &[("docFormat", doc_format.to_string())], &order)
            .await?;
        let raw_body = raw.to_string();
        let response: ShipmentOrderResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::Dhl, e.to_string(), Some(raw_body.clone()))
        })?;

        let result = map_shipment_response(&response, &raw_body)?;
        info!(shipment_number = %result.shipment_number, labels = result.labels.len(), "DHL shipment created");
        Ok(result)
    }

    /// Cancel a shipment that has not been manifested yet
    pub async fn cancel_shipment(&self, profile: &str, shipment_number: &str) -> Result<()> {
        let raw: serde_json::Value = self
            .api
            .delete(
                "/orders",
                &[("profile", profile.to_string()), ("shipment", shipment_number.to_string())],
            )
            .await?;
        let raw_body = raw.to_string();
        let response: ShipmentOrderResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::Dhl, e.to_string(), Some(raw_body.clone()))
        })?;

        let item = response
            .items
            .first()
            .ok_or_else(|| CarrierError::empty(Carrier::Dhl, "cancellation items"))?;
        if let Some(err) = item_error(item, &raw_body) {
            return Err(err);
        }

        info!(shipment_number, "DHL shipment cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimensions, Package};
    use crate::units::DimensionUnit;
    use serde_json::{json, Value};

    fn shipper() -> Address {
        Address::new("My Online Shop GmbH", "Sträßchensweg", "10", "53113", "Bonn", "DEU")
    }

    fn consignee() -> Address {
        Address::new("Maria Musterfrau", "Kurt-Schumacher-Str.", "20", "53113", "Bonn", "DEU")
    }

    fn request(package: Package) -> DhlShipmentRequest {
        DhlShipmentRequest::new(
            ShipmentRequest::new(shipper(), consignee(), package),
            "33333333330102",
            "V01PAK",
        )
    }

    fn to_json(request: &DhlShipmentRequest) -> Value {
        serde_json::to_value(build_shipment_order(request).unwrap()).unwrap()
    }

    #[test]
    fn test_grams_and_millimeters_convert() {
        let package = Package::new(Weight::grams(2500.0))
            .with_dimensions(Dimensions::new(300.0, 200.0, 150.0, DimensionUnit::Millimeter));
        let json = to_json(&request(package));

        let details = &json["shipments"][0]["details"];
        assert_eq!(details["weight"], json!({ "uom": "kg", "value": 2.5 }));
        assert_eq!(details["dim"], json!({ "uom": "cm", "length": 30, "width": 20, "height": 15 }));
    }

    #[test]
    fn test_contact_consignee_shape() {
        let json = to_json(&request(Package::new(Weight::kilograms(1.0))));
        let consignee = &json["shipments"][0]["consignee"];
        assert_eq!(consignee["name1"], "Maria Musterfrau");
        assert_eq!(consignee["addressStreet"], "Kurt-Schumacher-Str.");
        assert_eq!(consignee["addressHouse"], "20");
        assert_eq!(json["profile"], DEFAULT_PROFILE);
    }

    #[test]
    fn test_locker_consignee_suppresses_street() {
        let req = request(Package::new(Weight::kilograms(1.0))).with_consignee(DhlConsignee::Locker {
            locker_id: 118,
            post_number: "12345678".to_string(),
        });
        let json = to_json(&req);
        let consignee = &json["shipments"][0]["consignee"];

        assert_eq!(consignee["name"], "Maria Musterfrau");
        assert_eq!(consignee["lockerID"], 118);
        assert_eq!(consignee["postNumber"], "12345678");
        assert_eq!(consignee["city"], "Bonn");
        assert!(consignee.get("addressStreet").is_none());
        assert!(consignee.get("addressHouse").is_none());
        assert!(consignee.get("name1").is_none());
    }

    #[test]
    fn test_post_office_and_po_box_shapes() {
        let req = request(Package::new(Weight::kilograms(1.0))).with_consignee(DhlConsignee::PostOffice {
            retail_id: 502,
            post_number: None,
            email: Some("maria@example.com".to_string()),
        });
        let consignee = to_json(&req)["shipments"][0]["consignee"].clone();
        assert_eq!(consignee["retailID"], 502);
        assert_eq!(consignee["email"], "maria@example.com");
        assert!(consignee.get("postNumber").is_none());
        assert!(consignee.get("addressStreet").is_none());

        let req = request(Package::new(Weight::kilograms(1.0)))
            .with_consignee(DhlConsignee::PoBox { po_box_id: 10_01_23 });
        let consignee = to_json(&req)["shipments"][0]["consignee"].clone();
        assert_eq!(consignee["poBoxID"], 100123);
        assert_eq!(consignee["name1"], "Maria Musterfrau");
        assert!(consignee.get("addressHouse").is_none());
    }

    #[test]
    fn test_invalid_variant_combinations() {
        let base = request(Package::new(Weight::kilograms(1.0)));

        let cases = [
            DhlConsignee::Locker { locker_id: 0, post_number: "12345678".to_string() },
            DhlConsignee::Locker { locker_id: 118, post_number: " ".to_string() },
            DhlConsignee::PostOffice { retail_id: 0, post_number: Some("1".to_string()), email: None },
            DhlConsignee::PostOffice { retail_id: 502, post_number: None, email: None },
            DhlConsignee::PoBox { po_box_id: 0 },
        ];

        for variant in cases {
            let err = build_shipment_order(&base.clone().with_consignee(variant.clone())).unwrap_err();
            assert!(matches!(err, CarrierError::InvalidConsignee { .. }), "{variant:?}");
        }
    }

    #[test]
    fn test_package_cardinality() {
        let mut req = request(Package::new(Weight::kilograms(1.0)));
        req.shipment.packages.push(Package::new(Weight::kilograms(2.0)));
        let err = build_shipment_order(&req).unwrap_err();
        assert!(matches!(err, CarrierError::PackageCardinality { actual: 2, .. }));

        req.shipment.packages.clear();
        let err = build_shipment_order(&req).unwrap_err();
        assert!(matches!(err, CarrierError::PackageCardinality { actual: 0, .. }));
    }

    #[test]
    fn test_default_services_and_customs_are_absent() {
        let req = request(Package::new(Weight::kilograms(1.0))).with_customs(DhlCustoms::default());
        let json = to_json(&req);
        assert!(json["shipments"][0].get("services").is_none());
        assert!(json["shipments"][0].get("customs").is_none());
    }

    #[test]
    fn test_services_only_carry_set_fields() {
        let services = DhlServices {
            preferred_day: NaiveDate::from_ymd_opt(2024, 5, 17),
            visual_check_of_age: Some(VisualAgeCheck::Eighteen),
            named_person_only: true,
            additional_insurance: Some(Money::eur(1200.0)),
            ..Default::default()
        };
        let req = request(Package::new(Weight::kilograms(1.0))).with_services(services);
        let json = to_json(&req);

        assert_eq!(
            json["shipments"][0]["services"],
            json!({
                "preferredDay": "2024-05-17",
                "visualCheckOfAge": "A18",
                "namedPersonOnly": true,
                "additionalInsurance": { "currency": "EUR", "value": 1200.0 }
            })
        );
    }

    #[test]
    fn test_customs_block() {
        let customs = DhlCustoms {
            export_type: Some(ExportType::CommercialGoods),
            items: vec![CustomsItem {
                description: "T-Shirt".to_string(),
                country_of_origin: Some("DEU".to_string()),
                hs_code: Some("61091000".to_string()),
                quantity: 2,
                value: Money::eur(19.99),
                weight: Weight::grams(200.0),
            }],
            ..Default::default()
        };
        let req = request(Package::new(Weight::kilograms(1.0))).with_customs(customs);
        let json = to_json(&req);
        let customs = &json["shipments"][0]["customs"];

        assert_eq!(customs["exportType"], "COMMERCIAL_GOODS");
        assert_eq!(customs["items"][0]["packagedQuantity"], 2);
        assert_eq!(customs["items"][0]["itemWeight"], json!({ "uom": "kg", "value": 0.2 }));
        assert!(customs.get("invoiceNo").is_none());
    }

    #[test]
    fn test_map_response_with_labels() {
        let body = r#"{
            "status": {"title": "OK", "statusCode": 200},
            "items": [{
                "shipmentNo": "340434310428091700",
                "sstatus": {"title": "OK", "statusCode": 200},
                "label": {"b64": "JVBERi0x", "fileFormat": "PDF"},
                "returnLabel": {"zpl2": "^XA^XZ", "fileFormat": "ZPL2"}
            }]
        }"#;
        let response: ShipmentOrderResponse = serde_json::from_str(body).unwrap();
        let result = map_shipment_response(&response, body).unwrap();

        assert_eq!(result.shipment_number, "340434310428091700");
        assert_eq!(result.labels.len(), 2);
        assert_eq!(result.labels[0].content, b"%PDF-1");
        assert_eq!(result.labels[1].format, LabelFormat::Zpl);
        assert_eq!(result.labels[1].content, b"^XA^XZ");
        assert!(result.tracking_url.unwrap().ends_with("piececode=340434310428091700"));
    }

    #[test]
    fn test_map_response_without_items_is_error() {
        let body = r#"{"status": {"title": "OK", "statusCode": 200}, "items": []}"#;
        let response: ShipmentOrderResponse = serde_json::from_str(body).unwrap();
        let err = map_shipment_response(&response, body).unwrap_err();
        assert!(matches!(err, CarrierError::EmptyResponse { .. }));
    }

    #[test]
    fn test_map_response_item_error() {
        let body = r#"{
            "status": {"title": "Bad Request", "statusCode": 400},
            "items": [{
                "sstatus": {"title": "Bad Request", "statusCode": 400, "detail": "Weight too high."},
                "validationMessages": [{"property": "details.weight.value", "validationMessage": "must be less than 31.5", "validationState": "Error"}]
            }]
        }"#;
        let response: ShipmentOrderResponse = serde_json::from_str(body).unwrap();
        let err = map_shipment_response(&response, body).unwrap_err();

        assert_eq!(err.status_code(), Some(400));
        let message = err.to_string();
        assert!(message.contains("Weight too high."));
        assert!(message.contains("details.weight.value: must be less than 31.5"));
    }
}
