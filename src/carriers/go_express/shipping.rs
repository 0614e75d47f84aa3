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


//! GO! Express shipment creation
//!
//! The addresses and the package list are siblings of `shipment` at the
//! top level of the request, not nested inside it:
//!
//! ```json
//! {
//!   "responsibleStation": "FRA", "customerId": "1234567",
//!   "shipment": { "service": "ON", "weight": "2.50", "selfPickup": "Yes", ... },
//!   "consignorAddress": { ... }, "consigneeAddress": { ... },
//!   "neutralAddress": { ... }, "label": "4", "packages": [ ... ]
//! }
//! ```
//!
//! Flags are the string `"Yes"` when set and absent otherwise. Dates are
//! `dd.MM.yyyy`, times `HH:mm`, weights and amounts two-decimal strings.

use crate::auth::BasicAuthorizer;
use crate::carriers::format::{decimal_2, decode_label, german_date, non_blank, parse_carrier_date, whole_cm};
use crate::config::GoExpressConfig;
use crate::domain::{Address, LabelFormat, Money, ShipmentRequest, ShipmentResponse};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// GO! service level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GoService {
    /// Overnight
    #[default]
    #[serde(rename = "ON")]
    Overnight,
    /// Overnight with pickup on demand
    #[serde(rename = "ONC")]
    OvernightCode,
    #[serde(rename = "DI")]
    Direct,
    #[serde(rename = "INT")]
    International,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub from: NaiveTime,
    pub till: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoFlags {
    pub self_pickup: bool,
    pub self_delivery: bool,
    pub freight_collect: bool,
    pub ident_check: bool,
    pub receipt_notice: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoShipmentRequest {
    pub shipment: ShipmentRequest,
    pub service: GoService,
    /// Description of the goods
    pub content: String,
    pub pickup: TimeWindow,
    pub delivery: Option<TimeWindow>,
    pub flags: GoFlags,
    /// Printed as sender instead of the consignor
    pub neutral_address: Option<Address>,
    pub insurance: Option<Money>,
    pub value_of_goods: Option<Money>,
    pub cash_on_delivery: Option<Money>,
    pub cost_center: Option<String>,
    pub label_format: LabelFormat,
}

impl GoShipmentRequest {
    pub fn new<S: Into<String>>(shipment: ShipmentRequest, content: S, pickup: TimeWindow) -> Self {
        Self {
            shipment,
            service: GoService::Overnight,
            content: content.into(),
            pickup,
            delivery: None,
            flags: GoFlags::default(),
            neutral_address: None,
            insurance: None,
            value_of_goods: None,
            cash_on_delivery: None,
            cost_center: None,
            label_format: LabelFormat::Pdf,
        }
    }

    pub fn with_flags(mut self, flags: GoFlags) -> Self {
        self.flags = flags;
        self
    }
}

// ============================================================================
// WIRE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoCreateShipmentRequest {
    pub responsible_station: String,
    pub customer_id: String,
    pub shipment: GoWireShipment,
    pub consignor_address: GoWireAddress,
    pub consignee_address: GoWireAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral_address: Option<GoWireAddress>,
    pub label: String,
    pub packages: Vec<GoWirePackage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoWireShipment {
    pub order_status: String,
    pub service: GoService,
    pub weight: String,
    pub package_count: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_pickup: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_delivery: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freight_collect: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ident_check: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_notice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_neutral_pickup: Option<&'static str>,
    pub pickup: GoWireWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<GoWireWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<GoWireMoney>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_of_goods: Option<GoWireMoney>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_on_delivery: Option<GoWireMoney>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoWireWindow {
    pub date: String,
    pub time_from: String,
    pub time_till: String,
}

impl GoWireWindow {
    fn from_window(window: &TimeWindow) -> Self {
        Self {
            date: german_date(window.date),
            time_from: window.from.format("%H:%M").to_string(),
            time_till: window.till.format("%H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoWireMoney {
    pub amount: String,
    pub currency: String,
}

impl GoWireMoney {
    fn from_money(money: &Money) -> Self {
        Self {
            amount: decimal_2(money.amount),
            currency: money.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoWireAddress {
    pub name1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name3: Option<String>,
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    pub zip_code: String,
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl GoWireAddress {
    fn from_address(address: &Address) -> Self {
        Self {
            name1: address.name_line(0).unwrap_or_default().to_string(),
            name2: address.name_line(1).map(str::to_string),
            name3: address.name_line(2).map(str::to_string),
            street: address.street.clone(),
            house_number: non_blank(&address.house_number),
            zip_code: address.postal_code.clone(),
            city: address.city.clone(),
            country: address.country_code.clone(),
            phone_number: address.phone.clone(),
            email: address.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoWirePackage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoCreateShipmentResponse {
    #[serde(default)]
    pub hwb_number: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub hwb_or_package_label: Option<String>,
    #[serde(default)]
    pub package: Vec<GoWireBarcode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoWireBarcode {
    #[serde(default)]
    pub barcode: Option<String>,
}

/// Created shipment plus the GO!-specific extras
#[derive(Debug, Clone, PartialEq)]
pub struct GoShipmentResult {
    pub shipment: ShipmentResponse,
    pub package_barcodes: Vec<String>,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

// ============================================================================
// MAPPING
// ============================================================================

fn yes(flag: bool) -> Option<&'static str> {
    flag.then_some("Yes")
}

fn label_code(format: LabelFormat) -> Result<&'static str> {
    match format {
        LabelFormat::Pdf => Ok("4"),
        LabelFormat::Tpcl => Ok("2"),
        other => Err(CarrierError::invalid_request(format!(
            "GO! Express labels are available as PDF or TPCL, not {}",
            other.as_str()
        ))),
    }
}

pub fn build_create_shipment(config: &GoExpressConfig, request: &GoShipmentRequest) -> Result<GoCreateShipmentRequest> {
    let shipment = &request.shipment;
    if shipment.packages.is_empty() {
        return Err(CarrierError::PackageCardinality {
            carrier: Carrier::GoExpress,
            expected: "at least 1".to_string(),
            actual: 0,
        });
    }
    if request.content.trim().is_empty() {
        return Err(CarrierError::invalid_request("GO! Express requires a content description"));
    }
    if request.pickup.from >= request.pickup.till {
        return Err(CarrierError::invalid_request("pickup window must end after it starts"));
    }
    shipment.shipper.validate()?;
    shipment.consignee.validate()?;
    if let Some(neutral) = &request.neutral_address {
        neutral.validate()?;
    }

    let packages = shipment
        .packages
        .iter()
        .map(|package| {
            let dims = package.dimensions.map(|d| d.to_cm());
            GoWirePackage {
                length: dims.map(|(l, _, _)| whole_cm(l)),
                width: dims.map(|(_, w, _)| whole_cm(w)),
                height: dims.map(|(_, _, h)| whole_cm(h)),
            }
        })
        .collect();

    let flags = &request.flags;
    Ok(GoCreateShipmentRequest {
        responsible_station: config.responsible_station.clone(),
        customer_id: config.customer_id.clone(),
        shipment: GoWireShipment {
            order_status: "New".to_string(),
            service: request.service,
            weight: decimal_2(shipment.total_weight_kg()),
            package_count: shipment.packages.len().to_string(),
            content: request.content.trim().to_string(),
            customer_reference: shipment.reference.as_deref().and_then(non_blank),
            cost_center: request.cost_center.as_deref().and_then(non_blank),
            self_pickup: yes(flags.self_pickup),
            self_delivery: yes(flags.self_delivery),
            freight_collect: yes(flags.freight_collect),
            ident_check: yes(flags.ident_check),
            receipt_notice: yes(flags.receipt_notice),
            is_neutral_pickup: yes(request.neutral_address.is_some()),
            pickup: GoWireWindow::from_window(&request.pickup),
            delivery: request.delivery.as_ref().map(GoWireWindow::from_window),
            insurance: request.insurance.as_ref().map(GoWireMoney::from_money),
            value_of_goods: request.value_of_goods.as_ref().map(GoWireMoney::from_money),
            cash_on_delivery: request.cash_on_delivery.as_ref().map(GoWireMoney::from_money),
        },
        consignor_address: GoWireAddress::from_address(&shipment.shipper),
        consignee_address: GoWireAddress::from_address(&shipment.consignee),
        neutral_address: request.neutral_address.as_ref().map(GoWireAddress::from_address),
        label: label_code(request.label_format)?.to_string(),
        packages,
    })
}

pub fn map_create_shipment_response(
    response: &GoCreateShipmentResponse,
    label_format: LabelFormat,
    raw_body: &str,
) -> Result<GoShipmentResult> {
    let shipment_number = response.hwb_number.as_deref().and_then(non_blank).ok_or_else(|| {
        CarrierError::deserialization(Carrier::GoExpress, "response has no hwbNumber", Some(raw_body.to_string()))
    })?;

    let labels = match response.hwb_or_package_label.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(content) => vec![decode_label(Carrier::GoExpress, label_format, content)?],
        None => Vec::new(),
    };

    Ok(GoShipmentResult {
        shipment: ShipmentResponse {
            shipment_number,
            labels,
            tracking_url: None,
        },
        package_barcodes: response.package.iter().filter_map(|p| p.barcode.clone()).collect(),
        pickup_date: response.pickup_date.as_deref().and_then(parse_carrier_date),
        delivery_date: response.delivery_date.as_deref().and_then(parse_carrier_date),
    })
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct GoExpressClient {
    pub(super) api: ApiClient,
    config: GoExpressConfig,
}

impl GoExpressClient {
    pub fn new(config: GoExpressConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let authorizer = BasicAuthorizer::new(&config.username, &config.password);
        Ok(Self {
            api: ApiClient::new(Carrier::GoExpress, config.base_url.clone(), transport, Arc::new(authorizer)),
            config,
        })
    }

    pub async fn create_shipment(&self, request: &GoShipmentRequest) -> Result<GoShipmentResult> {
        let wire = build_create_shipment(&self.config, request)?;
        debug!(packages = wire.packages.len(), "creating GO! Express shipment");

        let raw: serde_json::Value = self.api.post("/api/v1/createShipment", &[], &wire).await?;
        let raw_body = raw.to_string();
        let response: GoCreateShipmentResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::GoExpress, e.to_string(), Some(raw_body.clone()))
        })?;

        let result = map_create_shipment_response(&response, request.label_format, &raw_body)?;
        info!(hwb = %result.shipment.shipment_number, "GO! Express shipment created");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimensions, Package, Weight};
    use crate::units::DimensionUnit;
    use serde_json::{json, Value};

    fn config() -> GoExpressConfig {
        GoExpressConfig::new("user", "secret", "FRA", "1234567")
    }

    fn window() -> TimeWindow {
        TimeWindow {
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            from: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            till: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        }
    }

    fn request() -> GoShipmentRequest {
        let package = Package::new(Weight::grams(1250.0))
            .with_dimensions(Dimensions::new(40.0, 30.0, 20.5, DimensionUnit::Centimeter));
        let shipment = ShipmentRequest::new(
            Address::new("Absender AG", "Mainzer Landstr.", "50", "60325", "Frankfurt", "DE"),
            Address::new("Empfänger GmbH", "Königsallee", "1", "40212", "Düsseldorf", "DE"),
            package,
        )
        .with_reference("PO-77");
        GoShipmentRequest::new(shipment, "Ersatzteile", window())
    }

    fn to_json(request: &GoShipmentRequest) -> Value {
        serde_json::to_value(build_create_shipment(&config(), request).unwrap()).unwrap()
    }

    #[test]
    fn test_flags_are_yes_or_absent() {
        let req = request().with_flags(GoFlags {
            self_pickup: true,
            freight_collect: false,
            ..Default::default()
        });
        let json = to_json(&req);

        assert_eq!(json["shipment"]["selfPickup"], "Yes");
        assert!(json["shipment"].get("freightCollect").is_none());
        assert!(json["shipment"].get("identCheck").is_none());
        assert!(json["shipment"].get("isNeutralPickup").is_none());
    }

    #[test]
    fn test_addresses_are_top_level() {
        let json = to_json(&request());

        assert_eq!(json["consignorAddress"]["zipCode"], "60325");
        assert_eq!(json["consigneeAddress"]["city"], "Düsseldorf");
        assert!(json["shipment"].get("consignorAddress").is_none());
        assert!(json["shipment"].get("consigneeAddress").is_none());
        assert!(json.get("neutralAddress").is_none());
        assert_eq!(json["responsibleStation"], "FRA");
        assert_eq!(json["customerId"], "1234567");
    }

    #[test]
    fn test_formats() {
        let mut req = request();
        req.insurance = Some(Money::eur(500.0));
        req.shipment.packages.push(Package::new(Weight::kilograms(0.76)));
        let json = to_json(&req);
        let shipment = &json["shipment"];

        assert_eq!(shipment["weight"], "2.01");
        assert_eq!(shipment["packageCount"], "2");
        assert_eq!(shipment["service"], "ON");
        assert_eq!(shipment["customerReference"], "PO-77");
        assert_eq!(shipment["pickup"], json!({ "date": "07.03.2024", "timeFrom": "09:00", "timeTill": "16:30" }));
        assert_eq!(shipment["insurance"], json!({ "amount": "500.00", "currency": "EUR" }));
        assert_eq!(json["packages"], json!([{ "length": 40, "width": 30, "height": 21 }, {}]));
        assert_eq!(json["label"], "4");
    }

    #[test]
    fn test_neutral_address_sets_flag() {
        let mut req = request();
        req.neutral_address = Some(Address::new("Shop Brand", "Weg", "1", "10115", "Berlin", "DE"));
        let json = to_json(&req);
        assert_eq!(json["shipment"]["isNeutralPickup"], "Yes");
        assert_eq!(json["neutralAddress"]["name1"], "Shop Brand");
    }

    #[test]
    fn test_validation() {
        let mut req = request();
        req.shipment.packages.clear();
        assert!(matches!(
            build_create_shipment(&config(), &req),
            Err(CarrierError::PackageCardinality { actual: 0, .. })
        ));

        let mut req = request();
        req.pickup.till = req.pickup.from;
        assert!(build_create_shipment(&config(), &req).unwrap_err().is_configuration_error());

        let mut req = request();
        req.label_format = LabelFormat::Zpl;
        assert!(build_create_shipment(&config(), &req).is_err());
    }

    #[test]
    fn test_map_response() {
        let body = r#"{
            "hwbNumber": "401234567890",
            "orderStatus": "New",
            "pickupDate": "07.03.2024",
            "deliveryDate": "08.03.2024",
            "hwbOrPackageLabel": "JVBERi0x",
            "package": [{"barcode": "GO401234567890001"}]
        }"#;
        let response: GoCreateShipmentResponse = serde_json::from_str(body).unwrap();
        let result = map_create_shipment_response(&response, LabelFormat::Pdf, body).unwrap();

        assert_eq!(result.shipment.shipment_number, "401234567890");
        assert_eq!(result.shipment.labels[0].content, b"%PDF-1");
        assert_eq!(result.package_barcodes, vec!["GO401234567890001"]);
        assert_eq!(result.delivery_date, NaiveDate::from_ymd_opt(2024, 3, 8));

        let missing: GoCreateShipmentResponse = serde_json::from_str(r#"{"orderStatus": "New"}"#).unwrap();
        assert!(map_create_shipment_response(&missing, LabelFormat::Pdf, "{}")
            .unwrap_err()
            .is_deserialization_error());
    }
}
