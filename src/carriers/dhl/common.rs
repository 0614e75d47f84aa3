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


//! Wire pieces shared by the Parcel DE APIs (Shipping, Pickup, Returns)

use crate::carriers::format::{decode_base64, decode_label, non_blank, round_to};
use crate::domain::{Address, Label, LabelFormat, Money, Weight};
use crate::error::{Carrier, Result};
use serde::{Deserialize, Serialize};

/// Public tracking page for a DHL shipment number
pub fn tracking_url(shipment_number: &str) -> String {
    format!(
        "https://www.dhl.de/de/privatkunden/pakete-empfangen/verfolgen.html?piececode={}",
        urlencoding::encode(shipment_number)
    )
}

/// `{"uom":"kg","value":2.5}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireWeight {
    pub uom: String,
    pub value: f64,
}

impl WireWeight {
    /// Kilograms, rounded to whole grams
    pub fn from_weight(weight: &Weight) -> Self {
        Self {
            uom: "kg".to_string(),
            value: round_to(weight.to_kg(), 3),
        }
    }
}

/// `{"currency":"EUR","value":12.5}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMoney {
    pub currency: String,
    pub value: f64,
}

impl WireMoney {
    pub fn from_money(money: &Money) -> Self {
        Self {
            currency: money.currency.clone(),
            value: round_to(money.amount, 2),
        }
    }
}

/// Street address shape used for shippers, consignees and pickup sites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContactAddress {
    pub name1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name3: Option<String>,
    pub address_street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_house: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_address_information1: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl WireContactAddress {
    pub fn from_address(address: &Address) -> Self {
        Self {
            name1: address.name_line(0).unwrap_or_default().to_string(),
            name2: address.name_line(1).map(str::to_string),
            name3: address.name_line(2).map(str::to_string),
            address_street: address.street.clone(),
            address_house: non_blank(&address.house_number),
            additional_address_information1: address.address_addition.clone(),
            postal_code: address.postal_code.clone(),
            city: address.city.clone(),
            country: address.country_code.clone(),
            state: address.state.clone(),
            email: address.email.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Envelope and per-item status block
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStatus {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl WireStatus {
    pub fn is_error(&self) -> bool {
        self.status_code.map_or(false, |code| code >= 400)
    }

    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "no detail provided".to_string())
    }
}

/// Label or document as returned inline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    #[serde(default)]
    pub b64: Option<String>,
    #[serde(default)]
    pub zpl2: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
}

impl WireDocument {
    /// Decode the inline content; URL-only documents yield `None`
    pub fn to_label(&self) -> Result<Option<Label>> {
        if let Some(zpl) = self.zpl2.as_deref().filter(|s| !s.is_empty()) {
            return decode_label(Carrier::Dhl, LabelFormat::Zpl, zpl).map(Some);
        }

        let Some(b64) = self.b64.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let format = self
            .file_format
            .as_deref()
            .and_then(LabelFormat::from_str)
            .unwrap_or(LabelFormat::Pdf);

        // the b64 field is Base64 whatever the file format
        let content = decode_base64(Carrier::Dhl, b64)?;
        Ok(Some(Label { format, content }))
    }
}
