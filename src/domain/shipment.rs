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


//! Carrier-agnostic shipment request and result types

use super::address::Address;
use super::package::Package;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields every carrier's shipment request shares
///
/// Carrier clients take a carrier-specific request that embeds this value
/// and adds billing data, product codes, delivery variants and services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub shipper: Address,
    pub consignee: Address,
    pub packages: Vec<Package>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub ship_date: Option<NaiveDate>,
}

impl ShipmentRequest {
    pub fn new(shipper: Address, consignee: Address, package: Package) -> Self {
        Self {
            shipper,
            consignee,
            packages: vec![package],
            reference: None,
            ship_date: None,
        }
    }

    pub fn with_reference<S: Into<String>>(mut self, reference: S) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_ship_date(mut self, date: NaiveDate) -> Self {
        self.ship_date = Some(date);
        self
    }

    /// Sum of all package weights in kilograms
    pub fn total_weight_kg(&self) -> f64 {
        self.packages.iter().map(|p| p.weight.to_kg()).sum()
    }
}

/// Monetary amount with ISO 4217 currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

impl Money {
    pub fn new<S: Into<String>>(amount: f64, currency: S) -> Self {
        Self { amount, currency: currency.into() }
    }

    pub fn eur(amount: f64) -> Self {
        Self::new(amount, "EUR")
    }
}

/// Label document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelFormat {
    Pdf,
    Png,
    Zpl,
    Tpcl,
}

impl LabelFormat {
    /// Parse a carrier format tag ("PDF", "ZPL2", ...)
    pub fn from_str(format: &str) -> Option<Self> {
        match format.trim().to_ascii_uppercase().as_str() {
            "PDF" => Some(Self::Pdf),
            "PNG" => Some(Self::Png),
            "ZPL" | "ZPL2" => Some(Self::Zpl),
            "TPCL" => Some(Self::Tpcl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Png => "PNG",
            Self::Zpl => "ZPL2",
            Self::Tpcl => "TPCL",
        }
    }

    /// Printer languages carried as plain text rather than Base64
    pub fn is_raw_text(&self) -> bool {
        matches!(self, Self::Zpl | Self::Tpcl)
    }
}

/// A printable label returned by the carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub format: LabelFormat,
    pub content: Vec<u8>,
}

/// Result of a successful create-shipment (or create-return) call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentResponse {
    pub shipment_number: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub tracking_url: Option<String>,
}
