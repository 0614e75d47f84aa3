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


//! Pickup and return requests

use super::address::Address;
use super::package::Weight;
use super::shipment::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where the courier collects the parcels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickupLocation {
    Address(Address),
    /// Location previously registered with the carrier
    Id(String),
}

/// When the courier collects the parcels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupDate {
    Date(NaiveDate),
    Asap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupContact {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_notification: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRequest {
    pub billing_number: String,
    pub location: PickupLocation,
    pub date: PickupDate,
    #[serde(default)]
    pub total_weight: Option<Weight>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub contacts: Vec<PickupContact>,
    /// Shipment numbers to collect; empty means unannounced parcels
    #[serde(default)]
    pub shipment_numbers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupConfirmation {
    pub order_id: String,
    pub pickup_date: Option<NaiveDate>,
    pub free_of_charge: bool,
    pub confirmed_shipments: Vec<String>,
}

/// Outcome of cancelling one pickup order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupCancellation {
    pub order_id: String,
    pub cancelled: bool,
    pub message: Option<String>,
}

/// Return label request; the consignee is the merchant's return receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    /// Receiver id configured in the carrier's business portal
    pub receiver_id: String,
    pub shipper: Address,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub shipment_reference: Option<String>,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub value: Option<Money>,
}
