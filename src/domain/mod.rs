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


//! Carrier-agnostic domain model
//!
//! These types are constructed by callers and read by the carrier request
//! mappers, or produced by the response mappers. None of them know about
//! any carrier's wire format.

pub mod address;
pub mod location;
pub mod package;
pub mod pickup;
pub mod shipment;
pub mod tracking;

// Re-export commonly used types
pub use address::Address;
pub use location::{LocationQuery, ServicePoint, ServicePointAddress, ServicePointKind};
pub use package::{Dimensions, Package, Weight};
pub use pickup::{
    PickupCancellation, PickupConfirmation, PickupContact, PickupDate, PickupLocation,
    PickupRequest, ReturnRequest,
};
pub use shipment::{Label, LabelFormat, Money, ShipmentRequest, ShipmentResponse};
pub use tracking::{TrackingEvent, TrackingResult, TrackingStatus};
