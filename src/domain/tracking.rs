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


//! Canonical tracking results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical shipment status all carrier vocabularies map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingStatus {
    #[default]
    Unknown,
    PreTransit,
    InTransit,
    OutForDelivery,
    Delivered,
    Exception,
    Returned,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::PreTransit => "PRE_TRANSIT",
            Self::InTransit => "IN_TRANSIT",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Exception => "EXCEPTION",
            Self::Returned => "RETURNED",
        }
    }

    /// No further status changes expected
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered | Self::Returned)
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub timestamp: Option<DateTime<Utc>>,
    /// "City, Country" or whichever part the carrier supplied
    pub location: Option<String>,
    pub description: String,
    pub status_code: Option<String>,
}

/// Events are kept in carrier order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    pub shipment_number: String,
    pub status: TrackingStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub events: Vec<TrackingEvent>,
}

/// Join the non-empty location parts with ", "
pub(crate) fn format_location(city: Option<&str>, country: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [city, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_location() {
        assert_eq!(format_location(Some("Bonn"), Some("DE")), Some("Bonn, DE".to_string()));
        assert_eq!(format_location(Some(" "), Some("DE")), Some("DE".to_string()));
        assert_eq!(format_location(Some("Bonn"), None), Some("Bonn".to_string()));
        assert_eq!(format_location(None, Some("")), None);
    }

    #[test]
    fn test_final_statuses() {
        assert!(TrackingStatus::Delivered.is_final());
        assert!(TrackingStatus::Returned.is_final());
        assert!(!TrackingStatus::OutForDelivery.is_final());
        assert_eq!(TrackingStatus::default(), TrackingStatus::Unknown);
    }
}
