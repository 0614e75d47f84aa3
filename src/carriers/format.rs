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


//! Wire-level formatting shared by the carrier mappers
//!
//! Rounding is half away from zero everywhere. Decimal strings always use
//! `.` as separator regardless of the host locale.

use crate::domain::{Label, LabelFormat};
use crate::error::{Carrier, CarrierError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Round to `decimals` places, ties away from zero
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Fixed two-decimal string ("2.50"), independent of locale
pub fn decimal_2(value: f64) -> String {
    format!("{:.2}", round_to(value, 2))
}

/// Whole centimeters for carriers that only accept integers
pub fn whole_cm(value: f64) -> u32 {
    let rounded = value.round();
    if rounded <= 0.0 {
        0
    } else {
        rounded as u32
    }
}

/// Trimmed value, `None` when blank
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `dd.MM.yyyy`
pub fn german_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// `yyyy-MM-dd`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

const NAIVE_ISO_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const GERMAN_FORMATS: [&str; 2] = ["%d.%m.%Y %H:%M", "%d.%m.%Y %H:%M:%S"];

/// Parse a carrier timestamp: ISO 8601 first, then `dd.MM.yyyy HH:mm`
///
/// Timestamps without an offset are taken as UTC. Unparsable input
/// yields `None`.
pub fn parse_carrier_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_ISO_FORMATS
        .iter()
        .chain(GERMAN_FORMATS.iter())
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parse `dd.MM.yyyy` or `yyyy-MM-dd`
pub fn parse_carrier_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .ok()
}

/// Turn a carrier label payload into bytes
///
/// Printer languages (ZPL, TPCL) arrive as plain text; everything else
/// is Base64. Line breaks inside Base64 payloads are tolerated.
pub fn decode_label(carrier: Carrier, format: LabelFormat, content: &str) -> Result<Label> {
    let content = if format.is_raw_text() {
        content.as_bytes().to_vec()
    } else {
        decode_base64(carrier, content)?
    };

    Ok(Label { format, content })
}

/// Base64 payload to bytes, ignoring embedded whitespace
pub fn decode_base64(carrier: Carrier, content: &str) -> Result<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64.decode(compact.as_bytes()).map_err(|e| {
        CarrierError::deserialization(carrier, format!("label is not valid Base64: {}", e), None)
    })
}
