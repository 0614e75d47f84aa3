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


//! Postal address shared by every carrier

use crate::error::{CarrierError, Result};
use serde::{Deserialize, Serialize};

/// Postal address as supplied by the caller
///
/// `name` holds one to three lines (person, company, care-of). Carriers
/// that expose `name1`..`name3` receive the lines in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub name: Vec<String>,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    /// ISO 3166 country code as the target carrier expects it
    pub country_code: String,
    #[serde(default)]
    pub state: Option<String>,
    /// Additional address information (floor, building, ...)
    #[serde(default)]
    pub address_addition: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    pub fn new<S: Into<String>>(
        name: S,
        street: S,
        house_number: S,
        postal_code: S,
        city: S,
        country_code: S,
    ) -> Self {
        Self {
            name: vec![name.into()],
            street: street.into(),
            house_number: house_number.into(),
            postal_code: postal_code.into(),
            city: city.into(),
            country_code: country_code.into(),
            state: None,
            address_addition: None,
            email: None,
            phone: None,
        }
    }

    /// Append a further name line (company, care-of)
    pub fn with_name_line<S: Into<String>>(mut self, line: S) -> Self {
        self.name.push(line.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Name line `index` (0-based), if present and non-blank
    pub fn name_line(&self, index: usize) -> Option<&str> {
        self.name
            .get(index)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Check the name has one to three non-blank lines
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.len() > 3 {
            return Err(CarrierError::invalid_request(format!(
                "address name must have 1 to 3 lines, got {}",
                self.name.len()
            )));
        }
        if self.name[0].trim().is_empty() {
            return Err(CarrierError::invalid_request("address name must not be blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonn() -> Address {
        Address::new("Max Mustermann", "Charles-de-Gaulle-Str.", "20", "53113", "Bonn", "DEU")
    }

    #[test]
    fn test_name_lines() {
        let address = bonn().with_name_line("ACME GmbH").with_name_line("  ");
        assert_eq!(address.name_line(0), Some("Max Mustermann"));
        assert_eq!(address.name_line(1), Some("ACME GmbH"));
        assert_eq!(address.name_line(2), None);
        assert_eq!(address.name_line(3), None);
    }

    #[test]
    fn test_validate_name_cardinality() {
        assert!(bonn().validate().is_ok());

        let too_many = bonn().with_name_line("a").with_name_line("b").with_name_line("c");
        assert!(too_many.validate().is_err());

        let mut blank = bonn();
        blank.name = vec![" ".to_string()];
        assert!(blank.validate().is_err());
    }
}
