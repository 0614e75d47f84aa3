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


//! Weight and dimension conversion into the units carriers require
//!
//! Both carriers in this crate want kilograms and centimeters. Values are
//! converted without rounding; rounding to the precision a wire field needs
//! happens in the request mappers at the point of serialization.

use serde::{Deserialize, Serialize};

const GRAMS_PER_KILOGRAM: f64 = 1000.0;
const KILOGRAMS_PER_POUND: f64 = 0.45359237;
const KILOGRAMS_PER_OUNCE: f64 = 0.028349523;
const MILLIMETERS_PER_CENTIMETER: f64 = 10.0;
const CENTIMETERS_PER_INCH: f64 = 2.54;

/// Unit a package weight is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kilogram,
    Gram,
    Pound,
    Ounce,
}

impl WeightUnit {
    pub fn from_str(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Some(Self::Kilogram),
            "g" | "gram" | "grams" => Some(Self::Gram),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Pound),
            "oz" | "ounce" | "ounces" => Some(Self::Ounce),
            _ => None,
        }
    }
}

/// Unit a package dimension is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    Centimeter,
    Millimeter,
    Inch,
}

impl DimensionUnit {
    pub fn from_str(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Some(Self::Centimeter),
            "mm" | "millimeter" | "millimeters" => Some(Self::Millimeter),
            "in" | "inch" | "inches" => Some(Self::Inch),
            _ => None,
        }
    }
}

/// Convert a weight to kilograms
pub fn weight_to_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kilogram => value,
        WeightUnit::Gram => value / GRAMS_PER_KILOGRAM,
        WeightUnit::Pound => value * KILOGRAMS_PER_POUND,
        WeightUnit::Ounce => value * KILOGRAMS_PER_OUNCE,
    }
}

/// Convert kilograms back into `unit`
pub fn kg_to_weight(kilograms: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kilogram => kilograms,
        WeightUnit::Gram => kilograms * GRAMS_PER_KILOGRAM,
        WeightUnit::Pound => kilograms / KILOGRAMS_PER_POUND,
        WeightUnit::Ounce => kilograms / KILOGRAMS_PER_OUNCE,
    }
}

/// Convert a length to centimeters
pub fn dimension_to_cm(value: f64, unit: DimensionUnit) -> f64 {
    match unit {
        DimensionUnit::Centimeter => value,
        DimensionUnit::Millimeter => value / MILLIMETERS_PER_CENTIMETER,
        DimensionUnit::Inch => value * CENTIMETERS_PER_INCH,
    }
}

/// Convert centimeters back into `unit`
pub fn cm_to_dimension(centimeters: f64, unit: DimensionUnit) -> f64 {
    match unit {
        DimensionUnit::Centimeter => centimeters,
        DimensionUnit::Millimeter => centimeters * MILLIMETERS_PER_CENTIMETER,
        DimensionUnit::Inch => centimeters / CENTIMETERS_PER_INCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_weight_to_kg_factors() {
        assert_eq!(weight_to_kg(1000.0, WeightUnit::Gram), 1.0);
        assert_eq!(weight_to_kg(2500.0, WeightUnit::Gram), 2.5);
        assert_eq!(weight_to_kg(3.2, WeightUnit::Kilogram), 3.2);
        assert!((weight_to_kg(1.0, WeightUnit::Pound) - 0.45359237).abs() < TOLERANCE);
        assert!((weight_to_kg(1.0, WeightUnit::Ounce) - 0.028349523).abs() < TOLERANCE);
    }

    #[test]
    fn test_dimension_to_cm_factors() {
        assert_eq!(dimension_to_cm(1.0, DimensionUnit::Inch), 2.54);
        assert_eq!(dimension_to_cm(300.0, DimensionUnit::Millimeter), 30.0);
        assert_eq!(dimension_to_cm(42.0, DimensionUnit::Centimeter), 42.0);
    }

    #[test]
    fn test_conversions_invert() {
        let weights = [0.5, 1.0, 17.25, 1234.0];
        let weight_units = [
            WeightUnit::Kilogram,
            WeightUnit::Gram,
            WeightUnit::Pound,
            WeightUnit::Ounce,
        ];
        for &value in &weights {
            for &unit in &weight_units {
                let back = kg_to_weight(weight_to_kg(value, unit), unit);
                assert!((back - value).abs() < value * TOLERANCE, "{value} {unit:?}");
            }
        }

        let lengths = [0.1, 2.0, 35.5, 300.0];
        let length_units = [
            DimensionUnit::Centimeter,
            DimensionUnit::Millimeter,
            DimensionUnit::Inch,
        ];
        for &value in &lengths {
            for &unit in &length_units {
                let back = cm_to_dimension(dimension_to_cm(value, unit), unit);
                assert!((back - value).abs() < value * TOLERANCE, "{value} {unit:?}");
            }
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!(WeightUnit::from_str("KG"), Some(WeightUnit::Kilogram));
        assert_eq!(WeightUnit::from_str(" lbs "), Some(WeightUnit::Pound));
        assert_eq!(WeightUnit::from_str("stone"), None);
        assert_eq!(DimensionUnit::from_str("mm"), Some(DimensionUnit::Millimeter));
        assert_eq!(DimensionUnit::from_str("inch"), Some(DimensionUnit::Inch));
        assert_eq!(DimensionUnit::from_str("ft"), None);
    }
}
