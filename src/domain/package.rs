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


//! Package weight and dimensions

use crate::units::{dimension_to_cm, weight_to_kg, DimensionUnit, WeightUnit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    pub fn kilograms(value: f64) -> Self {
        Self::new(value, WeightUnit::Kilogram)
    }

    pub fn grams(value: f64) -> Self {
        Self::new(value, WeightUnit::Gram)
    }

    pub fn to_kg(&self) -> f64 {
        weight_to_kg(self.value, self.unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: DimensionUnit,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64, unit: DimensionUnit) -> Self {
        Self { length, width, height, unit }
    }

    /// (length, width, height) in centimeters, unrounded
    pub fn to_cm(&self) -> (f64, f64, f64) {
        (
            dimension_to_cm(self.length, self.unit),
            dimension_to_cm(self.width, self.unit),
            dimension_to_cm(self.height, self.unit),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub weight: Weight,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

impl Package {
    pub fn new(weight: Weight) -> Self {
        Self { weight, dimensions: None }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}
