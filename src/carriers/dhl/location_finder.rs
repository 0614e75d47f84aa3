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


//! DHL Location Finder (unified API, v1)
//!
//! `GET /find-by-address` returns Packstations, post offices and parcel
//! shops near an address. The key goes into the `DHL-API-Key` header.
//! Finding nothing is a valid result, not an error.

use crate::auth::ApiKeyAuthorizer;
use crate::carriers::format::non_blank;
use crate::config::LocationFinderConfig;
use crate::domain::{LocationQuery, ServicePoint, ServicePointAddress, ServicePointKind};
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub locations: Vec<WireLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub location: Option<WireLocationInfo>,
    #[serde(default)]
    pub place: Option<WirePlace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLocationInfo {
    #[serde(default)]
    pub ids: Vec<WireLocationId>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocationId {
    #[serde(default)]
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePlace {
    #[serde(default)]
    pub address: Option<WirePlaceAddress>,
    #[serde(default)]
    pub geo: Option<WireGeo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlaceAddress {
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub address_locality: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireGeo {
    pub latitude: f64,
    pub longitude: f64,
}

fn map_kind(kind: Option<&str>) -> ServicePointKind {
    match kind.map(str::to_ascii_lowercase).as_deref() {
        Some("locker") => ServicePointKind::Locker,
        Some("postoffice") | Some("postbank") => ServicePointKind::PostOffice,
        Some("servicepoint") => ServicePointKind::ParcelShop,
        _ => ServicePointKind::Other,
    }
}

/// Query parameters for `/find-by-address`
pub fn build_query(query: &LocationQuery) -> Result<Vec<(&'static str, String)>> {
    let country = non_blank(&query.country_code)
        .ok_or_else(|| CarrierError::invalid_request("country code is required for a location search"))?;

    let postal_code = query.postal_code.as_deref().and_then(non_blank);
    let city = query.city.as_deref().and_then(non_blank);
    if postal_code.is_none() && city.is_none() {
        return Err(CarrierError::invalid_request("location search needs a postal code or a city"));
    }

    let mut params = vec![("countryCode", country)];
    params.extend(postal_code.map(|v| ("postalCode", v)));
    params.extend(city.map(|v| ("addressLocality", v)));
    params.extend(query.street.as_deref().and_then(non_blank).map(|v| ("streetAddress", v)));
    params.extend(query.radius_meters.map(|v| ("radius", v.to_string())));
    params.extend(query.limit.map(|v| ("limit", v.to_string())));
    Ok(params)
}

/// Locations without an id are skipped
pub fn map_locations(response: &LocationsResponse) -> Vec<ServicePoint> {
    response
        .locations
        .iter()
        .filter_map(|location| {
            let info = location.location.as_ref();
            let id = info?.ids.iter().find_map(|id| id.location_id.clone())?;
            let address = location.place.as_ref().and_then(|p| p.address.as_ref());
            let geo = location.place.as_ref().and_then(|p| p.geo);

            Some(ServicePoint {
                id,
                name: location.name.clone().unwrap_or_default(),
                kind: map_kind(info.and_then(|i| i.kind.as_deref())),
                address: ServicePointAddress {
                    street: address.and_then(|a| a.street_address.clone()),
                    postal_code: address.and_then(|a| a.postal_code.clone()),
                    city: address.and_then(|a| a.address_locality.clone()),
                    country_code: address.and_then(|a| a.country_code.clone()),
                },
                distance_meters: location.distance.filter(|d| *d >= 0.0).map(|d| d.round() as u32),
                latitude: geo.map(|g| g.latitude),
                longitude: geo.map(|g| g.longitude),
            })
        })
        .collect()
}

pub struct LocationFinderClient {
    api: ApiClient,
}

impl LocationFinderClient {
    pub fn new(config: &LocationFinderConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let authorizer = ApiKeyAuthorizer::new("DHL-API-Key", config.api_key.clone());
        Ok(Self {
            api: ApiClient::new(Carrier::Dhl, config.base_url.clone(), transport, Arc::new(authorizer)),
        })
    }

    pub async fn find_by_address(&self, query: &LocationQuery) -> Result<Vec<ServicePoint>> {
        let params = build_query(query)?;
        let response: LocationsResponse = self.api.get("/find-by-address", &params).await?;

        let points = map_locations(&response);
        debug!(found = points.len(), "DHL locations found");
        Ok(points)
    }
}
