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


//! DHL adapters
//!
//! Shipping, Pickup and Returns share one OAuth credential set and hence
//! one [`TokenCache`]; [`DhlParcelClients`] wires them up together.
//! Internetmarke, Location Finder and the XML tracking API authenticate
//! independently.

pub mod common;
pub mod internetmarke;
pub mod location_finder;
pub mod pickup;
pub mod returns;
pub mod shipping;
pub mod tracking_xml;

pub use internetmarke::{CheckoutRequest, CheckoutResult, InternetmarkeClient, StampPosition, Voucher, VoucherLayout, VoucherPosition};
pub use location_finder::LocationFinderClient;
pub use pickup::DhlPickupClient;
pub use returns::DhlReturnsClient;
pub use shipping::{
    CashOnDelivery, CustomsItem, DhlConsignee, DhlCustoms, DhlServices, DhlShipmentRequest, DhlShippingClient,
    Endorsement, ExportType, VisualAgeCheck,
};
pub use tracking_xml::DhlTrackingClient;

use crate::auth::{DhlPasswordGrant, TokenCache};
use crate::config::DhlParcelConfig;
use crate::error::{Carrier, Result};
use crate::http::HttpTransport;
use std::sync::Arc;

/// The Parcel DE clients over a single token cache
pub struct DhlParcelClients {
    pub shipping: DhlShippingClient,
    pub pickup: DhlPickupClient,
    pub returns: DhlReturnsClient,
    tokens: Arc<TokenCache>,
}

impl DhlParcelClients {
    pub fn new(config: &DhlParcelConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let grant = DhlPasswordGrant::new(transport.clone(), config)?;
        let tokens = Arc::new(TokenCache::new(Carrier::Dhl, Arc::new(grant)));

        Ok(Self {
            shipping: DhlShippingClient::new(config, transport.clone(), tokens.clone())?,
            pickup: DhlPickupClient::new(config, transport.clone(), tokens.clone())?,
            returns: DhlReturnsClient::new(config, transport, tokens.clone())?,
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }
}
