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


//! DHL Internetmarke (Post & Parcel Germany one-click API)
//!
//! Stamps are bought in two steps: a shop order id is reserved with
//! `POST /app/shoppingcart`, then the cart is paid from the Portokasse
//! wallet and rendered with `POST /app/shoppingcart/pdf`.
//!
//! Authentication uses the Internetmarke token endpoint (`/user`), which
//! is separate from the Parcel DE token endpoint, so this client owns its
//! own [`TokenCache`].

use crate::auth::{BearerAuthorizer, InternetmarkeGrant, TokenCache};
use crate::carriers::format::non_blank;
use crate::config::InternetmarkeConfig;
use crate::domain::Address;
use crate::error::{Carrier, CarrierError, Result};
use crate::http::{ApiClient, HttpTransport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which layout the voucher is printed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherLayout {
    #[default]
    AddressZone,
    FrankingZone,
}

/// Placement of a voucher on the label sheet (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPosition {
    pub label_x: u32,
    pub label_y: u32,
    pub page: u32,
}

impl Default for VoucherPosition {
    fn default() -> Self {
        Self {
            label_x: 1,
            label_y: 1,
            page: 1,
        }
    }
}

/// One stamp in the cart
#[derive(Debug, Clone, PartialEq)]
pub struct StampPosition {
    /// PPL product code, e.g. 1 for "Standardbrief"
    pub product_code: u32,
    /// Product price in euro cents, summed into the cart total
    pub price_cents: u32,
    pub sender: Address,
    pub receiver: Address,
    pub layout: VoucherLayout,
    pub position: VoucherPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub shop_order_id: String,
    pub page_format_id: u32,
    pub positions: Vec<StampPosition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub voucher_id: String,
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResult {
    pub shop_order_id: String,
    /// Download link of the rendered PDF
    pub link: String,
    pub vouchers: Vec<Voucher>,
    /// Remaining Portokasse balance in euro cents
    pub wallet_balance: Option<i64>,
}

// ============================================================================
// WIRE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImAddress {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_name: Option<String>,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl WireImAddress {
    fn from_address(address: &Address) -> Self {
        let address_line1 = match non_blank(&address.house_number) {
            Some(house) => format!("{} {}", address.street.trim(), house),
            None => address.street.trim().to_string(),
        };
        Self {
            name: address.name_line(0).unwrap_or_default().to_string(),
            additional_name: address.name_line(1).map(str::to_string),
            address_line1,
            address_line2: address.address_addition.as_deref().and_then(non_blank),
            postal_code: address.postal_code.clone(),
            city: address.city.clone(),
            country: address.country_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAddressPair {
    pub sender: WireImAddress,
    pub receiver: WireImAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePosition {
    pub product_code: u32,
    pub address: WireAddressPair,
    pub voucher_layout: VoucherLayout,
    pub position_type: String,
    pub position: VoucherPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCheckoutRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub shop_order_id: String,
    pub total: u64,
    pub create_manifest: bool,
    pub create_shipping_list: String,
    pub dpi: String,
    pub page_format_id: u32,
    pub positions: Vec<WirePosition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOrderResponse {
    #[serde(default)]
    pub shop_order_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCheckoutResponse {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub shopping_cart: Option<WireShoppingCart>,
    /// Spelled this way by the API
    #[serde(default)]
    pub wallet_ballance: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShoppingCart {
    #[serde(default)]
    pub shop_order_id: Option<String>,
    #[serde(default)]
    pub voucher_list: Vec<WireVoucher>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVoucher {
    #[serde(default)]
    pub voucher_id: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
}

// ============================================================================
// MAPPING
// ============================================================================

pub fn build_checkout(request: &CheckoutRequest) -> Result<WireCheckoutRequest> {
    let shop_order_id = non_blank(&request.shop_order_id)
        .ok_or_else(|| CarrierError::invalid_request("shop order id is required for checkout"))?;
    if request.positions.is_empty() {
        return Err(CarrierError::invalid_request("checkout needs at least one stamp position"));
    }

    let mut positions = Vec::with_capacity(request.positions.len());
    for stamp in &request.positions {
        stamp.sender.validate()?;
        stamp.receiver.validate()?;
        positions.push(WirePosition {
            product_code: stamp.product_code,
            address: WireAddressPair {
                sender: WireImAddress::from_address(&stamp.sender),
                receiver: WireImAddress::from_address(&stamp.receiver),
            },
            voucher_layout: stamp.layout,
            position_type: "AppShoppingCartPDFPosition".to_string(),
            position: stamp.position,
        });
    }

    Ok(WireCheckoutRequest {
        kind: "AppShoppingCartPDFRequest".to_string(),
        shop_order_id,
        total: request.positions.iter().map(|p| u64::from(p.price_cents)).sum(),
        create_manifest: false,
        create_shipping_list: "0".to_string(),
        dpi: "DPI300".to_string(),
        page_format_id: request.page_format_id,
        positions,
    })
}

pub fn map_checkout_response(response: &WireCheckoutResponse, raw_body: &str) -> Result<CheckoutResult> {
    let cart = response
        .shopping_cart
        .as_ref()
        .ok_or_else(|| CarrierError::empty(Carrier::Dhl, "Internetmarke shopping cart"))?;

    let vouchers: Vec<Voucher> = cart
        .voucher_list
        .iter()
        .filter_map(|v| {
            v.voucher_id.clone().map(|voucher_id| Voucher {
                voucher_id,
                track_id: v.track_id.clone(),
            })
        })
        .collect();
    if vouchers.is_empty() {
        return Err(CarrierError::empty(Carrier::Dhl, "Internetmarke vouchers"));
    }

    let missing = |what: &str| {
        CarrierError::deserialization(Carrier::Dhl, format!("checkout response has no {}", what), Some(raw_body.to_string()))
    };

    Ok(CheckoutResult {
        shop_order_id: cart.shop_order_id.clone().ok_or_else(|| missing("shopOrderId"))?,
        link: response.link.clone().ok_or_else(|| missing("link"))?,
        vouchers,
        wallet_balance: response.wallet_ballance,
    })
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct InternetmarkeClient {
    api: ApiClient,
    tokens: Arc<TokenCache>,
}

impl InternetmarkeClient {
    pub fn new(config: &InternetmarkeConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let grant = InternetmarkeGrant::new(transport.clone(), config)?;
        let tokens = Arc::new(TokenCache::new(Carrier::Dhl, Arc::new(grant)));
        Ok(Self::with_tokens(config, transport, tokens))
    }

    /// Use an existing cache, e.g. one shared by several clients
    pub fn with_tokens(config: &InternetmarkeConfig, transport: Arc<dyn HttpTransport>, tokens: Arc<TokenCache>) -> Self {
        let authorizer = BearerAuthorizer::new(tokens.clone());
        Self {
            api: ApiClient::new(Carrier::Dhl, config.base_url.clone(), transport, Arc::new(authorizer)),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Reserve a shop order id for the next checkout
    pub async fn create_shop_order(&self) -> Result<String> {
        let body = serde_json::json!({ "type": "RequestInitShoppingCart" });
        let response: ShopOrderResponse = self.api.post("/app/shoppingcart", &[], &body).await?;

        let id = response
            .shop_order_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CarrierError::empty(Carrier::Dhl, "shop order id"))?;
        info!(shop_order_id = %id, "Internetmarke shop order created");
        Ok(id)
    }

    /// Pay the cart from the wallet and render the stamps as PDF
    pub async fn checkout_pdf(&self, request: &CheckoutRequest) -> Result<CheckoutResult> {
        let checkout = build_checkout(request)?;
        let raw: serde_json::Value = self
            .api
            .post("/app/shoppingcart/pdf", &[("validate", "true".to_string())], &checkout)
            .await?;
        let raw_body = raw.to_string();
        let response: WireCheckoutResponse = serde_json::from_value(raw).map_err(|e| {
            CarrierError::deserialization(Carrier::Dhl, e.to_string(), Some(raw_body.clone()))
        })?;

        let result = map_checkout_response(&response, &raw_body)?;
        info!(
            shop_order_id = %result.shop_order_id,
            vouchers = result.vouchers.len(),
            "Internetmarke checkout completed"
        );
        Ok(result)
    }
}
