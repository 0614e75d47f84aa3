//! Parcel Carriers - multi-carrier shipping adapters
//!
//! Maps a carrier-agnostic shipment model onto the wire formats of:
//! - DHL Parcel DE (Shipping, Pickup, Returns) with a shared OAuth token cache
//! - DHL Internetmarke, Location Finder and the legacy XML tracking API
//! - GO! Express (shipping and tracking)
//!
//! HTTP goes through the [`http::HttpTransport`] trait; [`http::ReqwestTransport`]
//! is the production implementation.
//!
//! # Example
//! ```no_run
//! use parcel_carriers::carriers::dhl::{DhlParcelClients, DhlShipmentRequest};
//! use parcel_carriers::config::DhlParcelConfig;
//! use parcel_carriers::domain::{Address, Package, ShipmentRequest, Weight};
//! use parcel_carriers::http::ReqwestTransport;
//! use std::sync::Arc;
//!
//! # async fn run() -> parcel_carriers::Result<()> {
//! let config = DhlParcelConfig::from_env()?;
//! let transport = Arc::new(ReqwestTransport::with_timeout(config.timeout)?);
//! let dhl = DhlParcelClients::new(&config, transport)?;
//!
//! let shipment = ShipmentRequest::new(
//!     Address::new("My Shop GmbH", "Sträßchensweg", "10", "53113", "Bonn", "DEU"),
//!     Address::new("Maria Musterfrau", "Kurt-Schumacher-Str.", "20", "53113", "Bonn", "DEU"),
//!     Package::new(Weight::grams(2500.0)),
//! );
//! let created = dhl
//!     .shipping
//!     .create_shipment(&DhlShipmentRequest::new(shipment, "33333333330102", "V01PAK"))
//!     .await?;
//! println!("{}", created.shipment_number);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod carriers;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod units;

// Re-export commonly used types
pub use error::{Carrier, CarrierError, Result};
pub use units::{cm_to_dimension, dimension_to_cm, kg_to_weight, weight_to_kg, DimensionUnit, WeightUnit};
