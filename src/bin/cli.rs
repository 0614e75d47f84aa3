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


use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use parcel_carriers::carriers::dhl::{DhlTrackingClient, LocationFinderClient};
use parcel_carriers::carriers::go_express::GoExpressClient;
use parcel_carriers::config::{DhlTrackingConfig, GoExpressConfig, LocationFinderConfig};
use parcel_carriers::domain::{LocationQuery, TrackingResult};
use parcel_carriers::http::ReqwestTransport;
use parcel_carriers::{cm_to_dimension, dimension_to_cm, kg_to_weight, weight_to_kg, DimensionUnit, WeightUnit};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "parcel-carriers-cli")]
#[command(about = "Parcel Carriers CLI - Desktop testing tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a weight between units (kg, g, lb, oz)
    ConvertWeight {
        value: f64,
        from: String,
        #[arg(long, default_value = "kg")]
        to: String,
    },
    /// Convert a length between units (cm, mm, in)
    ConvertDimension {
        value: f64,
        from: String,
        #[arg(long, default_value = "cm")]
        to: String,
    },
    /// Track a DHL piece code via the XML tracking API
    TrackDhl {
        piece_code: String,
    },
    /// Track a GO! Express shipment
    TrackGo {
        hwb_number: String,
    },
    /// Find DHL service points near an address
    FindLocations {
        #[arg(long, default_value = "DE")]
        country: String,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

fn weight_unit(unit: &str) -> anyhow::Result<WeightUnit> {
    WeightUnit::from_str(unit).ok_or_else(|| anyhow!("unknown weight unit '{}'", unit))
}

fn dimension_unit(unit: &str) -> anyhow::Result<DimensionUnit> {
    DimensionUnit::from_str(unit).ok_or_else(|| anyhow!("unknown dimension unit '{}'", unit))
}

fn print_tracking(result: &TrackingResult) {
    println!("Shipment: {}", result.shipment_number);
    println!("Status:   {}", result.status);
    if let Some(eta) = result.estimated_delivery {
        println!("ETA:      {}", eta);
    }
    for event in &result.events {
        let when = event.timestamp.map(|ts| ts.to_rfc3339()).unwrap_or_else(|| "-".to_string());
        let location = event.location.as_deref().unwrap_or("-");
        println!("  {}  {:<24}  {}", when, location, event.description);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ConvertWeight { value, from, to } => {
            let kg = weight_to_kg(value, weight_unit(&from)?);
            println!("{} {} = {} {}", value, from, kg_to_weight(kg, weight_unit(&to)?), to);
        }
        Commands::ConvertDimension { value, from, to } => {
            let cm = dimension_to_cm(value, dimension_unit(&from)?);
            println!("{} {} = {} {}", value, from, cm_to_dimension(cm, dimension_unit(&to)?), to);
        }
        Commands::TrackDhl { piece_code } => {
            let config = DhlTrackingConfig::from_env().context("loading DHL tracking configuration")?;
            let client = DhlTrackingClient::new(config, Arc::new(ReqwestTransport::new()?))?;
            print_tracking(&client.track(&piece_code).await?);
        }
        Commands::TrackGo { hwb_number } => {
            let config = GoExpressConfig::from_env().context("loading GO! Express configuration")?;
            let client = GoExpressClient::new(config, Arc::new(ReqwestTransport::new()?))?;
            print_tracking(&client.track_shipment(&hwb_number).await?);
        }
        Commands::FindLocations {
            country,
            postal_code,
            city,
            street,
            radius,
            limit,
        } => {
            let config = LocationFinderConfig::from_env().context("loading DHL location finder configuration")?;
            let client = LocationFinderClient::new(&config, Arc::new(ReqwestTransport::new()?))?;
            let query = LocationQuery {
                country_code: country,
                postal_code,
                city,
                street,
                radius_meters: radius,
                limit: Some(limit),
            };

            let points = client.find_by_address(&query).await?;
            if points.is_empty() {
                println!("No service points found");
            }
            for point in points {
                let distance = point.distance_meters.map(|d| format!("{} m", d)).unwrap_or_default();
                println!(
                    "{:<16} {:<10} {:<32} {} {}  {}",
                    point.id,
                    format!("{:?}", point.kind),
                    point.name,
                    point.address.postal_code.as_deref().unwrap_or(""),
                    point.address.city.as_deref().unwrap_or(""),
                    distance
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_is_info() {
        assert_eq!(EnvFilter::new(DEFAULT_LOG_FILTER).to_string(), "info");
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(weight_unit("lb").unwrap(), WeightUnit::Pound);
        assert!(dimension_unit("furlong").is_err());
    }
}
