#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `climarisk`: score, forecast, and map climate risk from the terminal.
//!
//! Every command validates its input the same way a service boundary
//! would, then prints the result as pretty JSON on stdout. Logs go to
//! stderr, filtered by `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use climarisk_bulk::{BulkConfig, score_bulk};
use climarisk_cli_utils::IndicatifProgress;
use climarisk_ensemble::EnsembleScorer;
use climarisk_request_models::{
    BulkScoreRequest, DEFAULT_FORECAST_YEARS, DEFAULT_ZOOM, ForecastRequest,
    PropertyAnalysisRequest, RiskMapRequest, ScoreRequest, parse_bbox, parse_property_type,
    parse_risk_layer,
};
use climarisk_risk_models::{BoundingBox, Covariates, PropertyContext, PropertyType, RiskLayer};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "climarisk", about = "Location-based climate risk scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single location
    Score {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        property: PropertyArgs,
    },
    /// Project a location's score into future years
    Forecast {
        #[command(flatten)]
        location: LocationArgs,
        /// Comma-separated year offsets, each in 1..=50
        #[arg(long, value_delimiter = ',')]
        years: Option<Vec<u32>>,
        #[command(flatten)]
        property: PropertyArgs,
    },
    /// Score a property and list mitigation recommendations
    Analyze {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        property: PropertyArgs,
    },
    /// Score every property in a JSON file (`{"properties": [...]}`)
    Bulk {
        /// Path to the request file
        #[arg(long)]
        input: PathBuf,
        /// Properties scored at once (overrides `CLIMARISK_BULK_CONCURRENCY`)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Sample one risk layer over a bounding box
    RiskMap {
        /// Bounding box as `west,south,east,north`
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: BoundingBox,
        /// flood, heat, drought, groundwater, or overall
        #[arg(long, value_parser = parse_risk_layer, default_value = "overall")]
        layer: RiskLayer,
        /// Cells per side, 1..=18
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,
    },
}

#[derive(Args)]
struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
}

#[derive(Args)]
struct PropertyArgs {
    /// residential, commercial, industrial, or agricultural
    #[arg(long, value_parser = parse_property_type, default_value = "residential")]
    property_type: PropertyType,
    /// Floor area in square meters
    #[arg(long)]
    area_sqm: Option<f64>,
    /// Floor number (0 = ground)
    #[arg(long)]
    floor: Option<u32>,
    /// Elevation in meters
    #[arg(long, allow_negative_numbers = true)]
    elevation: Option<f64>,
    /// Annual precipitation in millimeters
    #[arg(long)]
    annual_precipitation: Option<f64>,
    /// Current groundwater level in meters
    #[arg(long, allow_negative_numbers = true)]
    current_water_level: Option<f64>,
    /// Whether the site is urban (inferred from nearby cities when omitted)
    #[arg(long)]
    urban: Option<bool>,
    /// People per square kilometer
    #[arg(long)]
    population_density: Option<f64>,
}

impl PropertyArgs {
    const fn context(&self) -> PropertyContext {
        PropertyContext {
            property_type: self.property_type,
            area_sqm: self.area_sqm,
            floor: self.floor,
            covariates: Covariates {
                elevation: self.elevation,
                annual_precipitation: self.annual_precipitation,
                current_water_level: self.current_water_level,
                is_urban: self.urban,
                population_density: self.population_density,
            },
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = climarisk_cli_utils::init_logger();
    let cli = Cli::parse();
    let scorer = EnsembleScorer::new();

    match cli.command {
        Commands::Score { location, property } => {
            let request = ScoreRequest {
                latitude: location.lat,
                longitude: location.lon,
                context: property.context(),
            };
            let point = request.validate()?;
            log::info!("Scoring ({}, {})", point.latitude, point.longitude);
            print_json(&scorer.score(point, &request.context))?;
        }
        Commands::Forecast {
            location,
            years,
            property,
        } => {
            let request = ForecastRequest {
                latitude: location.lat,
                longitude: location.lon,
                years: years.unwrap_or_else(|| DEFAULT_FORECAST_YEARS.to_vec()),
                context: property.context(),
            };
            let (point, years) = request.validate()?;
            log::info!(
                "Forecasting ({}, {}) for years {years:?}",
                point.latitude,
                point.longitude
            );
            let result = climarisk_ensemble::forecast(&scorer, point, &years, &request.context);
            print_json(&result)?;
        }
        Commands::Analyze { location, property } => {
            let request = PropertyAnalysisRequest {
                address: None,
                latitude: Some(location.lat),
                longitude: Some(location.lon),
                context: property.context(),
            };
            let point = request.validate()?;
            log::info!("Analyzing ({}, {})", point.latitude, point.longitude);
            print_json(&climarisk_ensemble::analyze(&scorer, point, &request.context))?;
        }
        Commands::Bulk { input, concurrency } => {
            let config = BulkConfig::from_env().with_concurrency(concurrency);
            let raw = tokio::fs::read_to_string(&input).await?;
            let request: BulkScoreRequest = serde_json::from_str(&raw)?;
            log::info!(
                "Loaded {} properties from {}",
                request.properties.len(),
                input.display()
            );

            let progress = IndicatifProgress::bulk_bar(&multi, "Scoring properties");
            let response = score_bulk(Arc::new(scorer), request, &config, progress).await?;
            print_json(&response)?;
        }
        Commands::RiskMap { bbox, layer, zoom } => {
            let request = RiskMapRequest {
                bbox: format!("{},{},{},{}", bbox.west, bbox.south, bbox.east, bbox.north),
                layer,
                zoom,
            };
            let bbox = request.validate()?;
            log::info!("Sampling {layer} risk over {bbox:?} at zoom {zoom}");
            print_json(&climarisk_ensemble::risk_map(&scorer, bbox, layer, zoom))?;
        }
    }

    Ok(())
}
