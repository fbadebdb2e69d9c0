//! Canonical demo records.
//!
//! The same set is used to seed the hosted indices and as the in-memory
//! fallback when no search credentials are configured.

use crate::error::{AppError, Result};
use crate::records::types::{
    BenchmarkRecord, CropRotationRecord, LogisticsRecord, MarketPriceRecord, Record,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub market_prices: Vec<MarketPriceRecord>,
    #[serde(default)]
    pub crop_rotation: Vec<CropRotationRecord>,
    #[serde(default)]
    pub logistics: Vec<LogisticsRecord>,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkRecord>,
}

impl Dataset {
    /// Load a dataset from a JSON file with the four collections as top-level keys.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::DatasetError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let dataset: Dataset = serde_json::from_str(&raw).map_err(|e| {
            AppError::DatasetError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            market_prices = dataset.market_prices.len(),
            crop_rotation = dataset.crop_rotation.len(),
            logistics = dataset.logistics.len(),
            benchmarks = dataset.benchmarks.len(),
            "Fallback dataset loaded"
        );

        Ok(dataset)
    }

    /// Give every record without an id a stable `mock-*` id, and stamp
    /// unset market `lastUpdated` values with `now_ms`.
    pub fn with_fallback_ids(mut self, now_ms: i64) -> Self {
        assign_ids(&mut self.market_prices, "mock-mp");
        assign_ids(&mut self.crop_rotation, "mock-cr");
        assign_ids(&mut self.logistics, "mock-lg");
        assign_ids(&mut self.benchmarks, "mock-bm");
        for record in &mut self.market_prices {
            if record.last_updated == 0 {
                record.last_updated = now_ms;
            }
        }
        self
    }

    pub fn demo() -> Self {
        Self {
            market_prices: vec![
                market("California", "Almonds", 4.50, "USD/lb", 85),
                market("California", "Grapes", 800.0, "USD/ton", 70),
                market("California", "Walnuts", 3.20, "USD/lb", 72),
                market("California", "Lettuce", 22.0, "USD/crate", 65),
                market("California", "Tomatoes", 35.0, "USD/box", 78),
                market("Midwest", "Corn", 4.80, "USD/bu", 60),
                market("Midwest", "Soybeans", 13.20, "USD/bu", 75),
                market("Midwest", "Wheat", 6.50, "USD/bu", 55),
                market("Pacific NW", "Apples", 0.45, "USD/lb", 65),
                market("Pacific NW", "Cherries", 3.80, "USD/lb", 82),
                market("Pacific NW", "Potatoes", 8.50, "USD/cwt", 58),
                market("Southeast", "Peaches", 1.20, "USD/lb", 68),
                market("Southeast", "Cotton", 0.85, "USD/lb", 52),
                market("Texas", "Cotton", 0.82, "USD/lb", 54),
                market("Texas", "Sorghum", 5.20, "USD/bu", 48),
            ],
            crop_rotation: vec![
                rotation("Loam", "9", "Corn", "Soybeans", 10, "High"),
                rotation("Loam", "9", "Soybeans", "Corn", 10, "High"),
                rotation("Loam", "9", "Wheat", "Soybeans", 15, "High"),
                rotation("Clay", "5", "Wheat", "Canola", 20, "Medium"),
                rotation("Clay", "5", "Canola", "Wheat", 25, "Medium"),
                rotation("Sandy", "10", "Tomato", "Pepper", 90, "Low (Disease Risk)"),
                rotation("Sandy", "10", "Lettuce", "Broccoli", 30, "Medium"),
                rotation("Loam", "7", "Cotton", "Peanuts", 20, "High"),
                rotation("Loam", "7", "Peanuts", "Cotton", 15, "High"),
            ],
            logistics: vec![
                route("California", "New York", "Whole Foods", "CoolTrans", 150.0, 4),
                route("California", "Chicago", "Costco", "FreshFreight", 120.0, 3),
                route("California", "Los Angeles", "Ralphs", "LocalHaul", 40.0, 1),
                route("Midwest", "Chicago", "ADM", "RailFreight", 25.0, 1),
                route("Midwest", "New Orleans", "Cargill", "BargeLogistics", 18.0, 5),
                route("Pacific NW", "Los Angeles", "Ralphs", "WestCoast Trucking", 80.0, 2),
                route("Pacific NW", "Seattle", "Safeway", "NW Express", 30.0, 1),
                route("Southeast", "Atlanta", "Publix", "SE Logistics", 35.0, 1),
                route("Texas", "Houston", "HEB", "TX Freight", 28.0, 1),
            ],
            benchmarks: vec![
                benchmark(
                    "California",
                    &["Almonds", "Grapes"],
                    "15%",
                    "High",
                    "Drip Irrigation, Cover Crops",
                ),
                benchmark(
                    "California",
                    &["Tomatoes", "Lettuce"],
                    "12%",
                    "Medium",
                    "Greenhouse, Hydroponics",
                ),
                benchmark(
                    "Midwest",
                    &["Corn", "Soybeans"],
                    "8%",
                    "Medium",
                    "No-Till, Precision Ag",
                ),
                benchmark(
                    "Midwest",
                    &["Wheat", "Corn"],
                    "7%",
                    "Medium",
                    "Cover Crops, GPS Guidance",
                ),
                benchmark(
                    "Pacific NW",
                    &["Apples", "Cherries"],
                    "18%",
                    "High",
                    "Integrated Pest Management",
                ),
                benchmark(
                    "Southeast",
                    &["Cotton", "Peanuts"],
                    "10%",
                    "Medium",
                    "Crop Rotation, Conservation Tillage",
                ),
            ],
        }
    }
}

fn assign_ids<T: Record>(records: &mut [T], prefix: &str) {
    for (idx, record) in records.iter_mut().enumerate() {
        if record.id().is_empty() {
            record.set_id(format!("{}-{}", prefix, idx));
        }
    }
}

const DEMO_DATE: &str = "2024-01-09";

fn market(
    region: &str,
    crop: &str,
    price: f64,
    unit: &str,
    demand_index: u8,
) -> MarketPriceRecord {
    MarketPriceRecord {
        id: String::new(),
        region: region.to_string(),
        crop: crop.to_string(),
        price,
        unit: unit.to_string(),
        demand_index,
        date: DEMO_DATE.to_string(),
        last_updated: 0,
    }
}

fn rotation(
    soil_type: &str,
    climate_zone: &str,
    previous_crop: &str,
    next_crop: &str,
    risk_score: u8,
    compatibility: &str,
) -> CropRotationRecord {
    CropRotationRecord {
        id: String::new(),
        soil_type: soil_type.to_string(),
        climate_zone: climate_zone.to_string(),
        previous_crop: previous_crop.to_string(),
        next_crop: next_crop.to_string(),
        risk_score,
        compatibility: compatibility.to_string(),
    }
}

fn route(
    origin_region: &str,
    destination_market: &str,
    buyer: &str,
    carrier: &str,
    cost_per_ton: f64,
    transit_days: u32,
) -> LogisticsRecord {
    LogisticsRecord {
        id: String::new(),
        origin_region: origin_region.to_string(),
        destination_market: destination_market.to_string(),
        buyer: buyer.to_string(),
        carrier: carrier.to_string(),
        cost_per_ton,
        transit_days,
    }
}

fn benchmark(
    region: &str,
    crop_mix: &[&str],
    margin: &str,
    yield_level: &str,
    practices: &str,
) -> BenchmarkRecord {
    BenchmarkRecord {
        id: String::new(),
        region: region.to_string(),
        crop_mix: crop_mix.iter().map(|c| c.to_string()).collect(),
        margin: margin.to_string(),
        yield_level: yield_level.to_string(),
        practices: practices.to_string(),
    }
}
