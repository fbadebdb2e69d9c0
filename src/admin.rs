//! Index administration: status, settings plus demo seeding, and market price sync.
//!
//! Admin operations never degrade. Without search credentials they fail with
//! [`AppError::NotConfigured`] instead of touching the fallback dataset.

use crate::error::{AppError, Result};
use crate::records::{Category, Dataset, MarketPriceRecord, Record};
use crate::store::SearchClient;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStatus {
    pub configured: bool,
    pub app_id_masked: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeSummary {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub success: bool,
    pub indexed: usize,
}

pub struct IndexAdmin {
    client: Option<Arc<SearchClient>>,
    app_id_masked: Option<String>,
}

impl IndexAdmin {
    pub fn new(client: Option<Arc<SearchClient>>, app_id_masked: Option<String>) -> Self {
        Self {
            client,
            app_id_masked,
        }
    }

    pub fn status(&self) -> AdminStatus {
        AdminStatus {
            configured: self.client.is_some(),
            app_id_masked: self.app_id_masked.clone(),
        }
    }

    fn client(&self) -> Result<&SearchClient> {
        self.client.as_deref().ok_or_else(|| {
            AppError::NotConfigured(
                "search credentials (ALGOLIA_APP_ID, ALGOLIA_WRITE_KEY) are not set".to_string(),
            )
        })
    }

    /// Apply settings to all four indices, then seed them from `dataset`.
    pub async fn initialize(&self, dataset: &Dataset) -> Result<InitializeSummary> {
        let client = self.client()?;

        for category in Category::ALL {
            client
                .set_settings(category.index_name(), &index_settings(category))
                .await?;
        }

        let now = chrono::Utc::now().timestamp_millis();

        let market: Vec<MarketPriceRecord> = dataset
            .market_prices
            .iter()
            .cloned()
            .map(|mut record| {
                record.last_updated = now;
                record
            })
            .collect();
        let market = seed(&market, |r| vec![&r.region, &r.crop])?;
        let rotation = seed(&dataset.crop_rotation, |r| {
            vec![&r.soil_type, &r.previous_crop, &r.next_crop]
        })?;
        let logistics = seed(&dataset.logistics, |r| vec![&r.origin_region, &r.buyer])?;
        let benchmarks = seed(&dataset.benchmarks, |r| vec![&r.region])?;

        client
            .save_objects(Category::Market.index_name(), &market)
            .await?;
        client
            .save_objects(Category::Rotation.index_name(), &rotation)
            .await?;
        client
            .save_objects(Category::Logistics.index_name(), &logistics)
            .await?;
        client
            .save_objects(Category::Benchmarks.index_name(), &benchmarks)
            .await?;

        let message = format!(
            "Indices configured and seeded: {} market prices, {} rotation rules, {} logistics routes, {} benchmarks",
            market.len(),
            rotation.len(),
            logistics.len(),
            benchmarks.len()
        );
        tracing::info!(%message, "Index initialization completed");

        Ok(InitializeSummary {
            success: true,
            message,
        })
    }

    /// Validate every price first, then index them all. Nothing is written
    /// when any record is invalid.
    pub async fn sync_market_prices(&self, prices: &[Value]) -> Result<SyncSummary> {
        let records = validate_market_prices(prices)?;
        let client = self.client()?;

        let now = chrono::Utc::now().timestamp_millis();
        let records: Vec<MarketPriceRecord> = records
            .into_iter()
            .map(|mut record| {
                record.last_updated = now;
                record
            })
            .collect();
        let objects = seed(&records, |r| vec![&r.region, &r.crop])?;

        client
            .save_objects(Category::Market.index_name(), &objects)
            .await?;

        tracing::info!(indexed = objects.len(), "Market prices synced");
        Ok(SyncSummary {
            success: true,
            indexed: objects.len(),
        })
    }
}

/// Settings for one index: searchable attributes, facets and custom ranking.
pub fn index_settings(category: Category) -> Value {
    match category {
        Category::Market => json!({
            "searchableAttributes": ["crop", "region"],
            "attributesForFaceting": ["region", "crop"],
            "customRanking": ["desc(lastUpdated)", "desc(demand_index)"],
        }),
        Category::Rotation => json!({
            "searchableAttributes": ["previous_crop", "next_crop", "soil_type", "climate_zone"],
            "attributesForFaceting": ["soil_type", "previous_crop"],
            "customRanking": ["asc(risk_score)"],
        }),
        Category::Logistics => json!({
            "searchableAttributes": ["buyer", "origin_region", "destination_market", "carrier"],
            "attributesForFaceting": ["origin_region"],
            "customRanking": ["asc(cost_per_ton)", "asc(transit_days)"],
        }),
        Category::Benchmarks => json!({
            "searchableAttributes": ["region", "crop_mix", "practices"],
            "attributesForFaceting": ["region"],
        }),
    }
}

/// Deterministic object id: parts and position joined by `-`, lowercased,
/// whitespace runs collapsed to a single `-`.
pub fn seed_id(parts: &[&str], idx: usize) -> String {
    let mut id = parts
        .iter()
        .map(|part| {
            part.split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase()
        })
        .collect::<Vec<_>>()
        .join("-");
    id.push('-');
    id.push_str(&idx.to_string());
    id
}

fn seed<T, F>(records: &[T], key: F) -> Result<Vec<Value>>
where
    T: Record,
    F: Fn(&T) -> Vec<&String>,
{
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let parts: Vec<&str> = key(record).into_iter().map(String::as_str).collect();
            let mut record = record.clone();
            record.set_id(seed_id(&parts, idx));
            serde_json::to_value(&record).map_err(AppError::from)
        })
        .collect()
}

/// Check each submitted price field by field. The first failure names the
/// record position and field, e.g. `prices[2].demand_index`.
pub fn validate_market_prices(prices: &[Value]) -> Result<Vec<MarketPriceRecord>> {
    prices
        .iter()
        .enumerate()
        .map(|(idx, value)| validate_price(idx, value))
        .collect()
}

fn validate_price(idx: usize, value: &Value) -> Result<MarketPriceRecord> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(idx, None, "must be an object"))?;

    let region = required_text(idx, object, "region")?;
    let crop = required_text(idx, object, "crop")?;

    let price = object
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(idx, Some("price"), "must be a number"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(invalid(idx, Some("price"), "must be a non-negative number"));
    }

    let unit = required_text(idx, object, "unit")?;

    let demand_index = object
        .get("demand_index")
        .and_then(Value::as_u64)
        .filter(|d| *d <= 100)
        .ok_or_else(|| {
            invalid(
                idx,
                Some("demand_index"),
                "must be an integer between 0 and 100",
            )
        })?;

    let date = required_text(idx, object, "date")?;

    Ok(MarketPriceRecord {
        id: String::new(),
        region,
        crop,
        price,
        unit,
        demand_index: demand_index as u8,
        date,
        last_updated: 0,
    })
}

fn required_text(idx: usize, object: &Map<String, Value>, field: &str) -> Result<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid(idx, Some(field), "must be a non-empty string"))
}

fn invalid(idx: usize, field: Option<&str>, reason: &str) -> AppError {
    let location = match field {
        Some(field) => format!("prices[{}].{}", idx, field),
        None => format!("prices[{}]", idx),
    };
    AppError::ValidationError(format!("{} {}", location, reason))
}
