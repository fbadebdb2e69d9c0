//! Record types stored in the four search indices.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

/// Result category; one per index and one per tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Market,
    Rotation,
    Logistics,
    Benchmarks,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Market,
        Category::Rotation,
        Category::Logistics,
        Category::Benchmarks,
    ];

    /// Name of the backing search index.
    pub fn index_name(self) -> &'static str {
        match self {
            Category::Market => "market_prices",
            Category::Rotation => "crop_rotation",
            Category::Logistics => "logistics",
            Category::Benchmarks => "benchmarks",
        }
    }
}

/// Common behavior of indexed records.
///
/// The three field views drive fallback matching: `searchable` fields contain
/// the query, `filter_field` compares against explicit filters, and `mentioned`
/// fields are looked for inside the query.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const CATEGORY: Category;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn searchable(&self) -> Vec<&str>;

    fn filter_field(&self, field: &str) -> Option<&str>;

    fn mentioned(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceRecord {
    #[serde(rename = "objectID", default)]
    pub id: String,
    pub region: String,
    pub crop: String,
    pub price: f64,
    pub unit: String,
    pub demand_index: u8,
    pub date: String,
    /// Epoch milliseconds, set at indexing time. Drives recency ranking.
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: i64,
}

impl Record for MarketPriceRecord {
    const CATEGORY: Category = Category::Market;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.region, &self.crop]
    }

    fn filter_field(&self, field: &str) -> Option<&str> {
        match field {
            "region" => Some(&self.region),
            "crop" => Some(&self.crop),
            _ => None,
        }
    }

    fn mentioned(&self) -> Vec<&str> {
        vec![&self.crop, &self.region]
    }
}

/// Directional rotation rule: `previous_crop` followed by `next_crop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRotationRecord {
    #[serde(rename = "objectID", default)]
    pub id: String,
    pub soil_type: String,
    pub climate_zone: String,
    pub previous_crop: String,
    pub next_crop: String,
    /// 0-100, lower is safer.
    pub risk_score: u8,
    pub compatibility: String,
}

impl Record for CropRotationRecord {
    const CATEGORY: Category = Category::Rotation;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.previous_crop, &self.next_crop]
    }

    fn filter_field(&self, field: &str) -> Option<&str> {
        match field {
            "previous_crop" => Some(&self.previous_crop),
            "soil_type" => Some(&self.soil_type),
            _ => None,
        }
    }

    fn mentioned(&self) -> Vec<&str> {
        vec![&self.previous_crop]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsRecord {
    #[serde(rename = "objectID", default)]
    pub id: String,
    pub origin_region: String,
    pub destination_market: String,
    pub buyer: String,
    pub carrier: String,
    pub cost_per_ton: f64,
    pub transit_days: u32,
}

impl Record for LogisticsRecord {
    const CATEGORY: Category = Category::Logistics;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.origin_region, &self.destination_market, &self.buyer]
    }

    fn filter_field(&self, field: &str) -> Option<&str> {
        match field {
            "origin_region" => Some(&self.origin_region),
            "destination_market" => Some(&self.destination_market),
            _ => None,
        }
    }

    fn mentioned(&self) -> Vec<&str> {
        vec![&self.origin_region]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "objectID", default)]
    pub id: String,
    pub region: String,
    pub crop_mix: Vec<String>,
    pub margin: String,
    #[serde(rename = "yield")]
    pub yield_level: String,
    pub practices: String,
}

impl Record for BenchmarkRecord {
    const CATEGORY: Category = Category::Benchmarks;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.region]
    }

    fn filter_field(&self, field: &str) -> Option<&str> {
        match field {
            "region" => Some(&self.region),
            _ => None,
        }
    }

    fn mentioned(&self) -> Vec<&str> {
        vec![&self.region]
    }
}

/// Records returned by one lookup, tagged by category.
///
/// `Empty` stands for a call that produced nothing attributable to a
/// category (an unknown tool, or a failed live tool call).
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Market(Vec<MarketPriceRecord>),
    Rotation(Vec<CropRotationRecord>),
    Logistics(Vec<LogisticsRecord>),
    Benchmarks(Vec<BenchmarkRecord>),
    Empty,
}

impl RecordBatch {
    /// An empty batch that still carries its category.
    pub fn empty(category: Category) -> Self {
        match category {
            Category::Market => RecordBatch::Market(Vec::new()),
            Category::Rotation => RecordBatch::Rotation(Vec::new()),
            Category::Logistics => RecordBatch::Logistics(Vec::new()),
            Category::Benchmarks => RecordBatch::Benchmarks(Vec::new()),
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            RecordBatch::Market(_) => Some(Category::Market),
            RecordBatch::Rotation(_) => Some(Category::Rotation),
            RecordBatch::Logistics(_) => Some(Category::Logistics),
            RecordBatch::Benchmarks(_) => Some(Category::Benchmarks),
            RecordBatch::Empty => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Market(r) => r.len(),
            RecordBatch::Rotation(r) => r.len(),
            RecordBatch::Logistics(r) => r.len(),
            RecordBatch::Benchmarks(r) => r.len(),
            RecordBatch::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for RecordBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RecordBatch::Market(r) => r.serialize(serializer),
            RecordBatch::Rotation(r) => r.serialize(serializer),
            RecordBatch::Logistics(r) => r.serialize(serializer),
            RecordBatch::Benchmarks(r) => r.serialize(serializer),
            RecordBatch::Empty => serializer.collect_seq(std::iter::empty::<()>()),
        }
    }
}

/// Per-category result arrays mirrored into the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<Vec<MarketPriceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<CropRotationRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logistics: Option<Vec<LogisticsRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<Vec<BenchmarkRecord>>,
}

impl ResultData {
    /// Store a batch under its category, replacing earlier results.
    pub fn insert(&mut self, batch: RecordBatch) {
        match batch {
            RecordBatch::Market(r) => self.market = Some(r),
            RecordBatch::Rotation(r) => self.rotation = Some(r),
            RecordBatch::Logistics(r) => self.logistics = Some(r),
            RecordBatch::Benchmarks(r) => self.benchmarks = Some(r),
            RecordBatch::Empty => {}
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::Market => self.market.is_some(),
            Category::Rotation => self.rotation.is_some(),
            Category::Logistics => self.logistics.is_some(),
            Category::Benchmarks => self.benchmarks.is_some(),
        }
    }

    /// Most recent `lastUpdated` among market hits.
    pub fn market_last_updated(&self) -> Option<i64> {
        self.market
            .as_ref()
            .and_then(|hits| hits.iter().map(|h| h.last_updated).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_market_record_wire_names() {
        let record: MarketPriceRecord = serde_json::from_value(json!({
            "objectID": "california-almonds-0",
            "region": "California",
            "crop": "Almonds",
            "price": 4.5,
            "unit": "USD/lb",
            "demand_index": 85,
            "date": "2024-01-09",
            "lastUpdated": 1704800000000i64
        }))
        .unwrap();

        assert_eq!(record.id, "california-almonds-0");
        assert_eq!(record.last_updated, 1_704_800_000_000);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["objectID"], "california-almonds-0");
        assert_eq!(value["lastUpdated"], 1_704_800_000_000i64);
    }

    #[test]
    fn test_benchmark_yield_field_name() {
        let record: BenchmarkRecord = serde_json::from_value(json!({
            "region": "Midwest",
            "crop_mix": ["Corn", "Soybeans"],
            "margin": "8%",
            "yield": "Medium",
            "practices": "No-Till"
        }))
        .unwrap();

        assert_eq!(record.id, "");
        assert_eq!(record.yield_level, "Medium");
        assert_eq!(serde_json::to_value(&record).unwrap()["yield"], "Medium");
    }

    #[test]
    fn test_empty_batch_serializes_as_array() {
        let value = serde_json::to_value(RecordBatch::Empty).unwrap();
        assert_eq!(value, json!([]));
        assert!(RecordBatch::Empty.category().is_none());
    }

    #[test]
    fn test_result_data_skips_missing_categories() {
        let mut data = ResultData::default();
        data.insert(RecordBatch::empty(Category::Logistics));
        data.insert(RecordBatch::Empty);

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value, json!({ "logistics": [] }));
        assert!(data.contains(Category::Logistics));
        assert!(!data.contains(Category::Market));
    }
}
