//! Indexed record types and the canonical demo dataset.

pub mod dataset;
pub mod types;

pub use dataset::Dataset;
pub use types::{
    BenchmarkRecord, Category, CropRotationRecord, LogisticsRecord, MarketPriceRecord, Record,
    RecordBatch, ResultData,
};
