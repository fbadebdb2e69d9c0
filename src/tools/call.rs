//! Decoded tool-call directives.

use crate::error::{AppError, Result};
use crate::records::Category;
use crate::store::Filters;
use crate::tools::ToolKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPulseParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogisticsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A tool invocation with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    MarketPulse(MarketPulseParams),
    SuggestRotation(RotationParams),
    OptimizeLogistics(LogisticsParams),
    GetBenchmarks(BenchmarkParams),
    Unknown { name: String, params: Value },
}

impl ToolCall {
    /// Decode a `{tool, params}` directive.
    ///
    /// Unrecognized tool names become `Unknown`. Known tools with params of
    /// the wrong shape are an error.
    pub fn decode(name: &str, params: Value) -> Result<Self> {
        let Some(kind) = ToolKind::from_name(name) else {
            return Ok(ToolCall::Unknown {
                name: name.to_string(),
                params,
            });
        };

        Ok(match kind {
            ToolKind::MarketPulse => ToolCall::MarketPulse(decode_params(name, params)?),
            ToolKind::SuggestRotation => ToolCall::SuggestRotation(decode_params(name, params)?),
            ToolKind::OptimizeLogistics => {
                ToolCall::OptimizeLogistics(decode_params(name, params)?)
            }
            ToolKind::GetBenchmarks => ToolCall::GetBenchmarks(decode_params(name, params)?),
        })
    }

    /// A parameterless call, as issued by keyword simulation.
    pub fn bare(kind: ToolKind) -> Self {
        match kind {
            ToolKind::MarketPulse => ToolCall::MarketPulse(MarketPulseParams::default()),
            ToolKind::SuggestRotation => ToolCall::SuggestRotation(RotationParams::default()),
            ToolKind::OptimizeLogistics => ToolCall::OptimizeLogistics(LogisticsParams::default()),
            ToolKind::GetBenchmarks => ToolCall::GetBenchmarks(BenchmarkParams::default()),
        }
    }

    pub fn kind(&self) -> Option<ToolKind> {
        match self {
            ToolCall::MarketPulse(_) => Some(ToolKind::MarketPulse),
            ToolCall::SuggestRotation(_) => Some(ToolKind::SuggestRotation),
            ToolCall::OptimizeLogistics(_) => Some(ToolKind::OptimizeLogistics),
            ToolCall::GetBenchmarks(_) => Some(ToolKind::GetBenchmarks),
            ToolCall::Unknown { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolCall::Unknown { name, .. } => name,
            known => known.kind().map(ToolKind::name).unwrap_or_default(),
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.kind().map(ToolKind::category)
    }

    /// Resolved parameters, as echoed back in the response.
    pub fn params(&self) -> Value {
        let value = match self {
            ToolCall::MarketPulse(p) => serde_json::to_value(p),
            ToolCall::SuggestRotation(p) => serde_json::to_value(p),
            ToolCall::OptimizeLogistics(p) => serde_json::to_value(p),
            ToolCall::GetBenchmarks(p) => serde_json::to_value(p),
            ToolCall::Unknown { params, .. } => return params.clone(),
        };
        value.unwrap_or(Value::Null)
    }

    /// Index attribute filters derived from the parameters.
    ///
    /// Logistics records carry no crop attribute, so a logistics `crop` is
    /// ignored; `region` filters on the origin.
    pub fn filters(&self) -> Filters {
        let mut filters = Filters::new();
        let mut put = |field: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                filters.insert(field.to_string(), v.to_string());
            }
        };

        match self {
            ToolCall::MarketPulse(p) => {
                put("crop", &p.crop);
                put("region", &p.region);
            }
            ToolCall::SuggestRotation(p) => {
                put("previous_crop", &p.previous_crop);
                put("soil_type", &p.soil_type);
            }
            ToolCall::OptimizeLogistics(p) => put("origin_region", &p.region),
            ToolCall::GetBenchmarks(p) => put("region", &p.region),
            ToolCall::Unknown { .. } => {}
        }

        filters
    }
}

fn decode_params<T: DeserializeOwned + Default>(tool: &str, params: Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| {
        AppError::UpstreamError(format!("Malformed params for tool {}: {}", tool, e))
    })
}
