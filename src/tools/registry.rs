//! Static catalogue of lookup tools.

use crate::records::Category;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The four tools known to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    MarketPulse,
    SuggestRotation,
    OptimizeLogistics,
    GetBenchmarks,
}

impl ToolKind {
    /// Resolution order. Message clauses follow this order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::MarketPulse,
        ToolKind::SuggestRotation,
        ToolKind::OptimizeLogistics,
        ToolKind::GetBenchmarks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::MarketPulse => "getMarketPulse",
            ToolKind::SuggestRotation => "suggestRotation",
            ToolKind::OptimizeLogistics => "optimizeLogistics",
            ToolKind::GetBenchmarks => "getBenchmarks",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn category(self) -> Category {
        match self {
            ToolKind::MarketPulse => Category::Market,
            ToolKind::SuggestRotation => Category::Rotation,
            ToolKind::OptimizeLogistics => Category::Logistics,
            ToolKind::GetBenchmarks => Category::Benchmarks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
    pub description: &'static str,
}

/// A tool definition as advertised to the completions endpoint.
///
/// Only name, description and parameter schema go over the wire; the
/// kind (and so the backing record type) stays local.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    #[serde(skip)]
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(serialize_with = "object_schema")]
    pub parameters: Vec<Parameter>,
}

impl Tool {
    pub fn record_type(&self) -> Category {
        self.kind.category()
    }
}

/// Render parameters as `{"type": "object", "properties": {...}}`.
fn object_schema<S: Serializer>(
    params: &[Parameter],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    struct Properties<'a>(&'a [Parameter]);

    impl Serialize for Properties<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for param in self.0 {
                map.serialize_entry(param.name, param)?;
            }
            map.end()
        }
    }

    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("type", "object")?;
    map.serialize_entry("properties", &Properties(params))?;
    map.end()
}

pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        let tools = vec![
            Tool {
                kind: ToolKind::MarketPulse,
                name: ToolKind::MarketPulse.name(),
                description: "Retrieves live market prices for crops and regions. Use this for queries about prices, demand, or costs.",
                parameters: vec![
                    param("crop", "The crop name (e.g., Almonds, Corn)"),
                    param("region", "The geographic region (e.g., California, Midwest)"),
                ],
            },
            Tool {
                kind: ToolKind::SuggestRotation,
                name: ToolKind::SuggestRotation.name(),
                description: "Determines optimal crop rotation and compatibility. Use this for queries about what to plant next or soil compatibility.",
                parameters: vec![
                    param("previous_crop", "The crop previously planted"),
                    param("soil_type", "Type of soil (e.g., Loam, Clay, Sandy)"),
                ],
            },
            Tool {
                kind: ToolKind::OptimizeLogistics,
                name: ToolKind::OptimizeLogistics.name(),
                description: "Identifies buyers and logistics routes. Use this for queries about selling crops, finding buyers, or shipping.",
                parameters: vec![
                    param("crop", "The crop to be shipped"),
                    param("region", "Origin or destination region"),
                ],
            },
            Tool {
                kind: ToolKind::GetBenchmarks,
                name: ToolKind::GetBenchmarks.name(),
                description: "Retrieves regional performance benchmarks and practices. Use this for yield, margin, or best practice comparisons.",
                parameters: vec![param("region", "Target region for benchmarks")],
            },
        ];

        Self { tools }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, kind: ToolKind) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.kind == kind)
    }
}

fn param(name: &'static str, description: &'static str) -> Parameter {
    Parameter {
        name,
        ty: "string",
        description,
    }
}
