//! Deterministic keyword intent classifier.
//!
//! Each tool has an independent keyword group matched by lowercase substring.
//! A query can resolve any subset of tools; resolving none means a broad
//! search over all of them.

use crate::tools::ToolKind;

const KEYWORDS: [(ToolKind, &[&str]); 4] = [
    (ToolKind::MarketPulse, &["price", "market", "almond", "california"]),
    (ToolKind::SuggestRotation, &["plant", "rotation", "after", "crop"]),
    (ToolKind::OptimizeLogistics, &["buyer", "sell", "logistics", "find"]),
    (ToolKind::GetBenchmarks, &["benchmark", "yield", "practice"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    /// Tools to invoke, always in registry order.
    pub tools: Vec<ToolKind>,
    /// True when no keyword matched and every tool is invoked.
    pub broad: bool,
}

pub fn classify(query: &str) -> Intent {
    let lowered = query.to_lowercase();

    let tools: Vec<ToolKind> = KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(kind, _)| *kind)
        .collect();

    if tools.is_empty() {
        Intent {
            tools: ToolKind::ALL.to_vec(),
            broad: true,
        }
    } else {
        Intent {
            tools,
            broad: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_keywords() {
        for query in ["Price of wheat", "MARKET update", "almond outlook", "California"] {
            let intent = classify(query);
            assert_eq!(intent.tools, vec![ToolKind::MarketPulse], "query: {}", query);
            assert!(!intent.broad);
        }
    }

    #[test]
    fn test_almond_prices_in_california() {
        let intent = classify("What are the almond prices in California?");
        assert_eq!(intent.tools, vec![ToolKind::MarketPulse]);
    }

    #[test]
    fn test_plant_after_corn() {
        let intent = classify("What should I plant after corn?");
        assert_eq!(intent.tools, vec![ToolKind::SuggestRotation]);
    }

    #[test]
    fn test_find_buyers_for_crops_hits_rotation_and_logistics() {
        // "crops" contains "crop"
        let intent = classify("Find buyers for my crops");
        assert_eq!(
            intent.tools,
            vec![ToolKind::SuggestRotation, ToolKind::OptimizeLogistics]
        );
    }

    #[test]
    fn test_multiple_groups_keep_registry_order() {
        let intent = classify("yield benchmark and price after corn");
        assert_eq!(
            intent.tools,
            vec![
                ToolKind::MarketPulse,
                ToolKind::SuggestRotation,
                ToolKind::GetBenchmarks
            ]
        );
    }

    #[test]
    fn test_all_four_groups() {
        let intent = classify("sell at market price, then plant for yield");
        assert_eq!(intent.tools, ToolKind::ALL.to_vec());
        assert!(!intent.broad);
    }

    #[test]
    fn test_bare_crop_name_is_broad() {
        let intent = classify("corn");
        assert!(intent.broad);
        assert_eq!(intent.tools, ToolKind::ALL.to_vec());
    }

    #[test]
    fn test_analyze_farm_is_broad() {
        let intent = classify("Analyze my farm's potential");
        assert!(intent.broad);
    }

    #[test]
    fn test_empty_query_is_broad() {
        assert!(classify("").broad);
    }
}
