//! Markdown message composition.
//!
//! Layout, in order: lead text (tool clauses or the agent's own message), the
//! broad-search sentence, a findings block, and the attribution line.

use crate::orchestrator::OrchestrationType;
use crate::records::ResultData;
use crate::tools::ToolKind;
use std::fmt::Write;

pub const BROAD_SEARCH_MESSAGE: &str =
    "I am orchestrating a broad search across all AgriIntel knowledge bases.";

/// Listing cap for market, logistics and benchmark findings. Rotation rules
/// are listed in full.
const FINDINGS_PER_CATEGORY: usize = 3;

/// Progress clause appended when a tool resolves.
pub fn clause(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::MarketPulse => "Fetching live market prices... ",
        ToolKind::SuggestRotation => "Analyzing agronomy rules for crop rotation... ",
        ToolKind::OptimizeLogistics => "Optimizing logistics chain and buyer matching... ",
        ToolKind::GetBenchmarks => "Retrieving regional performance benchmarks... ",
    }
}

pub fn attribution(kind: OrchestrationType) -> &'static str {
    match kind {
        OrchestrationType::AgentStudio => {
            "Query orchestrated via **Agent Studio** using real-time indices."
        }
        OrchestrationType::Simulated => {
            "Query orchestrated via **local intent simulation** over the AgriIntel indices."
        }
    }
}

pub fn compose_message(
    lead: &str,
    broad: bool,
    data: &ResultData,
    kind: OrchestrationType,
) -> String {
    let mut message = lead.to_string();
    if broad {
        message.push_str(BROAD_SEARCH_MESSAGE);
    }

    let findings = findings(data);
    if !findings.is_empty() {
        message.push_str("\n\n");
        message.push_str(&findings);
    }

    message.push_str("\n\n");
    message.push_str(attribution(kind));
    message
}

fn findings(data: &ResultData) -> String {
    let mut out = String::new();

    if let Some(hits) = data.market.as_deref().filter(|h| !h.is_empty()) {
        section(&mut out, "Market prices");
        for p in hits.iter().take(FINDINGS_PER_CATEGORY) {
            let _ = writeln!(
                out,
                "- {} ({}): {:.2} {}, demand {}/100",
                p.crop, p.region, p.price, p.unit, p.demand_index
            );
        }
    }

    if let Some(hits) = data.rotation.as_deref().filter(|h| !h.is_empty()) {
        section(&mut out, "Rotation rules");
        for r in hits {
            let _ = writeln!(
                out,
                "- After {} on {} soil: plant {} ({} compatibility, risk {}/100)",
                r.previous_crop, r.soil_type, r.next_crop, r.compatibility, r.risk_score
            );
        }
    }

    if let Some(hits) = data.logistics.as_deref().filter(|h| !h.is_empty()) {
        section(&mut out, "Buyers & routes");
        for l in hits.iter().take(FINDINGS_PER_CATEGORY) {
            let _ = writeln!(
                out,
                "- {} → {}: {} via {}, ${:.2}/ton, {} day(s)",
                l.origin_region,
                l.destination_market,
                l.buyer,
                l.carrier,
                l.cost_per_ton,
                l.transit_days
            );
        }
    }

    if let Some(hits) = data.benchmarks.as_deref().filter(|h| !h.is_empty()) {
        section(&mut out, "Regional benchmarks");
        for b in hits.iter().take(FINDINGS_PER_CATEGORY) {
            let _ = writeln!(
                out,
                "- {} ({}): {} margin, {} yield; {}",
                b.region,
                b.crop_mix.join(" + "),
                b.margin,
                b.yield_level,
                b.practices
            );
        }
    }

    out.trim_end().to_string()
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "**{}**", title);
}
