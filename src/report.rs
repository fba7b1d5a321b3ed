// Final report. Rows are ordered by descending count; ties fall back to the
// tag name, or to (port, protocol) for the combination table.

use std::fmt::Write as _;

use clap::ValueEnum;

use crate::error::Result;
use crate::models::dto::{PortProtocolCountDTO, ReportDTO, TagCountDTO};
use crate::stats::Aggregator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Two CSV-style sections
    #[default]
    Text,
    /// Pretty-printed JSON object
    Json,
}

pub fn build(agg: &Aggregator) -> ReportDTO {
    let mut tags: Vec<(&str, u64)> = agg
        .tag_counts()
        .iter()
        .map(|(tag, count)| (tag.as_str(), *count))
        .collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut pairs: Vec<_> = agg.port_protocol_counts().iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    ReportDTO {
        tag_counts: tags
            .into_iter()
            .map(|(tag, count)| TagCountDTO {
                tag: tag.to_string(),
                count,
            })
            .collect(),
        port_protocol_counts: pairs
            .into_iter()
            .map(|(key, count)| PortProtocolCountDTO {
                port: key.port,
                protocol: key.protocol.to_string(),
                count: *count,
            })
            .collect(),
    }
}

pub fn render_text(report: &ReportDTO) -> String {
    let mut out = String::new();

    out.push_str("Tag Counts:\n");
    out.push_str("Tag,Count\n");
    for row in &report.tag_counts {
        let _ = writeln!(out, "{},{}", row.tag, row.count);
    }

    out.push_str("\nPort/Protocol Combination Counts:\n");
    out.push_str("Port,Protocol,Count\n");
    for row in &report.port_protocol_counts {
        let _ = writeln!(out, "{},{},{}", row.port, row.protocol, row.count);
    }

    out
}

pub fn render_json(report: &ReportDTO) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

pub fn render(report: &ReportDTO, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
    }
}
