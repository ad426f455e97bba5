//! Report rendering: the common-argument block followed by one ranked table
//! per metric, as plain text or JSON.

use crate::aggregate::{Aggregate, RankedEntry};
use crate::record::MetricValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Write the report in the requested format.
pub fn render<W: Write>(
    out: &mut W,
    aggregate: &Aggregate,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(out, aggregate),
        OutputFormat::Json => render_json(out, aggregate),
    }
}

/// Plain-text report with fixed-width columns.
pub fn render_text<W: Write>(out: &mut W, aggregate: &Aggregate) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Common arguments to all commands:")?;
    for arg in &aggregate.common_args {
        writeln!(out, "    {arg:12}")?;
    }

    for bucket in &aggregate.buckets {
        if bucket.entries.is_empty() {
            continue;
        }
        writeln!(out)?;
        for entry in &bucket.entries {
            writeln!(out, "{}", format_row(bucket.metric.as_str(), entry))?;
        }
    }
    Ok(())
}

/// `<metric>    <value> <units> <compiler> <label>`; the metric column is
/// left out for textual values.
fn format_row(metric: &str, entry: &RankedEntry) -> String {
    let m = &entry.measurement;
    let label = entry.label.join(" ");
    let compiler = m.compiler_name();
    let units = &m.units;
    match &m.value {
        MetricValue::Float(v) => format!("{metric}    {v:12.3} {units:4} {compiler} {label:40}"),
        MetricValue::Integer(v) => format!("{metric}    {v:12} {units:4} {compiler} {label:40}"),
        MetricValue::Text(v) => format!("    {v:>12} {units:4} {compiler} {label:40}"),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    common_args: Vec<&'a str>,
    metrics: Vec<JsonBucket<'a>>,
}

#[derive(Serialize)]
struct JsonBucket<'a> {
    metric: &'a str,
    entries: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    value: &'a MetricValue,
    units: &'a str,
    compiler: &'a str,
    arguments: &'a [String],
    label: &'a [String],
    samples: &'a [Value],
}

/// Pretty-printed JSON carrying the same rows as the text report plus the
/// raw samples.
pub fn render_json<W: Write>(out: &mut W, aggregate: &Aggregate) -> io::Result<()> {
    let report = JsonReport {
        common_args: aggregate.common_args.iter().map(String::as_str).collect(),
        metrics: aggregate
            .buckets
            .iter()
            .filter(|b| !b.entries.is_empty())
            .map(|b| JsonBucket {
                metric: b.metric.as_str(),
                entries: b
                    .entries
                    .iter()
                    .map(|e| JsonRow {
                        value: &e.measurement.value,
                        units: &e.measurement.units,
                        compiler: &e.measurement.compiler,
                        arguments: &e.distinguishing,
                        label: &e.label,
                        samples: &e.measurement.samples,
                    })
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}
