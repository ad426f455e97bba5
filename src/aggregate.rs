//! Normalization and ranking: turns validated timem records into per-metric
//! rankings labelled by the command arguments that set each invocation apart.

use crate::config::Configuration;
use crate::filters::{ArgumentFilter, StripRules};
use crate::measurement::Measurement;
use crate::metrics::Metric;
use crate::record::RawRecord;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A ranked measurement together with the label shown for it.
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub measurement: Measurement,
    /// `measurement.command` minus the arguments common to every invocation.
    pub distinguishing: Vec<String>,
    /// `distinguishing` after stripping, sorted. Falls back to the files in
    /// the command when nothing distinguishing is left.
    pub label: Vec<String>,
}

/// The ranked entries for one metric.
#[derive(Debug, Clone)]
pub struct MetricBucket {
    pub metric: Metric,
    pub entries: Vec<RankedEntry>,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Arguments present in every invocation's command line.
    pub common_args: BTreeSet<String>,
    /// One bucket per requested metric, in request order.
    pub buckets: Vec<MetricBucket>,
}

impl Aggregate {
    #[cfg(test)]
    pub fn bucket(&self, metric: Metric) -> Option<&MetricBucket> {
        self.buckets.iter().find(|b| b.metric == metric)
    }
}

/// Run the pipeline with the filters and limits from `config`.
pub fn aggregate(records: &[RawRecord], config: &Configuration) -> Aggregate {
    aggregate_with(
        records,
        &config.metrics,
        &config.filters,
        &config.strip,
        config.max_entries,
    )
}

/// Run the pipeline against an arbitrary argument filter.
///
/// `max_entries == 0` keeps every qualifying entry.
pub fn aggregate_with(
    records: &[RawRecord],
    metrics: &[Metric],
    filter: &dyn ArgumentFilter,
    strip: &StripRules,
    max_entries: usize,
) -> Aggregate {
    let common_args = common_arguments(records);
    tracing::debug!(?common_args, "common arguments");

    let mut buckets: Vec<MetricBucket> = metrics
        .iter()
        .map(|&metric| MetricBucket {
            metric,
            entries: Vec::new(),
        })
        .collect();

    let mut measurements: Vec<Vec<Measurement>> = vec![Vec::new(); buckets.len()];
    for record in records {
        tracing::debug!(
            source = %record.source.display(),
            compiler = %record.compiler,
            timem_config = %record.config,
            "processing record"
        );
        let kept: Vec<String> = record
            .command
            .iter()
            .filter(|arg| !filter.is_discarded(arg))
            .cloned()
            .collect();

        for entry in &record.entries {
            for (metric, data) in entry {
                let Some(slot) = metrics.iter().position(|m| m == metric) else {
                    tracing::debug!(%metric, "ignoring metric");
                    continue;
                };
                measurements[slot].push(Measurement::new(
                    metrics[slot],
                    &record.compiler,
                    &kept,
                    data,
                ));
            }
        }
    }

    for (bucket, found) in buckets.iter_mut().zip(measurements) {
        bucket.entries = rank(bucket.metric, found, &common_args, strip, max_entries);
    }

    Aggregate {
        common_args,
        buckets,
    }
}

/// Intersection of every record's command tokens. Empty without records.
pub fn common_arguments(records: &[RawRecord]) -> BTreeSet<String> {
    let Some((first, rest)) = records.split_first() else {
        tracing::debug!("no records, no common arguments");
        return BTreeSet::new();
    };

    let mut common: BTreeSet<String> = first.command.iter().cloned().collect();
    for record in rest {
        let theirs: BTreeSet<&String> = record.command.iter().collect();
        common.retain(|arg| theirs.contains(arg));
    }
    common
}

/// Filter, order, truncate and label one metric's measurements.
fn rank(
    metric: Metric,
    measurements: Vec<Measurement>,
    common_args: &BTreeSet<String>,
    strip: &StripRules,
    max_entries: usize,
) -> Vec<RankedEntry> {
    let (mut numeric, text): (Vec<Measurement>, Vec<Measurement>) = measurements
        .into_iter()
        .filter(Measurement::is_rankable)
        .partition(|m| m.value.is_numeric());

    if !numeric.is_empty() && !text.is_empty() {
        tracing::warn!(
            metric = %metric,
            numeric = numeric.len(),
            text = text.len(),
            "metric mixes numeric and textual values, textual entries are listed last"
        );
    }

    // stable, so equal values keep input order
    numeric.sort_by(descending);
    numeric.extend(text);

    let mut ordered = numeric;
    if max_entries > 0 {
        ordered.truncate(max_entries);
    }

    ordered
        .into_iter()
        .map(|measurement| build_entry(measurement, common_args, strip))
        .collect()
}

fn descending(a: &Measurement, b: &Measurement) -> Ordering {
    match (a.value.as_f64(), b.value.as_f64()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => Ordering::Equal,
    }
}

fn build_entry(
    measurement: Measurement,
    common_args: &BTreeSet<String>,
    strip: &StripRules,
) -> RankedEntry {
    let distinguishing: Vec<String> = measurement
        .command
        .iter()
        .filter(|arg| !common_args.contains(*arg))
        .cloned()
        .collect();

    let mut label: Vec<String> = distinguishing
        .iter()
        .map(|arg| strip.apply(arg))
        .filter(|arg| !arg.is_empty())
        .collect();
    label.sort();

    if label.is_empty() {
        label = measurement.files_in_command.clone();
    }

    RankedEntry {
        measurement,
        distinguishing,
        label,
    }
}
