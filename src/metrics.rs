//! The metrics timem can report for a compiler invocation.
//!
//! Names match the keys timem writes into each `timem` entry, so a metric
//! reads the same on the CLI, in the TOML config and in the JSON input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Metric {
    WallClock,
    CpuClock,
    PeakRss,
    PageRss,
    VirtualMemory,
    UserClock,
    SystemClock,
    CpuUtil,
    NumMajorPageFaults,
    NumMinorPageFaults,
    PriorityContextSwitch,
    VoluntaryContextSwitch,
    ReadChar,
    ReadBytes,
    WrittenChar,
    WrittenBytes,
}

impl Metric {
    /// Every supported metric, in the order `--list-metrics` prints them.
    pub const ALL: [Metric; 16] = [
        Metric::WallClock,
        Metric::CpuClock,
        Metric::PeakRss,
        Metric::PageRss,
        Metric::VirtualMemory,
        Metric::UserClock,
        Metric::SystemClock,
        Metric::CpuUtil,
        Metric::NumMajorPageFaults,
        Metric::NumMinorPageFaults,
        Metric::PriorityContextSwitch,
        Metric::VoluntaryContextSwitch,
        Metric::ReadChar,
        Metric::ReadBytes,
        Metric::WrittenChar,
        Metric::WrittenBytes,
    ];

    /// Reported when neither the CLI nor the config file names any metric.
    pub const DEFAULTS: [Metric; 4] = [
        Metric::WallClock,
        Metric::CpuClock,
        Metric::PeakRss,
        Metric::VirtualMemory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::WallClock => "wall_clock",
            Metric::CpuClock => "cpu_clock",
            Metric::PeakRss => "peak_rss",
            Metric::PageRss => "page_rss",
            Metric::VirtualMemory => "virtual_memory",
            Metric::UserClock => "user_clock",
            Metric::SystemClock => "system_clock",
            Metric::CpuUtil => "cpu_util",
            Metric::NumMajorPageFaults => "num_major_page_faults",
            Metric::NumMinorPageFaults => "num_minor_page_faults",
            Metric::PriorityContextSwitch => "priority_context_switch",
            Metric::VoluntaryContextSwitch => "voluntary_context_switch",
            Metric::ReadChar => "read_char",
            Metric::ReadBytes => "read_bytes",
            Metric::WrittenChar => "written_char",
            Metric::WrittenBytes => "written_bytes",
        }
    }

    /// Look up a metric by the key timem uses for it.
    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Print the supported metric names, one per line.
pub fn handle_list_metrics() {
    tracing::info!(
        "metrics supported here may not be reported by timem if they were unavailable for collection"
    );
    for metric in Metric::ALL {
        println!("    {metric}");
    }
}
