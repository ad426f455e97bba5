use crate::filters::{FilterSet, StripRules};
use crate::metrics::Metric;
use crate::report::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "compile-time-perf.toml";

/// Top-level configuration loaded from compile-time-perf.toml.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub report: ReportConfig,
    pub filters: FilterConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub metrics: Vec<Metric>,
    /// 0 means no limit.
    pub max_entries: usize,
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
    pub strip: Vec<String>,
    pub regex_strip: Vec<String>,
}

// --- Default implementations ---

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::DEFAULTS.to_vec(),
            max_entries: 0,
            format: OutputFormat::Text,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            extensions: vec!["lang-all".to_string()],
            strip: Vec::new(),
            regex_strip: Vec::new(),
        }
    }
}

/// Values given on the command line. `None` leaves the file value in place.
#[derive(Debug, Default)]
pub struct Overrides {
    pub metrics: Option<Vec<Metric>>,
    pub max_entries: Option<usize>,
    pub format: Option<OutputFormat>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub strip: Option<Vec<String>>,
    pub regex_strip: Option<Vec<String>>,
}

impl AnalyzerConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `compile-time-perf.toml` in
    /// `dir` is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }

    /// Replace file values with any the command line supplied.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        let Overrides {
            metrics,
            max_entries,
            format,
            include,
            exclude,
            extensions,
            strip,
            regex_strip,
        } = overrides;

        if let Some(v) = metrics {
            self.report.metrics = v;
        }
        if let Some(v) = max_entries {
            self.report.max_entries = v;
        }
        if let Some(v) = format {
            self.report.format = v;
        }
        if let Some(v) = include {
            self.filters.include = v;
        }
        if let Some(v) = exclude {
            self.filters.exclude = v;
        }
        if let Some(v) = extensions {
            self.filters.extensions = v;
        }
        if let Some(v) = strip {
            self.filters.strip = v;
        }
        if let Some(v) = regex_strip {
            self.filters.regex_strip = v;
        }
    }

    /// Validate and compile into the read-only run configuration.
    pub fn resolve(&self) -> Result<Configuration, ConfigError> {
        if self.report.metrics.is_empty() {
            return Err(ConfigError::NoMetrics);
        }

        let mut metrics = Vec::with_capacity(self.report.metrics.len());
        for metric in &self.report.metrics {
            if !metrics.contains(metric) {
                metrics.push(*metric);
            }
        }

        let f = &self.filters;
        Ok(Configuration {
            metrics,
            max_entries: self.report.max_entries,
            format: self.report.format,
            filters: FilterSet::new(&f.include, &f.exclude, &f.extensions)?,
            strip: StripRules::new(&f.strip, &f.regex_strip)?,
        })
    }
}

/// Immutable snapshot of everything one analysis run needs.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Requested metrics, deduplicated, in the order they were asked for.
    pub metrics: Vec<Metric>,
    pub max_entries: usize,
    pub format: OutputFormat,
    pub filters: FilterSet,
    pub strip: StripRules,
}

/// Errors from loading or resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema.
    Parse { path: PathBuf, detail: String },
    /// A user-supplied pattern did not compile.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
    /// The requested metric list ended up empty.
    NoMetrics,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, detail } => {
                write!(f, "failed to parse config file {}: {}", path.display(), detail)
            }
            ConfigError::InvalidRegex { pattern, source } => {
                write!(f, "invalid regular expression '{pattern}': {source}")
            }
            ConfigError::NoMetrics => write!(f, "no metrics requested"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::InvalidRegex { source, .. } => Some(source),
            ConfigError::Parse { .. } | ConfigError::NoMetrics => None,
        }
    }
}
