//! Typed view of one timem JSON document.
//!
//! Documents are validated here, once, so the pipeline never has to probe
//! optional fields. A document without the `timemory` marker is not ours and
//! is skipped; anything else that does not fit the schema is fatal. Only the
//! requested metrics are validated, other keys in a `timem` entry may have
//! any shape.

use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level key marking a document as timem output.
pub const MARKER_KEY: &str = "timemory";

/// Metric value as timem wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// The value as a number, or `None` for textual values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{v}"),
            MetricValue::Float(v) => write!(f, "{v:.3}"),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

/// One metric's data for one invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleData {
    pub value: MetricValue,
    pub unit_repr: String,
    #[serde(default)]
    pub laps: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TimemoryBody {
    command_line: Vec<String>,
    #[serde(default)]
    config: Value,
    timem: Vec<BTreeMap<String, Value>>,
}

/// One compiler invocation recorded by timem.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// File the document was loaded from.
    pub source: PathBuf,
    /// The measured compiler (second command-line token).
    pub compiler: String,
    /// Everything after the compiler, sorted.
    pub command: Vec<String>,
    /// timem's own configuration block, carried through untouched.
    pub config: Value,
    /// Requested metric to sample data, one map per `timem` entry.
    pub entries: Vec<BTreeMap<Metric, SampleData>>,
}

impl RawRecord {
    /// Validate a parsed document, keeping the samples of `metrics`.
    ///
    /// Returns `Ok(None)` for a document without the `timemory` marker.
    pub fn from_document(
        source: &Path,
        document: &Value,
        metrics: &[Metric],
    ) -> Result<Option<Self>, RecordError> {
        let Some(object) = document.as_object() else {
            return Err(RecordError::NotAnObject {
                path: source.to_path_buf(),
                found: json_type_name(document),
            });
        };

        let Some(body) = object.get(MARKER_KEY) else {
            tracing::debug!(
                path = %source.display(),
                "document does not start with {MARKER_KEY}, ignoring"
            );
            return Ok(None);
        };

        let body = TimemoryBody::deserialize(body).map_err(|e| RecordError::Malformed {
            path: source.to_path_buf(),
            detail: e.to_string(),
        })?;

        // first token is timem itself, second the measured compiler
        let mut tokens = body.command_line.into_iter();
        let (Some(_wrapper), Some(compiler)) = (tokens.next(), tokens.next()) else {
            return Err(RecordError::Malformed {
                path: source.to_path_buf(),
                detail: "command_line needs at least the wrapper and the compiler".to_string(),
            });
        };
        let mut command: Vec<String> = tokens.collect();
        command.sort();

        let mut entries = Vec::with_capacity(body.timem.len());
        for raw in body.timem {
            let mut entry = BTreeMap::new();
            for (name, data) in raw {
                let requested = Metric::from_key(&name).filter(|m| metrics.contains(m));
                let Some(metric) = requested else {
                    tracing::debug!(metric = %name, "metric not requested, skipping");
                    continue;
                };
                let sample =
                    SampleData::deserialize(data).map_err(|e| RecordError::Malformed {
                        path: source.to_path_buf(),
                        detail: format!("{name}: {e}"),
                    })?;
                entry.insert(metric, sample);
            }
            entries.push(entry);
        }

        Ok(Some(Self {
            source: source.to_path_buf(),
            compiler,
            command,
            config: body.config,
            entries,
        }))
    }
}

/// Validate a batch of documents, dropping those without the marker.
pub fn parse_documents<'a, I>(
    documents: I,
    metrics: &[Metric],
) -> Result<Vec<RawRecord>, RecordError>
where
    I: IntoIterator<Item = (&'a Path, &'a Value)>,
{
    let mut records = Vec::new();
    for (path, document) in documents {
        if let Some(record) = RawRecord::from_document(path, document, metrics)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors from validating timem documents.
#[derive(Debug)]
pub enum RecordError {
    /// The document root is not a JSON object.
    NotAnObject { path: PathBuf, found: &'static str },
    /// The `timemory` body does not have the expected shape.
    Malformed { path: PathBuf, detail: String },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::NotAnObject { path, found } => {
                write!(f, "expected a JSON object but got {found} from {}", path.display())
            }
            RecordError::Malformed { path, detail } => {
                write!(f, "malformed timem output in {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for RecordError {}
