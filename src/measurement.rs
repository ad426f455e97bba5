use crate::collapse::collapse_sorted;
use crate::metrics::Metric;
use crate::record::{MetricValue, SampleData};
use serde_json::Value;
use std::path::Path;

/// One metric for one compiler invocation.
///
/// Built once from a record's filtered command tokens and never changed
/// afterwards; the pipeline derives labels from it without mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: Metric,
    /// Measured compiler executable, as given on the timem command line.
    pub compiler: String,
    /// Kept command tokens with file paths collapsed, deduplicated and sorted.
    pub command: Vec<String>,
    pub value: MetricValue,
    pub units: String,
    /// Raw laps, kept for machine-readable output.
    pub samples: Vec<Value>,
    /// Tokens naming existing files, collapsed on their own.
    pub files_in_command: Vec<String>,
}

impl Measurement {
    /// `command` must already exclude the wrapper and the compiler.
    pub fn new(name: Metric, compiler: &str, command: &[String], data: &SampleData) -> Self {
        let files: Vec<&String> = command.iter().filter(|t| Path::new(t).is_file()).collect();

        Self {
            name,
            compiler: compiler.to_string(),
            command: collapse_sorted(command),
            value: data.value.clone(),
            units: data.unit_repr.clone(),
            samples: data.laps.clone(),
            files_in_command: collapse_sorted(files),
        }
    }

    /// File name of the compiler, for compact display.
    pub fn compiler_name(&self) -> &str {
        Path::new(&self.compiler)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.compiler)
    }

    /// Numeric values that are zero or negative carry no cost and are not
    /// ranked. Textual values are always kept.
    pub fn is_rankable(&self) -> bool {
        self.value.as_f64().map_or(true, |v| v > 0.0)
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn data(value: MetricValue) -> SampleData {
        SampleData {
            value,
            unit_repr: "sec".to_string(),
            laps: vec![serde_json::json!(0.5)],
        }
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_is_sorted_and_deduplicated() {
        let m = Measurement::new(
            Metric::WallClock,
            "/usr/bin/clang++",
            &tokens(&["-g", "-O2", "-g"]),
            &data(MetricValue::Float(1.0)),
        );
        assert_eq!(m.command, vec!["-O2", "-g"]);
        assert!(m.files_in_command.is_empty());
        assert_eq!(m.units, "sec");
        assert_eq!(m.samples.len(), 1);
    }

    #[test]
    fn files_are_collapsed_in_both_views() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("lib").join("a.cpp");
        let b = tmp.path().join("app").join("b.cpp");
        for p in [&a, &b] {
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, "").unwrap();
        }
        let cmd = vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
            "-Wall".to_string(),
        ];

        let m = Measurement::new(Metric::PeakRss, "g++", &cmd, &data(MetricValue::Integer(10)));
        assert_eq!(m.command, vec!["-Wall", "app/b.cpp", "lib/a.cpp"]);
        assert_eq!(m.files_in_command, vec!["app/b.cpp", "lib/a.cpp"]);
    }

    #[test]
    fn compiler_name_is_basename() {
        let one = data(MetricValue::Float(1.0));
        let m = Measurement::new(Metric::WallClock, "/opt/gcc/bin/gfortran", &[], &one);
        assert_eq!(m.compiler_name(), "gfortran");
        let m = Measurement::new(Metric::WallClock, "cc", &[], &one);
        assert_eq!(m.compiler_name(), "cc");
    }

    #[test]
    fn rankable_only_for_positive_numbers_or_text() {
        let rank = |v| Measurement::new(Metric::WallClock, "cc", &[], &data(v)).is_rankable();
        assert!(rank(MetricValue::Float(0.001)));
        assert!(rank(MetricValue::Integer(3)));
        assert!(!rank(MetricValue::Float(0.0)));
        assert!(!rank(MetricValue::Integer(0)));
        assert!(!rank(MetricValue::Integer(-1)));
        assert!(rank(MetricValue::Text("-5".to_string())));
    }

    #[test]
    fn display_shows_value_and_units() {
        let m = Measurement::new(Metric::WallClock, "cc", &[], &data(MetricValue::Float(1.5)));
        assert_eq!(m.to_string(), "1.500 sec");
    }
}
