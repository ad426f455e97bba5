//! Compiled argument filters and label stripping rules.
//!
//! All regexes are compiled once, when the run configuration is resolved.
//! The aggregation pipeline only sees the [`ArgumentFilter`] trait.

use crate::config::ConfigError;
use regex::Regex;

const C_EXTENSIONS: &[&str] = &["c", "C"];

const CXX_EXTENSIONS: &[&str] = &[
    "cpp", "c++", "cc", "cp", "cxx", "h", "h++", "hh", "hpp", "hxx", "inc", "inl", "ipp", "tcc",
    "tpp",
];

const FORTRAN_EXTENSIONS: &[&str] = &["f90", "f", "f03", "f08", "f77", "f95", "for", "fpp"];

/// CUDA, UPC and UPC++.
const MISC_EXTENSIONS: &[&str] = &["cu", "upc", "upcxx"];

/// Extension list value that turns extension matching off entirely.
pub const NO_EXTENSIONS: &str = "none";

/// Expand a keyword in the `-f` list to the extensions it stands for.
fn keyword_extensions(keyword: &str) -> Option<Vec<&'static str>> {
    let exts = match keyword {
        "lang-c" => C_EXTENSIONS.to_vec(),
        "lang-cxx" => CXX_EXTENSIONS.to_vec(),
        "lang-fortran" => FORTRAN_EXTENSIONS.to_vec(),
        "lang-all" => [C_EXTENSIONS, CXX_EXTENSIONS, FORTRAN_EXTENSIONS, MISC_EXTENSIONS].concat(),
        _ => return None,
    };
    Some(exts)
}

/// Decides, per command token, whether the token belongs in a label.
pub trait ArgumentFilter {
    /// `true` when `token` should be dropped from the label.
    fn is_discarded(&self, token: &str) -> bool;
}

/// Include, exclude and file-extension regexes compiled from the run
/// configuration.
#[derive(Debug, Clone)]
pub struct FilterSet {
    include: Option<Regex>,
    exclude: Option<Regex>,
    extensions: Option<Regex>,
}

impl FilterSet {
    /// Compile the filter set.
    ///
    /// Include and exclude patterns are each joined into one alternation
    /// anchored at the start of the token. `extensions` may mix keywords
    /// (`lang-all`, `lang-c`, `lang-cxx`, `lang-fortran`) with bare
    /// extensions; `none` anywhere disables extension matching.
    pub fn new(
        include: &[String],
        exclude: &[String],
        extensions: &[String],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            include: anchored_alternation(include)?,
            exclude: anchored_alternation(exclude)?,
            extensions: extension_regex(extensions)?,
        })
    }

    /// A filter that keeps nothing but files with the default extensions.
    #[cfg(test)]
    pub fn with_default_extensions() -> Self {
        Self::new(&[], &[], &["lang-all".to_string()]).unwrap()
    }
}

impl ArgumentFilter for FilterSet {
    fn is_discarded(&self, token: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(token) {
                tracing::debug!(arg = %token, "matched exclude regex, discarding");
                return true;
            }
        }

        if let Some(extensions) = &self.extensions {
            if extensions.is_match(token) {
                tracing::debug!(arg = %token, "matched file extension regex, keeping");
                return false;
            }
        }

        if let Some(include) = &self.include {
            if include.is_match(token) {
                tracing::debug!(arg = %token, "matched include regex, keeping");
                return false;
            }
        }

        tracing::debug!(arg = %token, "not explicitly included, discarding");
        true
    }
}

fn anchored_alternation(patterns: &[String]) -> Result<Option<Regex>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let joined = patterns.join("|");
    tracing::debug!(pattern = %joined, "compiling argument regex");
    compile(&format!("^(?:{joined})")).map(Some)
}

/// Resolve keywords, dedupe and sort, then build `.*\.(a|b|...)$`.
fn extension_regex(requested: &[String]) -> Result<Option<Regex>, ConfigError> {
    if requested.is_empty() || requested.iter().any(|e| e == NO_EXTENSIONS) {
        return Ok(None);
    }

    let mut extensions: Vec<String> = Vec::new();
    for entry in requested {
        match keyword_extensions(entry) {
            Some(exts) => extensions.extend(exts.into_iter().map(str::to_string)),
            None => extensions.push(entry.trim_start_matches('.').to_string()),
        }
    }
    extensions.sort();
    extensions.dedup();
    tracing::debug!(?extensions, "file extensions");

    let alternation = extensions
        .iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r".*\.({alternation})$");
    tracing::debug!(pattern = %pattern, "extension regex");
    compile(&pattern).map(Some)
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Literal and regex rules that trim the start and end of each label token.
#[derive(Debug, Clone, Default)]
pub struct StripRules {
    literals: Vec<String>,
    regexes: Vec<Regex>,
}

impl StripRules {
    /// Each regex pattern `p` becomes `(?:p)$` followed by `^(?:p)`.
    pub fn new(literals: &[String], patterns: &[String]) -> Result<Self, ConfigError> {
        let mut regexes = Vec::with_capacity(patterns.len() * 2);
        for pattern in patterns {
            tracing::debug!(pattern = %pattern, "adding start/end strip regex");
            regexes.push(compile(&format!("(?:{pattern})$"))?);
            regexes.push(compile(&format!("^(?:{pattern})"))?);
        }
        Ok(Self {
            literals: literals.iter().filter(|s| !s.is_empty()).cloned().collect(),
            regexes,
        })
    }

    /// Strip literals first, then regexes, each removing at most one match.
    pub fn apply(&self, token: &str) -> String {
        let mut value = token.to_string();
        for literal in &self.literals {
            if let Some(rest) = value.strip_prefix(literal.as_str()) {
                value = rest.to_string();
            }
            if let Some(rest) = value.strip_suffix(literal.as_str()) {
                value = rest.to_string();
            }
        }
        for regex in &self.regexes {
            value = regex.replacen(&value, 1, "").into_owned();
        }
        value
    }
}
