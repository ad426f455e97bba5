use crate::config::ConfigError;
use crate::inputs::InputError;
use crate::record::RecordError;

/// Any failure that aborts an analysis run.
#[derive(Debug)]
pub enum AnalyzerError {
    Config(ConfigError),
    Input(InputError),
    Record(RecordError),
    /// Writing the report failed.
    Output(std::io::Error),
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerError::Config(e) => write!(f, "{e}"),
            AnalyzerError::Input(e) => write!(f, "{e}"),
            AnalyzerError::Record(e) => write!(f, "{e}"),
            AnalyzerError::Output(e) => write!(f, "failed to write report: {e}"),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzerError::Config(e) => Some(e),
            AnalyzerError::Input(e) => Some(e),
            AnalyzerError::Record(e) => Some(e),
            AnalyzerError::Output(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AnalyzerError {
    fn from(e: ConfigError) -> Self {
        AnalyzerError::Config(e)
    }
}

impl From<InputError> for AnalyzerError {
    fn from(e: InputError) -> Self {
        AnalyzerError::Input(e)
    }
}

impl From<RecordError> for AnalyzerError {
    fn from(e: RecordError) -> Self {
        AnalyzerError::Record(e)
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(e: std::io::Error) -> Self {
        AnalyzerError::Output(e)
    }
}
