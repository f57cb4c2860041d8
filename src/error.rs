use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every way a report run can fail. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Conflicting or unknown sort selections.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{}: no such file", path.display())]
    NotFound { path: PathBuf },

    /// A log or roster line carries fewer fields than required.
    #[error("{}:{line_no}: expected at least {expected} fields, found {found}: {line:?}", path.display())]
    Format { path: PathBuf, line_no: usize, expected: usize, found: usize, line: String },

    #[error("failed to read {}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ReportError {
    /// Maps an open/read failure on `path` to `NotFound` or `Io`.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReportError::NotFound { path: path.to_path_buf() }
        } else {
            ReportError::Io { path: path.to_path_buf(), source }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::InvalidArguments(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = ReportError::from_io(Path::new("/nope"), std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, ReportError::NotFound { .. }));
        assert_eq!(err.to_string(), "/nope: no such file");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let err = ReportError::from_io(Path::new("/x"), std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ReportError::Io { .. }));
        assert_eq!(err.to_string(), "failed to read /x");
        let chained = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chained.matches("permission denied").count(), 1, "{}", chained);
    }

    #[test]
    fn format_error_names_file_and_line() {
        let err = ReportError::Format { path: PathBuf::from("food"), line_no: 3, expected: 4, found: 2, line: "a b".to_string() };
        assert_eq!(err.to_string(), "food:3: expected at least 4 fields, found 2: \"a b\"");
    }

    #[test]
    fn conflicting_flags_exit_like_usage_errors() {
        assert_eq!(ReportError::InvalidArguments("x".into()).exit_code(), 2);
    }
}
