use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a growth run.
#[derive(Error, Debug)]
pub enum Error {
    /// A log file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line holding exactly one token that is not an integer.
    #[error("{}:{line}: malformed timestamp token {token:?}", .path.display())]
    MalformedToken {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// The log had no record lines, so there is no time origin.
    #[error("{}: no timestamp records found", .path.display())]
    EmptySeries { path: PathBuf },

    /// The spread between earliest and latest record does not fit in an `i64`.
    #[error("{}: timestamps span too wide a range to normalize", .path.display())]
    TimestampRange { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(String),

    /// A series whose length differs from the chart's timeline.
    #[error("series {label:?} has {len} points but the timeline has {expected}")]
    Misaligned {
        label: String,
        len: usize,
        expected: usize,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = Error::Io {
            path: PathBuf::from("log_M.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("log_M.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn malformed_token_display() {
        let err = Error::MalformedToken {
            path: PathBuf::from("log.txt"),
            line: 7,
            token: "12ab".to_string(),
        };
        assert_eq!(err.to_string(), "log.txt:7: malformed timestamp token \"12ab\"");
    }

    #[test]
    fn empty_series_display() {
        let err = Error::EmptySeries { path: PathBuf::from("log_F.txt") };
        assert_eq!(err.to_string(), "log_F.txt: no timestamp records found");
    }

    #[test]
    fn misaligned_display() {
        let err = Error::Misaligned {
            label: "epoch size".to_string(),
            len: 3,
            expected: 600,
        };
        assert_eq!(
            err.to_string(),
            "series \"epoch size\" has 3 points but the timeline has 600"
        );
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops}").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
