// Error types for calendar lookups, report parsing and the retrieval,
// signing and persistence collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the fiscal calendar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Period index outside `1..=12`.
    #[error("fiscal period must be in 1..=12, got {period}")]
    PeriodOutOfRange {
        /// The rejected index.
        period: u32,
    },

    /// Year outside the supported `1..=9999` range.
    #[error("fiscal year must be in 1..=9999, got {year}")]
    YearOutOfRange {
        /// The rejected year.
        year: i32,
    },

    /// Date arithmetic left the representable calendar.
    #[error("date out of range while building fiscal year {year}")]
    DateOutOfRange {
        /// Fiscal year being generated.
        year: i32,
    },
}

/// Errors raised while parsing or aggregating a report stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The stream had no header row.
    #[error("report has no header row")]
    MissingHeader,

    /// A data row does not have one cell per header title.
    #[error("line {line}: expected {expected} cells, found {found}")]
    RowWidth {
        /// 1-based line number in the stream.
        line: u64,
        /// Header width.
        expected: usize,
        /// Cells on the offending row.
        found: usize,
    },

    /// A row lacks the key or count column required by the report kind.
    #[error("line {line}: missing column `{column}`")]
    MissingColumn {
        /// Column title that was looked up.
        column: &'static str,
        /// 1-based line number in the stream.
        line: u64,
    },

    /// The count cell is not a signed integer.
    #[error("line {line}: count `{value}` is not an integer")]
    InvalidCount {
        /// Raw cell contents.
        value: String,
        /// 1-based line number in the stream.
        line: u64,
    },

    /// Adding the count to the running totals would overflow `i64`.
    #[error("line {line}: count `{value}` overflows the totals")]
    CountOverflow {
        /// Raw cell contents.
        value: String,
        /// 1-based line number in the stream.
        line: u64,
    },

    /// Low-level reader failure (invalid UTF-8, I/O).
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Errors raised while signing the API access token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The private key is not a PKCS#8 EC key in PEM form.
    #[error("private key must be a PKCS#8 EC key in PEM form: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// The key file could not be read.
    #[error("failed to read private key {path}: {source}")]
    Read {
        /// Key file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the report retrieval collaborator.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Transport failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("report service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The gzip payload could not be decompressed.
    #[error("failed to decompress report: {0}")]
    Decompress(#[source] std::io::Error),

    /// No report was available for the request (used by in-memory sources).
    #[error("no report available for {0}")]
    NotFound(String),
}

/// Errors raised by the persistence sink.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialising a summary failed.
    #[error("failed to encode {name}: {message}")]
    Encode {
        /// Target name.
        name: String,
        /// Encoder message.
        message: String,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialised.
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// Neither `private_key` nor `private_key_path` was set.
    #[error("credentials need `private_key` or `private_key_path`")]
    MissingPrivateKey,

    /// The configured key could not be used for signing.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Errors surfaced by report assembly.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Calendar lookup failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// The fetched report could not be parsed or aggregated.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A fetch failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Storing a report failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
