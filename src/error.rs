//! Error and warning types for copybook-view.
//!
//! Construction-time failures (`SchemaError`, most of `DatasetError`) are
//! fatal to the caller. `DatasetError::OutOfRange` and `DatasetError::Io`
//! from a page load are reported per call and leave the dataset untouched.
//! `DecodeError` never escapes a page load: the failing field is replaced
//! by a sentinel value.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or parsing a copybook.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The copybook file could not be read.
    #[error("copybook '{}' could not be read: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `PIC X` field definitions were found.
    #[error("copybook contains no PIC X field definitions")]
    Empty,

    /// A line did not match the field grammar and unmatched lines are rejected.
    #[error("line {line}: not a PIC X field definition: {text}")]
    Malformed { line: usize, text: String },

    /// The field lengths add up to more bytes than a record can address.
    #[error("record length overflows at field '{field}'")]
    RecordTooLong { field: String },
}

/// Errors raised while opening or paging a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("record length is {0}; the layout must define at least one byte")]
    InvalidRecordLength(usize),

    #[error("page size must be a positive integer")]
    InvalidPageSize,

    #[error("unsupported encoding '{0}' (expected an EBCDIC code page or a single-byte encoding)")]
    UnsupportedEncoding(String),

    /// The requested page does not exist. `requested` is the zero-based index.
    #[error("page {requested} is out of range ({total_pages} pages)")]
    OutOfRange { requested: i64, total_pages: usize },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal conditions found while opening a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetWarning {
    /// The file length is not a multiple of the record length; the trailing
    /// partial record is ignored.
    SizeMismatch {
        file_len: u64,
        record_length: usize,
        trailing_bytes: u64,
    },
}

impl std::fmt::Display for DatasetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetWarning::SizeMismatch {
                file_len,
                record_length,
                trailing_bytes,
            } => write!(
                f,
                "file length {file_len} is not a multiple of record length {record_length}; \
                 ignoring {trailing_bytes} trailing bytes"
            ),
        }
    }
}

/// A byte slice could not be decoded under the configured encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("byte 0x{byte:02X} at offset {offset} is not mapped in {encoding}")]
    Unmappable {
        encoding: &'static str,
        offset: usize,
        byte: u8,
    },
}

/// Text could not be encoded under the configured encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("character {ch:?} cannot be represented in {encoding}")]
    Unmappable { encoding: &'static str, ch: char },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
