//! # copybook-view
//!
//! Paged viewing of fixed-width, EBCDIC-encoded record files described by
//! COBOL copybooks.
//!
//! Mainframe data dumps are flat files of fixed-length records with no
//! delimiters. The layout of each record lives in a separate copybook:
//!
//! ```text
//! 01 CUSTOMER-RECORD.
//!    05 CUSTOMER-ID    PIC X(6).
//!    05 CUSTOMER-NAME  PIC X(20).
//! ```
//!
//! ## Overview
//!
//! - **Schema**: `PIC X(n)` field lines are parsed into an ordered field list
//! - **Layout**: fields get contiguous byte offsets; their sum is the record length
//! - **Dataset**: the data file is split into records and served page by page,
//!   each field decoded from a single-byte code page (IBM037 by default)
//! - **Search**: case-insensitive substring search over the current page
//!
//! ## Example
//!
//! ```
//! use copybook_view::{Codec, Dataset, parse_schema, search};
//!
//! let layout = parse_schema("05 ID PIC X(3).\n05 NAME PIC X(5).")
//!     .unwrap()
//!     .into_layout()
//!     .unwrap();
//! assert_eq!(layout.record_length(), 8);
//!
//! let ibm037 = Codec::for_name("IBM037").unwrap();
//! let mut bytes = ibm037.encode("001SMITH").unwrap();
//! bytes.extend(ibm037.encode("002JONES").unwrap());
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("customers.dat");
//! std::fs::write(&path, bytes).unwrap();
//!
//! let mut dataset = Dataset::open(&path, layout, 50, "IBM037").unwrap();
//! let page = dataset.get_page(0).unwrap();
//! assert_eq!(page.len(), 2);
//! assert_eq!(page.rows()[1].get("NAME"), Some("JONES"));
//!
//! let hits = search(dataset.current_page(), "NAME", "smi");
//! assert_eq!(hits[0].get("ID"), Some("001"));
//! ```

pub mod codec;
pub mod config;
pub mod dataset;
pub mod display;
pub mod error;
pub mod layout;
pub mod record;
pub mod schema;
pub mod search;

pub use codec::Codec;
pub use config::{DEFAULT_ENCODING, DEFAULT_PAGE_SIZE, LoadStrategy, OpenOptions};
pub use dataset::{
    Dataset, ERROR_READING_FIELD, PageTurn, open_dataset, open_dataset_with, sanitize,
};
pub use display::{render_table, status_line};
pub use error::{DatasetError, DatasetWarning, DecodeError, EncodeError, SchemaError};
pub use layout::{FieldDefinition, RecordLayout};
pub use record::{Page, Record};
pub use schema::{
    FieldSpec, ParsedSchema, SkippedLine, UnmatchedLines, load_schema, load_schema_with,
    parse_schema, parse_schema_with,
};
pub use search::search;
