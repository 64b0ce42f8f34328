//! Paged decoding of fixed-length record files.
//!
//! A [`Dataset`] is opened once per data file. Record and page counts are
//! derived from the file length at open time and never change afterwards;
//! the file is not watched. Pages are decoded on request and the most
//! recently loaded page is cached as the dataset's current page.
//!
//! Decoding is tolerant at field granularity: a field whose bytes cannot be
//! decoded becomes [`ERROR_READING_FIELD`] while the rest of the record is
//! decoded normally.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec::Codec;
use crate::config::{LoadStrategy, OpenOptions};
use crate::error::{DatasetError, DatasetWarning, Result};
use crate::layout::RecordLayout;
use crate::record::{Page, Record};
use crate::schema::load_schema;
use crate::search::search;

/// Value substituted for a field whose bytes cannot be decoded.
pub const ERROR_READING_FIELD: &str = "ERROR_READING_FIELD";

/// Where record bytes come from after open.
enum Source {
    /// Every whole record, loaded at open time.
    Memory(Vec<u8>),
    /// The data file, read one page at a time.
    File(File),
}

impl Source {
    /// Bytes of `count` consecutive records starting at record `first`.
    fn read(&self, first: usize, count: usize, record_length: usize) -> io::Result<Cow<'_, [u8]>> {
        let start = first * record_length;
        let len = count * record_length;
        match self {
            Source::Memory(bytes) => bytes
                .get(start..start + len)
                .map(Cow::Borrowed)
                .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof)),
            Source::File(file) => {
                let mut reader = file;
                let mut buf = vec![0u8; len];
                reader.seek(SeekFrom::Start(start as u64))?;
                reader.read_exact(&mut buf)?;
                Ok(Cow::Owned(buf))
            }
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            Source::File(_) => f.write_str("File"),
        }
    }
}

/// Result of [`Dataset::next_page`] and [`Dataset::previous_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn<'a> {
    /// The neighbouring page was loaded and is now current.
    Moved(&'a Page),
    /// Already on the first or last page; the current page is unchanged.
    AtBoundary(&'a Page),
}

impl<'a> PageTurn<'a> {
    pub fn page(&self) -> &'a Page {
        match *self {
            PageTurn::Moved(page) | PageTurn::AtBoundary(page) => page,
        }
    }

    pub fn moved(&self) -> bool {
        matches!(self, PageTurn::Moved(_))
    }
}

/// An open fixed-length record file.
#[derive(Debug)]
pub struct Dataset {
    layout: RecordLayout,
    path: PathBuf,
    codec: Codec,
    encoding_name: String,
    page_size: usize,
    strategy: LoadStrategy,
    source: Source,
    total_records: usize,
    total_pages: usize,
    current_page: Option<usize>,
    cached_page: Page,
    warnings: Vec<DatasetWarning>,
}

impl Dataset {
    /// Open a data file with the default load strategy.
    pub fn open(
        path: impl AsRef<Path>,
        layout: RecordLayout,
        page_size: usize,
        encoding: &str,
    ) -> Result<Self> {
        let options = OpenOptions::new().page_size(page_size).encoding(encoding);
        Self::open_with(path, layout, &options)
    }

    /// Open a data file.
    ///
    /// Fails if the layout has no bytes, the page size is zero, the encoding
    /// is not a single-byte encoding, or the file cannot be read. A file
    /// length that is not a multiple of the record length is only a warning.
    pub fn open_with(
        path: impl AsRef<Path>,
        layout: RecordLayout,
        options: &OpenOptions,
    ) -> Result<Self> {
        let record_length = layout.record_length();
        if record_length == 0 {
            return Err(DatasetError::InvalidRecordLength(record_length));
        }
        if options.page_size == 0 {
            return Err(DatasetError::InvalidPageSize);
        }
        let codec = Codec::for_name(&options.encoding)?;

        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();

        let total_records = (file_len / record_length as u64) as usize;
        let trailing_bytes = file_len % record_length as u64;

        let mut warnings = Vec::new();
        if trailing_bytes != 0 {
            let warning = DatasetWarning::SizeMismatch {
                file_len,
                record_length,
                trailing_bytes,
            };
            warn!(path = %path.display(), "{warning}");
            warnings.push(warning);
        }

        let source = match options.strategy {
            LoadStrategy::Eager => {
                let mut bytes = vec![0u8; total_records * record_length];
                file.read_exact(&mut bytes)?;
                Source::Memory(bytes)
            }
            LoadStrategy::Seek => Source::File(file),
        };

        let total_pages = total_records.div_ceil(options.page_size);

        debug!(
            path = %path.display(),
            record_length,
            total_records,
            total_pages,
            encoding = codec.name(),
            "opened dataset"
        );

        Ok(Self {
            layout,
            path,
            codec,
            encoding_name: options.encoding.clone(),
            page_size: options.page_size,
            strategy: options.strategy,
            source,
            total_records,
            total_pages,
            current_page: None,
            cached_page: Page::empty(),
            warnings,
        })
    }

    /// Decode a page and make it the current page.
    ///
    /// With no records, returns an empty page and leaves the current page
    /// untouched. An out-of-range page number is reported as
    /// [`DatasetError::OutOfRange`] without changing the current page.
    pub fn get_page(&mut self, page_number: i64) -> Result<&Page> {
        if self.total_records == 0 {
            return Ok(&self.cached_page);
        }

        let index = usize::try_from(page_number)
            .ok()
            .filter(|&n| n < self.total_pages)
            .ok_or(DatasetError::OutOfRange {
                requested: page_number,
                total_pages: self.total_pages,
            })?;

        self.load(index)
    }

    /// Load the page after the current one, or page 0 if none is loaded yet.
    pub fn next_page(&mut self) -> Result<PageTurn<'_>> {
        let next = self.current_page.map_or(0, |n| n + 1);
        if next >= self.total_pages {
            return Ok(PageTurn::AtBoundary(&self.cached_page));
        }
        self.load(next).map(PageTurn::Moved)
    }

    /// Load the page before the current one.
    pub fn previous_page(&mut self) -> Result<PageTurn<'_>> {
        match self.current_page {
            Some(n) if n > 0 => self.load(n - 1).map(PageTurn::Moved),
            _ => Ok(PageTurn::AtBoundary(&self.cached_page)),
        }
    }

    /// The most recently loaded page, or an empty page if none was loaded.
    pub fn current_page(&self) -> &Page {
        &self.cached_page
    }

    /// Search the current page without decoding anything.
    pub fn search_current(&self, field_name: &str, term: &str) -> Vec<&Record> {
        search(&self.cached_page, field_name, term)
    }

    fn load(&mut self, index: usize) -> Result<&Page> {
        let page = self.decode_page(index)?;
        self.current_page = Some(index);
        self.cached_page = page;
        Ok(&self.cached_page)
    }

    fn decode_page(&self, index: usize) -> Result<Page> {
        let record_length = self.layout.record_length();
        let first = index * self.page_size;
        let count = self.page_size.min(self.total_records - first);

        let bytes = self.source.read(first, count, record_length)?;
        let rows: Vec<Record> = bytes
            .chunks_exact(record_length)
            .enumerate()
            .map(|(i, block)| decode_record(&self.layout, self.codec, first + i, block))
            .collect();

        debug!(page = index, first, rows = rows.len(), "decoded page");
        Ok(Page::new(index, rows))
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.layout.field_names()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The encoding name as given when the dataset was opened.
    pub fn encoding_name(&self) -> &str {
        &self.encoding_name
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn strategy(&self) -> LoadStrategy {
        self.strategy
    }

    pub fn record_length(&self) -> usize {
        self.layout.record_length()
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Zero-based index of the current page, if one was loaded.
    pub fn current_page_index(&self) -> Option<usize> {
        self.current_page
    }

    /// Non-fatal conditions found at open time.
    pub fn warnings(&self) -> &[DatasetWarning] {
        &self.warnings
    }
}

/// Parse a copybook file and open a data file against it.
pub fn open_dataset(
    data_path: impl AsRef<Path>,
    schema_path: impl AsRef<Path>,
    page_size: usize,
    encoding: &str,
) -> Result<Dataset> {
    let options = OpenOptions::new().page_size(page_size).encoding(encoding);
    open_dataset_with(data_path, schema_path, &options)
}

/// [`open_dataset`] with explicit options.
pub fn open_dataset_with(
    data_path: impl AsRef<Path>,
    schema_path: impl AsRef<Path>,
    options: &OpenOptions,
) -> Result<Dataset> {
    let layout = load_schema(schema_path)?.into_layout()?;
    Dataset::open_with(data_path, layout, options)
}

/// Decode one record's bytes field by field.
fn decode_record(layout: &RecordLayout, codec: Codec, number: usize, block: &[u8]) -> Record {
    let mut record = Record::with_capacity(number, layout.len());

    for field in layout.fields() {
        let decoded = block
            .get(field.range())
            .ok_or_else(|| format!("record is shorter than field end {}", field.range().end))
            .and_then(|bytes| codec.decode(bytes).map_err(|e| e.to_string()));

        let value = match decoded {
            Ok(text) => sanitize(&text),
            Err(reason) => {
                warn!(record = number, field = field.name(), %reason, "cannot decode field");
                ERROR_READING_FIELD.to_string()
            }
        };
        record.push(field.name(), value);
    }

    record
}

/// Replace control characters (C0, DEL and C1) with `.`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}
