//! Dataset open options.

/// Records per page when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Encoding used when none is given.
pub const DEFAULT_ENCODING: &str = "IBM037";

/// How record bytes are read from the data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Read every whole record into memory at open time.
    #[default]
    Eager,
    /// Keep the file open and read only the requested page's byte range.
    Seek,
}

/// Options for [`Dataset::open_with`](crate::Dataset::open_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub page_size: usize,
    pub encoding: String,
    pub strategy: LoadStrategy,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            encoding: DEFAULT_ENCODING.to_string(),
            strategy: LoadStrategy::default(),
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
