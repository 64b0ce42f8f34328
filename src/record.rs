//! Decoded records and pages.

/// One decoded record: field values in layout order.
///
/// Lookups by name return the last field with that name, so a duplicated
/// copybook name shadows the earlier value. Iteration still yields every
/// field in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    number: usize,
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record. `number` is the zero-based record index in the file.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            fields: Vec::new(),
        }
    }

    pub fn with_capacity(number: usize, capacity: usize) -> Self {
        Self {
            number,
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a field value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Zero-based index of this record in the data file.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Value of the named field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `(name, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Values in layout order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A run of consecutive decoded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    index: usize,
    rows: Vec<Record>,
}

impl Page {
    pub fn new(index: usize, rows: Vec<Record>) -> Self {
        Self { index, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-based page number.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Page {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
