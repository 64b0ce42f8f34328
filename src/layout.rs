//! Record layout: field byte offsets within a fixed-length record.

use crate::error::SchemaError;
use crate::schema::FieldSpec;

/// A field with its position in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    name: String,
    offset: usize,
    length: usize,
}

impl FieldDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based byte offset within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Byte range of this field within a record.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Ordered, contiguous fields of a fixed-length record.
///
/// `fields[i].offset() == sum(fields[..i].length())` and
/// `record_length() == sum(fields.length())`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldDefinition>,
    record_length: usize,
}

impl RecordLayout {
    /// Assign cumulative offsets to fields in declaration order.
    ///
    /// An empty field list gives a zero record length, which
    /// [`Dataset::open`](crate::Dataset::open) rejects. Fails with
    /// [`SchemaError::RecordTooLong`] if the lengths do not fit in a `usize`.
    pub fn compute(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, SchemaError> {
        let mut offset = 0usize;
        let mut defs = Vec::new();
        for spec in fields {
            let end = offset
                .checked_add(spec.length)
                .ok_or_else(|| SchemaError::RecordTooLong {
                    field: spec.name.clone(),
                })?;
            defs.push(FieldDefinition {
                name: spec.name,
                offset,
                length: spec.length,
            });
            offset = end;
        }

        Ok(Self {
            fields: defs,
            record_length: offset,
        })
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Look up a field by name. With duplicate names, the last one wins.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().rev().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn record_length(&self) -> usize {
        self.record_length
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
