// src/source.rs

use anyhow::Result;

use crate::properties::Properties;

/// Anything that can hand out a dataset's properties and then its raw records
/// one at a time.
pub trait RecordSource {
    fn properties(&self) -> &Properties;

    /// The next record's bytes, or `None` once the dataset is exhausted.
    fn next_record(&mut self) -> Result<Option<&[u8]>>;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn properties(&self) -> &Properties {
        (**self).properties()
    }

    fn next_record(&mut self) -> Result<Option<&[u8]>> {
        (**self).next_record()
    }
}

/// Pre-encoded records held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    properties: Properties,
    records: Vec<Vec<u8>>,
    next: usize,
}

impl MemorySource {
    pub fn new(properties: Properties, records: Vec<Vec<u8>>) -> Self {
        Self {
            properties,
            records,
            next: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len() - self.next
    }
}

impl RecordSource for MemorySource {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn next_record(&mut self) -> Result<Option<&[u8]>> {
        let record = self.records.get(self.next).map(Vec::as_slice);
        if record.is_some() {
            self.next += 1;
        }
        Ok(record)
    }
}
