// src/reader.rs

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::extract::RecordBuffer;
use crate::properties::{Endianness, Properties};
use crate::sink::{Consumer, DataSink};
use crate::source::RecordSource;

/// Pulls records from a [`RecordSource`] and pushes them into a [`DataSink`].
///
/// The sink gets `set_properties` on construction and `end_of_data` exactly
/// once, when the source runs dry. Stopping before that leaves any partially
/// filled chunk undelivered.
pub struct Reader<S, K> {
    source: S,
    sink: K,
    endianness: Endianness,
    row_index: usize,
    finished: bool,
}

impl<S: RecordSource, K: DataSink> Reader<S, K> {
    pub fn new(source: S, mut sink: K) -> Result<Self> {
        let properties = source.properties();
        sink.set_properties(properties).with_context(|| {
            format!("setting up sink for `{}`", properties.header.dataset_name)
        })?;
        Ok(Self {
            endianness: properties.endianness(),
            source,
            sink,
            row_index: 0,
            finished: false,
        })
    }

    /// Push the next record. Returns `false` once the source is exhausted.
    pub fn read_row(&mut self) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        match self.source.next_record()? {
            Some(bytes) => {
                self.sink
                    .push_row(self.row_index, RecordBuffer::new(bytes, self.endianness))
                    .with_context(|| format!("row {}", self.row_index))?;
                self.row_index += 1;
                Ok(true)
            }
            None => {
                self.finished = true;
                debug!(rows = self.row_index, "source exhausted");
                self.sink.end_of_data()?;
                Ok(false)
            }
        }
    }

    /// Push up to `n` records. Returns `false` if the source ran out.
    pub fn read_rows(&mut self, n: usize) -> Result<bool> {
        for _ in 0..n {
            if !self.read_row()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Push every remaining record and finish. Returns the total row count.
    #[tracing::instrument(skip(self), fields(dataset = %self.source.properties().header.dataset_name))]
    pub fn read_all(&mut self) -> Result<usize> {
        while self.read_row()? {}
        info!(rows = self.row_index, "read complete");
        Ok(self.row_index)
    }

    /// Index the next record will be pushed with.
    pub fn current_row_index(&self) -> usize {
        self.row_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn properties(&self) -> &Properties {
        self.source.properties()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}

impl<S: RecordSource> Reader<S, Box<dyn DataSink>> {
    /// Build the sink matching `consumer` and start reading into it.
    pub fn with_consumer(source: S, consumer: Consumer) -> Result<Self> {
        Self::new(source, consumer.into_sink())
    }
}
