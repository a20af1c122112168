// src/sink/mod.rs

pub mod chunk;
pub mod row;

pub use chunk::{Chunk, ChunkSink, ColumnData};
pub use row::{Row, RowSink};

use anyhow::Result;
use std::num::NonZeroUsize;

use crate::extract::RecordBuffer;
use crate::properties::Properties;

/// The three calls a decoder makes while reading a dataset:
/// `set_properties` once, `push_row` per record with increasing indices,
/// then `end_of_data` once.
pub trait DataSink {
    fn set_properties(&mut self, properties: &Properties) -> Result<()>;
    fn push_row(&mut self, row_index: usize, buffer: RecordBuffer<'_>) -> Result<()>;
    fn end_of_data(&mut self) -> Result<()>;
}

impl<S: DataSink + ?Sized> DataSink for Box<S> {
    fn set_properties(&mut self, properties: &Properties) -> Result<()> {
        (**self).set_properties(properties)
    }

    fn push_row(&mut self, row_index: usize, buffer: RecordBuffer<'_>) -> Result<()> {
        (**self).push_row(row_index, buffer)
    }

    fn end_of_data(&mut self) -> Result<()> {
        (**self).end_of_data()
    }
}

/// Receives one row per record.
///
/// The row is lent for the duration of the call; the sink overwrites it for
/// the next record.
pub trait RowConsumer {
    fn accept_properties(&mut self, _properties: &Properties) -> Result<()> {
        Ok(())
    }

    fn accept_row(&mut self, row_index: usize, row: &Row) -> Result<()>;

    fn end_of_data(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<C: RowConsumer + ?Sized> RowConsumer for Box<C> {
    fn accept_properties(&mut self, properties: &Properties) -> Result<()> {
        (**self).accept_properties(properties)
    }

    fn accept_row(&mut self, row_index: usize, row: &Row) -> Result<()> {
        (**self).accept_row(row_index, row)
    }

    fn end_of_data(&mut self) -> Result<()> {
        (**self).end_of_data()
    }
}

/// Receives columnar chunks covering `[start_row, end_row]`, in row order.
pub trait ChunkConsumer {
    fn accept_properties(&mut self, _properties: &Properties) -> Result<()> {
        Ok(())
    }

    fn accept_chunk(&mut self, start_row: usize, end_row: usize, chunk: Chunk) -> Result<()>;

    fn end_of_data(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<C: ChunkConsumer + ?Sized> ChunkConsumer for Box<C> {
    fn accept_properties(&mut self, properties: &Properties) -> Result<()> {
        (**self).accept_properties(properties)
    }

    fn accept_chunk(&mut self, start_row: usize, end_row: usize, chunk: Chunk) -> Result<()> {
        (**self).accept_chunk(start_row, end_row, chunk)
    }

    fn end_of_data(&mut self) -> Result<()> {
        (**self).end_of_data()
    }
}

/// The downstream side, chosen once when the sink is built.
pub enum Consumer {
    Rows(Box<dyn RowConsumer>),
    Chunks {
        capacity: NonZeroUsize,
        consumer: Box<dyn ChunkConsumer>,
    },
}

impl Consumer {
    pub fn rows(consumer: impl RowConsumer + 'static) -> Self {
        Consumer::Rows(Box::new(consumer))
    }

    pub fn chunks(capacity: NonZeroUsize, consumer: impl ChunkConsumer + 'static) -> Self {
        Consumer::Chunks {
            capacity,
            consumer: Box::new(consumer),
        }
    }

    /// Row delivery gets a [`RowSink`], chunked delivery a [`ChunkSink`].
    pub fn into_sink(self) -> Box<dyn DataSink> {
        match self {
            Consumer::Rows(consumer) => Box::new(RowSink::new(consumer)),
            Consumer::Chunks { capacity, consumer } => {
                Box::new(ChunkSink::new(consumer, capacity))
            }
        }
    }
}
