// src/lib.rs

pub mod catalog;
pub mod config;
pub mod consumer;
pub mod extract;
pub mod logging;
pub mod properties;
pub mod reader;
pub mod sink;
pub mod source;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, Column, ColumnSpec, ColumnType};
pub use config::{Delivery, ParquetConfig, SinkConfig};
pub use consumer::{ChunkCollector, ParquetWriter, RowCollector};
pub use extract::{RecordBuffer, TimeOfDay, Value};
pub use properties::{Endianness, Properties};
pub use reader::Reader;
pub use sink::{
    Chunk, ChunkConsumer, ChunkSink, ColumnData, Consumer, DataSink, Row, RowConsumer, RowSink,
};
pub use source::{MemorySource, RecordSource};
