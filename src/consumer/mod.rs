// src/consumer/mod.rs

pub mod parquet;

pub use self::parquet::ParquetWriter;

use anyhow::{bail, Result};

use crate::extract::Value;
use crate::properties::Properties;
use crate::sink::{Chunk, ChunkConsumer, Row, RowConsumer};

/// Keeps every delivered row in memory.
#[derive(Debug, Default)]
pub struct RowCollector {
    pub properties: Option<Properties>,
    pub rows: Vec<(usize, Vec<Option<Value>>)>,
    pub finished: bool,
}

impl RowConsumer for RowCollector {
    fn accept_properties(&mut self, properties: &Properties) -> Result<()> {
        if self.properties.is_some() {
            bail!("properties delivered twice");
        }
        self.properties = Some(properties.clone());
        Ok(())
    }

    fn accept_row(&mut self, row_index: usize, row: &Row) -> Result<()> {
        self.rows.push((row_index, row.to_values()));
        Ok(())
    }

    fn end_of_data(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Keeps every delivered chunk in memory.
#[derive(Debug, Default)]
pub struct ChunkCollector {
    pub properties: Option<Properties>,
    pub chunks: Vec<Chunk>,
    pub finished: bool,
}

impl ChunkCollector {
    pub fn total_rows(&self) -> usize {
        self.chunks.iter().map(Chunk::num_rows).sum()
    }
}

impl ChunkConsumer for ChunkCollector {
    fn accept_properties(&mut self, properties: &Properties) -> Result<()> {
        if self.properties.is_some() {
            bail!("properties delivered twice");
        }
        self.properties = Some(properties.clone());
        Ok(())
    }

    fn accept_chunk(&mut self, start_row: usize, end_row: usize, chunk: Chunk) -> Result<()> {
        let expected = self.chunks.last().map_or(0, |c| c.end_row() + 1);
        if start_row != expected || end_row < start_row {
            bail!(
                "chunk [{}, {}] does not continue from row {}",
                start_row,
                end_row,
                expected
            );
        }
        self.chunks.push(chunk);
        Ok(())
    }

    fn end_of_data(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
