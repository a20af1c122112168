// src/sink/chunk.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{
    ArrayRef, Date32Array, DurationMicrosecondArray, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{ChunkConsumer, DataSink};
use crate::catalog::{build_arrow_schema, Catalog, Column, ColumnType};
use crate::extract::{self, RecordBuffer, TimeOfDay, Value};
use crate::properties::Properties;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Values of one column across the rows of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Number(Vec<Option<f64>>),
    Integer(Vec<i64>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Date(Vec<Option<NaiveDate>>),
    Time(Vec<Option<TimeOfDay>>),
    String(Vec<String>),
}

impl ColumnData {
    fn with_capacity(ty: ColumnType, capacity: usize) -> Self {
        match ty {
            ColumnType::Number => ColumnData::Number(Vec::with_capacity(capacity)),
            ColumnType::Integer => ColumnData::Integer(Vec::with_capacity(capacity)),
            ColumnType::DateTime => ColumnData::DateTime(Vec::with_capacity(capacity)),
            ColumnType::Date => ColumnData::Date(Vec::with_capacity(capacity)),
            ColumnType::Time => ColumnData::Time(Vec::with_capacity(capacity)),
            ColumnType::String => ColumnData::String(Vec::with_capacity(capacity)),
        }
    }

    /// Decode `column`'s cell from `buf` and append it.
    fn push_cell(&mut self, column: &Column, buf: &RecordBuffer<'_>) {
        match self {
            ColumnData::Number(v) => v.push(extract::get_number(column, buf)),
            ColumnData::Integer(v) => v.push(extract::get_integer(column, buf)),
            ColumnData::DateTime(v) => v.push(extract::get_datetime(column, buf)),
            ColumnData::Date(v) => v.push(extract::get_date(column, buf)),
            ColumnData::Time(v) => v.push(extract::get_time(column, buf)),
            ColumnData::String(v) => v.push(extract::get_string(column, buf)),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Number(_) => ColumnType::Number,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::DateTime(_) => ColumnType::DateTime,
            ColumnData::Date(_) => ColumnType::Date,
            ColumnData::Time(_) => ColumnType::Time,
            ColumnData::String(_) => ColumnType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Number(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Time(v) => v.len(),
            ColumnData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots reserved for the chunk being filled.
    pub fn capacity(&self) -> usize {
        match self {
            ColumnData::Number(v) => v.capacity(),
            ColumnData::Integer(v) => v.capacity(),
            ColumnData::DateTime(v) => v.capacity(),
            ColumnData::Date(v) => v.capacity(),
            ColumnData::Time(v) => v.capacity(),
            ColumnData::String(v) => v.capacity(),
        }
    }

    /// Value at `offset` rows into the chunk; `None` if missing or out of range.
    pub fn value(&self, offset: usize) -> Option<Value> {
        match self {
            ColumnData::Number(v) => v.get(offset).copied().flatten().map(Value::Number),
            ColumnData::Integer(v) => v.get(offset).copied().map(Value::Integer),
            ColumnData::DateTime(v) => v.get(offset).copied().flatten().map(Value::DateTime),
            ColumnData::Date(v) => v.get(offset).copied().flatten().map(Value::Date),
            ColumnData::Time(v) => v.get(offset).copied().flatten().map(Value::Time),
            ColumnData::String(v) => v.get(offset).cloned().map(Value::String),
        }
    }

    pub fn to_arrow(&self) -> ArrayRef {
        match self {
            ColumnData::Number(v) => Arc::new(Float64Array::from(v.clone())),
            ColumnData::Integer(v) => Arc::new(Int64Array::from(v.clone())),
            ColumnData::DateTime(v) => Arc::new(TimestampMicrosecondArray::from(
                v.iter()
                    .map(|dt| dt.map(|dt| dt.and_utc().timestamp_micros()))
                    .collect::<Vec<_>>(),
            )),
            ColumnData::Date(v) => Arc::new(Date32Array::from(
                v.iter()
                    .map(|d| d.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                    .collect::<Vec<_>>(),
            )),
            ColumnData::Time(v) => Arc::new(DurationMicrosecondArray::from(
                v.iter()
                    .map(|t| t.map(|t| t.as_micros()))
                    .collect::<Vec<_>>(),
            )),
            ColumnData::String(v) => Arc::new(StringArray::from_iter_values(v.iter())),
        }
    }
}

/// A contiguous run of rows `[start_row, end_row]` stored column by column.
///
/// Columns are laid out in the catalog's canonical order (numbers, integers,
/// datetimes, dates, times, strings). The chunk owns its data.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    start_row: usize,
    end_row: usize,
    rows: usize,
    catalog: Arc<Catalog>,
    columns: Vec<ColumnData>,
}

impl Chunk {
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Inclusive.
    pub fn end_row(&self) -> usize {
        self.end_row
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &ColumnData)> + '_ {
        self.catalog.canonical().zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.iter()
            .find(|(col, _)| col.name == name)
            .map(|(_, data)| data)
    }

    /// The columns of type `ty`, in declaration order.
    pub fn partition(&self, ty: ColumnType) -> &[ColumnData] {
        let start: usize = ColumnType::CANONICAL_ORDER[..ty.canonical_index()]
            .iter()
            .map(|&t| self.catalog.partition_indices(t).len())
            .sum();
        let end = start + self.catalog.partition_indices(ty).len();
        &self.columns[start..end]
    }

    /// Values of the row `offset` rows into the chunk, in declaration order.
    pub fn row(&self, offset: usize) -> Option<Vec<Option<Value>>> {
        if offset >= self.rows {
            return None;
        }
        let mut values = vec![None; self.catalog.len()];
        for (data, index) in self.columns.iter().zip(self.catalog.canonical_indices()) {
            values[index] = data.value(offset);
        }
        Some(values)
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = build_arrow_schema(&self.catalog);
        let arrays: Vec<ArrayRef> = self.columns.iter().map(ColumnData::to_arrow).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.rows));
        RecordBatch::try_new_with_options(schema, arrays, &options).with_context(|| {
            format!(
                "building record batch for rows {}..={}",
                self.start_row, self.end_row
            )
        })
    }
}

/// Buffers records into fixed-capacity columnar [`Chunk`]s.
///
/// Each chunk holds `capacity` rows except the last, which is allocated at
/// exactly the rows the dataset declares are left.
pub struct ChunkSink<C> {
    consumer: C,
    capacity: usize,
    row_count: usize,
    catalog: Option<Arc<Catalog>>,
    columns: Vec<ColumnData>,
    idata: usize,
    start_row: usize,
    end_row: usize,
    finished: bool,
    failed: bool,
}

impl<C: ChunkConsumer> ChunkSink<C> {
    pub fn new(consumer: C, capacity: NonZeroUsize) -> Self {
        Self {
            consumer,
            capacity: capacity.get(),
            row_count: 0,
            catalog: None,
            columns: Vec::new(),
            idata: 0,
            start_row: 0,
            end_row: 0,
            finished: false,
            failed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn into_consumer(self) -> C {
        self.consumer
    }

    /// Rows held in the chunk currently being filled.
    pub fn pending_rows(&self) -> usize {
        self.idata
    }

    /// Slots allocated for the chunk currently being filled.
    pub fn buffer_size(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::capacity)
    }

    fn prepare_columns(&mut self, size: usize) -> Result<()> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| anyhow!("chunk buffers requested before set_properties"))?;
        self.columns = catalog
            .canonical()
            .map(|col| ColumnData::with_capacity(col.ty, size))
            .collect();
        Ok(())
    }

    /// Size of the chunk starting at `start_row`: the full capacity, unless
    /// that would run past the declared row count.
    fn next_chunk_size(&self) -> usize {
        if self.start_row.saturating_add(self.capacity) > self.row_count
            && self.start_row < self.row_count
        {
            self.row_count - self.start_row
        } else {
            self.capacity
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.idata == 0 {
            return Ok(());
        }
        let catalog = self
            .catalog
            .clone()
            .ok_or_else(|| anyhow!("flush before set_properties"))?;
        let chunk = Chunk {
            start_row: self.start_row,
            end_row: self.end_row,
            rows: self.idata,
            catalog,
            columns: std::mem::take(&mut self.columns),
        };
        trace!(
            start_row = self.start_row,
            end_row = self.end_row,
            rows = self.idata,
            "flushing chunk"
        );
        // the chunk's rows are gone; nothing after this point can be delivered
        if let Err(e) = self.consumer.accept_chunk(self.start_row, self.end_row, chunk) {
            self.failed = true;
            return Err(e);
        }
        self.idata = 0;
        self.start_row = self.end_row + 1;
        Ok(())
    }
}

impl<C: ChunkConsumer> DataSink for ChunkSink<C> {
    fn set_properties(&mut self, properties: &Properties) -> Result<()> {
        self.row_count = properties.row_count();
        self.catalog = Some(Arc::new(Catalog::build(&properties.metadata.columns)?));
        self.idata = 0;
        self.start_row = 0;
        self.end_row = 0;
        self.finished = false;
        self.failed = false;

        let size = self.capacity.min(self.row_count);
        self.prepare_columns(size)?;
        debug!(
            capacity = self.capacity,
            row_count = self.row_count,
            first_chunk = size,
            "chunk sink ready"
        );
        self.consumer.accept_properties(properties)
    }

    fn push_row(&mut self, row_index: usize, buffer: RecordBuffer<'_>) -> Result<()> {
        if self.failed {
            bail!("push_row({}) after a chunk was rejected", row_index);
        }
        if self.finished {
            bail!("push_row({}) after end_of_data", row_index);
        }
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| anyhow!("push_row({}) before set_properties", row_index))?;
        for (data, column) in self.columns.iter_mut().zip(catalog.canonical()) {
            data.push_cell(column, &buffer);
        }
        self.end_row = row_index;
        self.idata += 1;

        if self.idata == self.capacity {
            self.flush()?;
            let size = self.next_chunk_size();
            if size < self.capacity {
                debug!(
                    start_row = self.start_row,
                    rows = size,
                    "sizing final chunk to the declared row count"
                );
            }
            self.prepare_columns(size)?;
        }
        Ok(())
    }

    fn end_of_data(&mut self) -> Result<()> {
        if self.failed {
            bail!("end_of_data after a chunk was rejected");
        }
        self.flush()?;
        self.finished = true;
        self.consumer.end_of_data()
    }
}
