// src/sink/row.rs

use anyhow::{anyhow, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{DataSink, RowConsumer};
use crate::catalog::{Catalog, Column};
use crate::extract::{self, RecordBuffer, Value};
use crate::properties::Properties;

/// One decoded record, values in declaration order. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    catalog: Arc<Catalog>,
    values: Vec<Option<Value>>,
}

impl Row {
    fn new(catalog: Arc<Catalog>) -> Self {
        let values = vec![None; catalog.len()];
        Self { catalog, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.catalog.position(name).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, Option<&Value>)> + '_ {
        self.catalog
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    /// Detach the values from the row, for consumers that keep them.
    pub fn to_values(&self) -> Vec<Option<Value>> {
        self.values.clone()
    }
}

/// `{ column name: value | null }`, in declaration order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (col, value) in self.iter() {
            map.serialize_entry(&col.name, &value)?;
        }
        map.end()
    }
}

/// Delivers every record to a [`RowConsumer`] as a fully typed [`Row`].
pub struct RowSink<C> {
    consumer: C,
    row: Option<Row>,
}

impl<C: RowConsumer> RowSink<C> {
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            row: None,
        }
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn into_consumer(self) -> C {
        self.consumer
    }
}

impl<C: RowConsumer> DataSink for RowSink<C> {
    fn set_properties(&mut self, properties: &Properties) -> Result<()> {
        let catalog = Arc::new(Catalog::build(&properties.metadata.columns)?);
        debug!(columns = catalog.len(), "row sink ready");
        self.row = Some(Row::new(catalog));
        self.consumer.accept_properties(properties)
    }

    fn push_row(&mut self, row_index: usize, buffer: RecordBuffer<'_>) -> Result<()> {
        let row = self
            .row
            .as_mut()
            .ok_or_else(|| anyhow!("push_row({}) before set_properties", row_index))?;
        for (slot, column) in row.values.iter_mut().zip(row.catalog.iter()) {
            *slot = extract::get_value(column, &buffer);
        }
        self.consumer.accept_row(row_index, row)
    }

    fn end_of_data(&mut self) -> Result<()> {
        // every row has already been delivered
        self.consumer.end_of_data()
    }
}
