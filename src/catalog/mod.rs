// src/catalog/mod.rs

pub mod arrow;
pub mod types;

pub use self::arrow::{build_arrow_schema, map_to_arrow_type};
pub use self::types::{Column, ColumnSpec, ColumnType};

use anyhow::{Context, Result};
use tracing::debug;

/// Ordered, typed description of every column plus its six-way type partition.
///
/// Partitions hold indices into the declaration order, so each column lives
/// in exactly one partition and keeps its relative position there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    columns: Vec<Column>,
    partitions: [Vec<usize>; 6],
}

impl Catalog {
    /// Validate the decoder's column specs. Fails on an unknown type tag.
    pub fn build(specs: &[ColumnSpec]) -> Result<Self> {
        let columns = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Column::try_from(spec)
                    .with_context(|| format!("column #{} `{}`", i, spec.name))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut partitions: [Vec<usize>; 6] = Default::default();
        for (i, col) in columns.iter().enumerate() {
            partitions[col.ty.canonical_index()].push(i);
        }

        debug!(
            columns = columns.len(),
            numbers = partitions[0].len(),
            integers = partitions[1].len(),
            datetimes = partitions[2].len(),
            dates = partitions[3].len(),
            times = partitions[4].len(),
            strings = partitions[5].len(),
            "built column catalog"
        );

        Ok(Self {
            columns,
            partitions,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Declaration indices of the columns of type `ty`.
    pub fn partition_indices(&self, ty: ColumnType) -> &[usize] {
        &self.partitions[ty.canonical_index()]
    }

    /// Columns of type `ty`, in declaration order.
    pub fn partition(&self, ty: ColumnType) -> impl Iterator<Item = &Column> + '_ {
        self.partition_indices(ty).iter().map(|&i| &self.columns[i])
    }

    /// Declaration indices of all columns, partitions concatenated in canonical order.
    pub fn canonical_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.partitions.iter().flatten().copied()
    }

    /// All columns, partitions concatenated in canonical order.
    pub fn canonical(&self) -> impl Iterator<Item = &Column> + '_ {
        self.canonical_indices().map(|i| &self.columns[i])
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
