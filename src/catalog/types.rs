// src/catalog/types.rs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six value kinds a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Number,
    DateTime,
    Date,
    Time,
}

impl ColumnType {
    /// Order in which type partitions are laid out in a chunk.
    pub const CANONICAL_ORDER: [ColumnType; 6] = [
        ColumnType::Number,
        ColumnType::Integer,
        ColumnType::DateTime,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::String,
    ];

    /// Position of this type in [`Self::CANONICAL_ORDER`].
    pub fn canonical_index(self) -> usize {
        match self {
            ColumnType::Number => 0,
            ColumnType::Integer => 1,
            ColumnType::DateTime => 2,
            ColumnType::Date => 3,
            ColumnType::Time => 4,
            ColumnType::String => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::DateTime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "string" => ColumnType::String,
            "integer" => ColumnType::Integer,
            "number" => ColumnType::Number,
            "datetime" => ColumnType::DateTime,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            _ => bail!("unknown column type `{}`", s),
        };
        Ok(ty)
    }
}

/// A column as described by the decoder's metadata, type tag still unchecked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub format: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Byte offset of the cell inside a record.
    pub offset: usize,
    /// Width of the cell in bytes.
    pub length: usize,
}

/// A validated column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub format: String,
    pub ty: ColumnType,
    pub offset: usize,
    pub length: usize,
}

impl TryFrom<&ColumnSpec> for Column {
    type Error = anyhow::Error;

    fn try_from(spec: &ColumnSpec) -> Result<Self> {
        Ok(Column {
            name: spec.name.clone(),
            label: spec.label.clone(),
            format: spec.format.clone(),
            ty: spec.ty.parse()?,
            offset: spec.offset,
            length: spec.length,
        })
    }
}
