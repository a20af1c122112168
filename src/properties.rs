// src/properties.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::ColumnSpec;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Unknown,
    Unix,
    Windows,
}

/// Page compression declared by the file. Decompression itself belongs to the decoder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Rle,
    Rdc,
}

/// File header as reported by the decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Header {
    pub endianness: Endianness,
    pub platform: Platform,
    pub date_created: NaiveDateTime,
    pub date_modified: NaiveDateTime,
    pub dataset_name: String,
    pub encoding: String,
    pub file_type: String,
    pub sas_release: String,
    pub sas_server_type: String,
    pub os_type: String,
    pub os_name: String,
    pub header_length: usize,
    pub page_length: usize,
    pub page_count: usize,
}

/// Dataset metadata, including the declared row count and the column layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Metadata {
    pub compression: Compression,
    pub creator: String,
    pub creator_proc: String,
    pub row_length: usize,
    pub row_count: usize,
    pub column_count: usize,
    pub col_count_p1: usize,
    pub col_count_p2: usize,
    pub mix_page_row_count: usize,
    pub lcs: usize,
    pub lcp: usize,
    pub columns: Vec<ColumnSpec>,
}

/// Everything the decoder knows before the first row. Handed to sinks once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Properties {
    pub header: Header,
    pub metadata: Metadata,
}

impl Properties {
    pub fn row_count(&self) -> usize {
        self.metadata.row_count
    }

    pub fn endianness(&self) -> Endianness {
        self.header.endianness
    }
}
