// src/config.rs

use anyhow::{bail, Context, Result};
use parquet::basic::{BrotliLevel, Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::debug;

/// Overrides `chunk_size` from the loaded file.
pub const CHUNK_SIZE_ENV: &str = "SAS7SINK_CHUNK_SIZE";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParquetCompression {
    None,
    #[default]
    Snappy,
    Zstd,
    Brotli,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParquetConfig {
    pub compression: ParquetCompression,
    pub dictionary: bool,
}

impl Default for ParquetConfig {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::Snappy,
            dictionary: true,
        }
    }
}

impl ParquetConfig {
    pub fn writer_properties(&self) -> Result<WriterProperties> {
        let compression = match self.compression {
            ParquetCompression::None => Compression::UNCOMPRESSED,
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::try_new(3)?),
            ParquetCompression::Brotli => Compression::BROTLI(BrotliLevel::try_new(5)?),
        };
        Ok(WriterProperties::builder()
            .set_compression(compression)
            .set_dictionary_enabled(self.dictionary)
            .build())
    }
}

/// How rows reach the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Rows,
    Chunks(NonZeroUsize),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SinkConfig {
    /// Rows per chunk. Absent means one row at a time.
    pub chunk_size: Option<usize>,
    pub parquet: ParquetConfig,
}

impl SinkConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SinkConfig = serde_yaml::from_str(yaml).context("parsing sink config")?;
        config.delivery()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config `{}`", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in `{}`", path.display()))
    }

    /// Apply `SAS7SINK_CHUNK_SIZE` if set.
    pub fn with_env_overrides(self) -> Result<Self> {
        match env::var(CHUNK_SIZE_ENV) {
            Ok(raw) => self.with_chunk_size_override(&raw),
            Err(_) => Ok(self),
        }
    }

    fn with_chunk_size_override(mut self, raw: &str) -> Result<Self> {
        let size: usize = raw
            .trim()
            .parse()
            .with_context(|| format!("{}=`{}` is not a row count", CHUNK_SIZE_ENV, raw))?;
        debug!(chunk_size = size, "chunk size overridden from environment");
        self.chunk_size = Some(size);
        self.delivery()?;
        Ok(self)
    }

    pub fn delivery(&self) -> Result<Delivery> {
        match self.chunk_size {
            None => Ok(Delivery::Rows),
            Some(size) => match NonZeroUsize::new(size) {
                Some(capacity) => Ok(Delivery::Chunks(capacity)),
                None => bail!("chunk_size must be at least 1"),
            },
        }
    }
}
