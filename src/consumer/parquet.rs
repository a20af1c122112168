// src/consumer/parquet.rs

use anyhow::{anyhow, Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{build_arrow_schema, Catalog};
use crate::config::ParquetConfig;
use crate::properties::Properties;
use crate::sink::{Chunk, ChunkConsumer};

/// Writes each chunk as its own row group.
///
/// Output goes to `<path>.tmp` and is renamed to `path` at end of data, so a
/// read that stops early never leaves a file at `path`.
pub struct ParquetWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    props: WriterProperties,
    writer: Option<ArrowWriter<BufWriter<File>>>,
    rows_written: usize,
}

impl ParquetWriter {
    pub fn new(path: impl Into<PathBuf>, config: &ParquetConfig) -> Result<Self> {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Ok(Self {
            path,
            tmp_path: PathBuf::from(tmp),
            props: config.writer_properties()?,
            writer: None,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

impl ChunkConsumer for ParquetWriter {
    fn accept_properties(&mut self, properties: &Properties) -> Result<()> {
        let catalog = Catalog::build(&properties.metadata.columns)?;
        let schema = build_arrow_schema(&catalog);

        let file = File::create(&self.tmp_path).with_context(|| {
            format!("could not create temporary file `{}`", self.tmp_path.display())
        })?;
        let writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(self.props.clone()))
            .context("creating ArrowWriter")?;
        debug!(
            dataset = %properties.header.dataset_name,
            tmp = %self.tmp_path.display(),
            "parquet writer opened"
        );
        self.writer = Some(writer);
        self.rows_written = 0;
        Ok(())
    }

    fn accept_chunk(&mut self, start_row: usize, end_row: usize, chunk: Chunk) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("chunk [{}, {}] before properties", start_row, end_row))?;
        let batch = chunk.to_record_batch()?;
        writer
            .write(&batch)
            .with_context(|| format!("writing rows {}..={} to parquet", start_row, end_row))?;
        writer.flush().context("closing row group")?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    fn end_of_data(&mut self) -> Result<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| anyhow!("end of data before properties"))?;
        writer.close().context("closing ArrowWriter")?;

        fs::rename(&self.tmp_path, &self.path).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                self.tmp_path.display(),
                self.path.display()
            )
        })?;
        info!(
            rows = self.rows_written,
            path = %self.path.display(),
            "parquet file written"
        );
        Ok(())
    }
}
