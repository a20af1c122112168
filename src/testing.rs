// src/testing.rs
//
// Record encoder and fixtures shared by the unit tests.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::catalog::{Catalog, Column, ColumnSpec};
use crate::extract::{TimeOfDay, Value};
use crate::properties::{Endianness, Properties};

fn sas_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1960, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Writes cells the way a SAS7BDAT row stores them.
pub(crate) struct RecordBuilder {
    bytes: Vec<u8>,
    endianness: Endianness,
}

impl RecordBuilder {
    pub(crate) fn new(row_length: usize, endianness: Endianness) -> Self {
        Self {
            bytes: vec![0; row_length],
            endianness,
        }
    }

    fn put(&mut self, col: &Column, data: &[u8]) {
        self.bytes[col.offset..col.offset + col.length].copy_from_slice(data);
    }

    pub(crate) fn string(mut self, col: &Column, s: &str) -> Self {
        let mut data = vec![b' '; col.length];
        data[..s.len()].copy_from_slice(s.as_bytes());
        self.put(col, &data);
        self
    }

    pub(crate) fn integer(mut self, col: &Column, v: i64) -> Self {
        let data = match self.endianness {
            Endianness::Little => v.to_le_bytes()[..col.length].to_vec(),
            Endianness::Big => v.to_be_bytes()[8 - col.length..].to_vec(),
        };
        self.put(col, &data);
        self
    }

    pub(crate) fn number(mut self, col: &Column, v: f64) -> Self {
        let data = match self.endianness {
            Endianness::Little => v.to_le_bytes()[8 - col.length..].to_vec(),
            Endianness::Big => v.to_be_bytes()[..col.length].to_vec(),
        };
        self.put(col, &data);
        self
    }

    pub(crate) fn missing(self, col: &Column) -> Self {
        self.number(col, f64::NAN)
    }

    pub(crate) fn datetime(self, col: &Column, dt: NaiveDateTime) -> Self {
        let micros = (dt - sas_epoch()).num_microseconds().unwrap();
        self.number(col, micros as f64 / 1e6)
    }

    pub(crate) fn date(self, col: &Column, d: NaiveDate) -> Self {
        let days = (d - sas_epoch().date()).num_days();
        self.number(col, days as f64)
    }

    pub(crate) fn time(self, col: &Column, secs: f64) -> Self {
        self.number(col, secs)
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn spec(name: &str, ty: &str, offset: usize, length: usize) -> ColumnSpec {
    ColumnSpec {
        name: name.to_string(),
        label: String::new(),
        format: String::new(),
        ty: ty.to_string(),
        offset,
        length,
    }
}

pub(crate) const SAMPLE_ROW_LENGTH: usize = 48;

/// Seven columns, declared deliberately out of canonical order.
pub(crate) fn sample_specs() -> Vec<ColumnSpec> {
    vec![
        spec("id", "integer", 0, 4),
        spec("name", "string", 4, 8),
        spec("score", "number", 12, 8),
        spec("created", "datetime", 20, 8),
        spec("born", "date", 28, 8),
        spec("alarm", "time", 36, 8),
        spec("weight", "number", 44, 4),
    ]
}

pub(crate) fn sample_properties(row_count: usize) -> Properties {
    let mut props = Properties::default();
    props.header.dataset_name = "SAMPLE".to_string();
    props.metadata.row_count = row_count;
    props.metadata.row_length = SAMPLE_ROW_LENGTH;
    props.metadata.column_count = 7;
    props.metadata.columns = sample_specs();
    props
}

fn base_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// The values row `i` of the sample dataset holds, in declaration order.
/// Every third score and every fifth birth date is missing.
pub(crate) fn sample_values(i: usize) -> Vec<Option<Value>> {
    let created = base_datetime() + TimeDelta::hours(i as i64);
    vec![
        Some(Value::Integer(i as i64)),
        Some(Value::String(format!("row{}", i))),
        (i % 3 != 2).then(|| Value::Number(i as f64 * 1.5)),
        Some(Value::DateTime(created)),
        (i % 5 != 4).then(|| Value::Date(created.date() + TimeDelta::days(i as i64))),
        Some(Value::Time(TimeOfDay::from_hms_micro(0, i as i64, 0, 0))),
        Some(Value::Number(100.0 - i as f64)),
    ]
}

pub(crate) fn sample_record(catalog: &Catalog, i: usize, endianness: Endianness) -> Vec<u8> {
    let mut b = RecordBuilder::new(SAMPLE_ROW_LENGTH, endianness);
    for (col, value) in catalog.iter().zip(sample_values(i)) {
        b = match value {
            Some(Value::Integer(v)) => b.integer(col, v),
            Some(Value::String(s)) => b.string(col, &s),
            Some(Value::Number(v)) => b.number(col, v),
            Some(Value::DateTime(dt)) => b.datetime(col, dt),
            Some(Value::Date(d)) => b.date(col, d),
            Some(Value::Time(t)) => b.time(col, t.as_micros() as f64 / 1e6),
            None => b.missing(col),
        };
    }
    b.build()
}

pub(crate) fn sample_records(count: usize, endianness: Endianness) -> Vec<Vec<u8>> {
    let catalog = Catalog::build(&sample_specs()).unwrap();
    (0..count)
        .map(|i| sample_record(&catalog, i, endianness))
        .collect()
}

pub(crate) fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sas7sink=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
