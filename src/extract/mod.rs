// src/extract/mod.rs

pub mod temporal;
pub mod value;

pub use temporal::TimeOfDay;
pub use value::Value;

use chrono::{NaiveDate, NaiveDateTime};

use crate::catalog::{Column, ColumnType};
use crate::properties::Endianness;

/// The decoder's raw bytes for the current row.
///
/// Borrowed for the duration of one `push_row` call only.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuffer<'a> {
    bytes: &'a [u8],
    endianness: Endianness,
}

impl<'a> RecordBuffer<'a> {
    pub fn new(bytes: &'a [u8], endianness: Endianness) -> Self {
        Self { bytes, endianness }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Bytes of `column`'s cell, clipped to the record.
    pub fn cell(&self, column: &Column) -> &'a [u8] {
        let end = column
            .offset
            .saturating_add(column.length)
            .min(self.bytes.len());
        let start = column.offset.min(end);
        &self.bytes[start..end]
    }
}

/// Cell text with trailing blanks and NULs removed. Bytes pass through as-is,
/// invalid UTF-8 is replaced.
pub fn get_string(column: &Column, buf: &RecordBuffer<'_>) -> String {
    let cell = buf.cell(column);
    let end = cell
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&cell[..end]).into_owned()
}

pub fn get_integer(column: &Column, buf: &RecordBuffer<'_>) -> i64 {
    read_integer(buf.cell(column), buf.endianness())
}

/// `None` when the stored double is NaN (any SAS missing value).
pub fn get_number(column: &Column, buf: &RecordBuffer<'_>) -> Option<f64> {
    let x = read_number(buf.cell(column), buf.endianness());
    if x.is_nan() {
        None
    } else {
        Some(x)
    }
}

pub fn get_datetime(column: &Column, buf: &RecordBuffer<'_>) -> Option<NaiveDateTime> {
    temporal::datetime_from_sas_seconds(read_number(buf.cell(column), buf.endianness()))
}

pub fn get_date(column: &Column, buf: &RecordBuffer<'_>) -> Option<NaiveDate> {
    temporal::date_from_sas_days(read_number(buf.cell(column), buf.endianness()))
}

pub fn get_time(column: &Column, buf: &RecordBuffer<'_>) -> Option<TimeOfDay> {
    temporal::time_from_sas_seconds(read_number(buf.cell(column), buf.endianness()))
}

/// Decode one cell according to its column type. `None` is a missing value.
pub fn get_value(column: &Column, buf: &RecordBuffer<'_>) -> Option<Value> {
    match column.ty {
        ColumnType::String => Some(Value::String(get_string(column, buf))),
        ColumnType::Integer => Some(Value::Integer(get_integer(column, buf))),
        ColumnType::Number => get_number(column, buf).map(Value::Number),
        ColumnType::DateTime => get_datetime(column, buf).map(Value::DateTime),
        ColumnType::Date => get_date(column, buf).map(Value::Date),
        ColumnType::Time => get_time(column, buf).map(Value::Time),
    }
}

/// Signed integer of 1..=8 bytes, sign-extended. An empty cell reads as 0.
fn read_integer(cell: &[u8], endianness: Endianness) -> i64 {
    let width = cell.len().min(8);
    if width == 0 {
        return 0;
    }
    let mut raw = [0u8; 8];
    let v = match endianness {
        Endianness::Little => {
            raw[..width].copy_from_slice(&cell[..width]);
            i64::from_le_bytes(raw)
        }
        Endianness::Big => {
            raw[8 - width..].copy_from_slice(&cell[..width]);
            i64::from_be_bytes(raw)
        }
    };
    let shift = 64 - 8 * width as u32;
    (v << shift) >> shift
}

/// Truncated IEEE double: only the `width` most significant bytes are stored,
/// the rest are zero. An empty cell reads as missing.
fn read_number(cell: &[u8], endianness: Endianness) -> f64 {
    let width = cell.len().min(8);
    if width == 0 {
        return f64::NAN;
    }
    let mut raw = [0u8; 8];
    match endianness {
        Endianness::Little => {
            raw[8 - width..].copy_from_slice(&cell[..width]);
            f64::from_le_bytes(raw)
        }
        Endianness::Big => {
            raw[..width].copy_from_slice(&cell[..width]);
            f64::from_be_bytes(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::spec;
    use crate::testing::RecordBuilder;

    fn column(name: &str, ty: &str, offset: usize, length: usize) -> Column {
        Column::try_from(&spec(name, ty, offset, length)).unwrap()
    }

    #[test]
    fn test_string_trims_padding() {
        let col = column("s", "string", 2, 8);
        let bytes = b"xxhello \0  yy";
        let buf = RecordBuffer::new(bytes, Endianness::Little);
        assert_eq!(get_string(&col, &buf), "hello");

        let blank = b"xx        yy";
        let buf = RecordBuffer::new(blank, Endianness::Little);
        assert_eq!(get_string(&col, &buf), "");
    }

    #[test]
    fn test_string_passes_through_utf8() {
        let col = column("s", "string", 0, 6);
        let buf = RecordBuffer::new("héllo ".as_bytes(), Endianness::Little);
        assert_eq!(get_string(&col, &buf), "héllo");
    }

    #[test]
    fn test_integer_widths_and_sign() {
        let le = RecordBuffer::new(&[0xfe, 0xff, 0x10, 0x00, 0x00, 0x00], Endianness::Little);
        assert_eq!(get_integer(&column("a", "integer", 0, 2), &le), -2);
        assert_eq!(get_integer(&column("b", "integer", 2, 4), &le), 16);
        assert_eq!(get_integer(&column("c", "integer", 0, 1), &le), -2);

        let be = RecordBuffer::new(&[0xff, 0xfe, 0x00, 0x00, 0x01, 0x00], Endianness::Big);
        assert_eq!(get_integer(&column("a", "integer", 0, 2), &be), -2);
        assert_eq!(get_integer(&column("b", "integer", 2, 4), &be), 256);
    }

    #[test]
    fn test_truncated_numbers() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let full = column("full", "number", 0, 8);
            let short = column("short", "number", 8, 3);
            let bytes = RecordBuilder::new(11, endianness)
                .number(&full, 1234.5678)
                .number(&short, 2.0)
                .build();
            let buf = RecordBuffer::new(&bytes, endianness);
            assert_eq!(get_number(&full, &buf), Some(1234.5678));
            assert_eq!(get_number(&short, &buf), Some(2.0));
        }
    }

    #[test]
    fn test_nan_is_missing() {
        let col = column("n", "number", 0, 8);
        let bytes = RecordBuilder::new(8, Endianness::Little).missing(&col).build();
        let buf = RecordBuffer::new(&bytes, Endianness::Little);
        assert_eq!(get_number(&col, &buf), None);
        assert_eq!(get_value(&col, &buf), None);
    }

    #[test]
    fn test_temporal_values_and_sentinels() {
        let dt = column("dt", "datetime", 0, 8);
        let d = column("d", "date", 8, 8);
        let t = column("t", "time", 16, 8);
        let when = NaiveDate::from_ymd_opt(2001, 9, 9)
            .unwrap()
            .and_hms_micro_opt(1, 46, 40, 250_000)
            .unwrap();
        let bytes = RecordBuilder::new(24, Endianness::Big)
            .datetime(&dt, when)
            .date(&d, when.date())
            .time(&t, 3_600.5)
            .build();
        let buf = RecordBuffer::new(&bytes, Endianness::Big);
        assert_eq!(get_value(&dt, &buf), Some(Value::DateTime(when)));
        assert_eq!(get_value(&d, &buf), Some(Value::Date(when.date())));
        assert_eq!(
            get_value(&t, &buf).map(|v| v.to_string()).as_deref(),
            Some("01:00:00.500000")
        );

        let bytes = RecordBuilder::new(24, Endianness::Big)
            .missing(&dt)
            .missing(&d)
            .missing(&t)
            .build();
        let buf = RecordBuffer::new(&bytes, Endianness::Big);
        assert_eq!(get_value(&dt, &buf), None);
        assert_eq!(get_value(&d, &buf), None);
        assert_eq!(get_value(&t, &buf), None);
    }

    #[test]
    fn test_cell_outside_record_does_not_panic() {
        let col = column("late", "number", 6, 8);
        let buf = RecordBuffer::new(&[0u8; 4], Endianness::Little);
        assert!(buf.cell(&col).is_empty());
        assert_eq!(get_number(&col, &buf), None);
        assert_eq!(get_integer(&column("i", "integer", 3, 4), &buf), 0);
        assert_eq!(get_string(&column("s", "string", 2, 10), &buf), "");
    }
}
