// src/catalog/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, TimeUnit};
use std::collections::HashMap;
use std::sync::Arc;

use super::{Catalog, Column, ColumnType};

/// Map a column type into the Arrow DataType used for chunk exports.
///
/// - Number   → Float64
/// - Integer  → Int64
/// - DateTime → Timestamp(µs), no zone
/// - Date     → Date32
/// - Time     → Duration(µs), signed and unbounded like SAS times
/// - String   → Utf8
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Number => DataType::Float64,
        ColumnType::Integer => DataType::Int64,
        ColumnType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
        ColumnType::Date => DataType::Date32,
        ColumnType::Time => DataType::Duration(TimeUnit::Microsecond),
        ColumnType::String => DataType::Utf8,
    }
}

fn arrow_field(col: &Column) -> ArrowField {
    // only the missing-value encodings can produce nulls
    let nullable = !matches!(col.ty, ColumnType::Integer | ColumnType::String);
    let mut metadata = HashMap::new();
    if !col.label.is_empty() {
        metadata.insert("label".to_string(), col.label.clone());
    }
    if !col.format.is_empty() {
        metadata.insert("format".to_string(), col.format.clone());
    }
    ArrowField::new(&col.name, map_to_arrow_type(col.ty), nullable).with_metadata(metadata)
}

/// Build an ArrowSchema with the catalog's columns in canonical chunk order.
pub fn build_arrow_schema(catalog: &Catalog) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = catalog.canonical().map(arrow_field).collect();
    Arc::new(ArrowSchema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::spec;

    #[test]
    fn test_schema_follows_canonical_order() {
        let mut specs = vec![
            spec("name", "string", 0, 8),
            spec("born", "date", 8, 8),
            spec("height", "number", 16, 8),
        ];
        specs[2].format = "BEST12.".to_string();
        let catalog = Catalog::build(&specs).unwrap();
        let schema = build_arrow_schema(&catalog);

        let names: Vec<_> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["height", "born", "name"]);

        let height = schema.field(0);
        assert_eq!(height.data_type(), &DataType::Float64);
        assert!(height.is_nullable());
        assert_eq!(height.metadata().get("format").map(String::as_str), Some("BEST12."));
        assert_eq!(height.metadata().get("label").map(String::as_str), Some("height label"));

        assert_eq!(schema.field(1).data_type(), &DataType::Date32);
        assert_eq!(
            map_to_arrow_type(ColumnType::Time),
            DataType::Duration(TimeUnit::Microsecond)
        );
        assert!(!schema.field(2).is_nullable());
    }
}
