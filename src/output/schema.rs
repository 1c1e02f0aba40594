//! Arrow schemas for resolved tables

use crate::delegation::{AggregateMethod, Aggregation};
use crate::error::{Error, Result};
use crate::metadata::{ColumnDescriptor, ColumnType, TableSchema};
use arrow::datatypes::{DataType, Field, Schema};
use std::collections::HashMap;

/// Field metadata key carrying the column's display name
pub const DISPLAY_NAME_KEY: &str = "display_name";

/// Arrow type used for a column
///
/// Temporal, identifier and binary values keep the backend's string form;
/// arrays and objects are carried as JSON text.
pub fn column_data_type(column_type: &ColumnType) -> DataType {
    match column_type {
        ColumnType::Integer => DataType::Int64,
        ColumnType::Number => DataType::Float64,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::String
        | ColumnType::DateTime
        | ColumnType::Date
        | ColumnType::Guid
        | ColumnType::Binary
        | ColumnType::Array
        | ColumnType::Object
        | ColumnType::Unknown(_) => DataType::Utf8,
    }
}

fn column_field(column: &ColumnDescriptor) -> Field {
    // Rows may omit any column, so every field is nullable
    Field::new(&column.logical_name, column_data_type(&column.column_type), true).with_metadata(
        HashMap::from([(DISPLAY_NAME_KEY.to_string(), column.display_name.clone())]),
    )
}

fn lookup<'a>(table: &'a TableSchema, name: &str) -> Result<&'a ColumnDescriptor> {
    table
        .column(name)
        .ok_or_else(|| Error::column_not_found(&table.name, name))
}

/// Arrow schema for a table, optionally restricted to `projection`
///
/// Projected fields follow the projection order. An empty projection means
/// every column.
pub fn arrow_schema(table: &TableSchema, projection: Option<&[String]>) -> Result<Schema> {
    let fields = match projection {
        Some(names) if !names.is_empty() => names
            .iter()
            .map(|name| lookup(table, name).map(column_field))
            .collect::<Result<Vec<_>>>()?,
        _ => table.columns.iter().map(column_field).collect(),
    };
    Ok(Schema::new(fields))
}

/// Arrow schema of an `$apply` result: group-by columns, then one field per
/// aggregate alias
pub fn aggregate_schema(
    table: &TableSchema,
    group_by: &[String],
    aggregations: &[Aggregation],
) -> Result<Schema> {
    let mut fields = group_by
        .iter()
        .map(|name| lookup(table, name).map(column_field))
        .collect::<Result<Vec<_>>>()?;

    for aggregation in aggregations {
        let data_type = match aggregation.method {
            AggregateMethod::Count | AggregateMethod::CountDistinct => DataType::Int64,
            AggregateMethod::Min | AggregateMethod::Max => {
                column_data_type(&lookup(table, &aggregation.column)?.column_type)
            }
            AggregateMethod::Sum | AggregateMethod::Average => DataType::Float64,
        };
        fields.push(Field::new(&aggregation.alias, data_type, true));
    }

    Ok(Schema::new(fields))
}
