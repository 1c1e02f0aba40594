//! JSON rows to and from Arrow record batches

use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, NullArray, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::sync::Arc;

/// Convert JSON row objects into a batch with the given schema
///
/// Fields missing from a row become nulls; keys not in the schema are
/// ignored. Non-string values in a `Utf8` field keep their JSON text.
pub fn json_to_arrow(records: &[Value], schema: &Schema) -> Result<RecordBatch> {
    let schema = Arc::new(schema.clone());
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .as_object()
                .ok_or_else(|| Error::output(format!("row {index} is not a JSON object")))
        })
        .collect::<Result<Vec<_>>>()?;

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&Value>> = rows
                .iter()
                .map(|row| row.get(field.name()).filter(|v| !v.is_null()))
                .collect();
            build_array(&values, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(schema, columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        other => Err(Error::output(format!("unsupported column type {other:?}"))),
    }
}

/// Convert a batch back into JSON row objects
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let mut record = serde_json::Map::new();
        for (index, field) in schema.fields().iter().enumerate() {
            let value = cell_to_json(batch.column(index).as_ref(), row)?;
            record.insert(field.name().clone(), value);
        }
        records.push(Value::Object(record));
    }

    Ok(records)
}

fn downcast<'a, T: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::output(format!("Failed to downcast to {name}")))
}

fn cell_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),
        DataType::Boolean => Ok(Value::Bool(
            downcast::<BooleanArray>(array, "BooleanArray")?.value(row),
        )),
        DataType::Int64 => Ok(Value::Number(
            downcast::<Int64Array>(array, "Int64Array")?.value(row).into(),
        )),
        DataType::Float64 => {
            let value = downcast::<Float64Array>(array, "Float64Array")?.value(row);
            Ok(serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number))
        }
        DataType::Utf8 => Ok(Value::String(
            downcast::<StringArray>(array, "StringArray")?
                .value(row)
                .to_string(),
        )),
        other => Err(Error::output(format!("unsupported column type {other:?}"))),
    }
}
