//! Arrow schema inference and JSON to Arrow conversion
//!
//! Provides utilities for inferring Arrow schemas from ndjson records
//! and converting them to Arrow RecordBatches.

use crate::error::{Error, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, ListArray, NullArray,
    StringArray, StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields, Float64Type, Int64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Column types accumulated in first-seen order
#[derive(Debug, Default)]
struct FieldTypes {
    order: Vec<(String, DataType)>,
    index: HashMap<String, usize>,
}

impl FieldTypes {
    fn observe(&mut self, name: &str, data_type: DataType) {
        if let Some(&idx) = self.index.get(name) {
            let merged = merge_types(&self.order[idx].1, &data_type);
            self.order[idx].1 = merged;
        } else {
            self.index.insert(name.to_string(), self.order.len());
            self.order.push((name.to_string(), data_type));
        }
    }

    fn into_fields(self) -> Vec<Field> {
        self.order
            .into_iter()
            .map(|(name, dtype)| Field::new(name, dtype, true)) // All fields nullable
            .collect()
    }
}

/// Infer an Arrow schema from a set of JSON records
///
/// Columns appear in the order their keys are first seen. Conflicting
/// types are widened: Int64 with Float64 becomes Float64, anything else
/// falls back to Utf8.
pub fn infer_schema(records: &[Value]) -> Result<Schema> {
    let mut field_types = FieldTypes::default();

    for record in records {
        match record {
            Value::Object(obj) => {
                for (key, value) in obj {
                    field_types.observe(key, infer_type(value));
                }
            }
            other => {
                return Err(Error::output(format!(
                    "Expected JSON object records, found {}",
                    json_type_name(other)
                )))
            }
        }
    }

    Ok(Schema::new(field_types.into_fields()))
}

/// Convert JSON records to an Arrow RecordBatch with an inferred schema
pub fn json_to_arrow(records: &[Value]) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(records)?);

    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let values: Vec<Option<&Value>> = records
            .iter()
            .map(|record| record.as_object().and_then(|obj| present(obj, field.name())))
            .collect();

        columns.push(build_array(&values, field.data_type())?);
    }

    // Records without any keys still count as rows
    let options = RecordBatchOptions::new().with_row_count(Some(records.len()));
    RecordBatch::try_new_with_options(schema, columns, &options).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Look up a key, treating explicit JSON nulls as missing
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(_) => DataType::Utf8,
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .map(infer_type)
                .reduce(|acc, t| merge_types(&acc, &t))
                .unwrap_or(DataType::Null);
            list_of(element_type)
        }
        // Parquet cannot store a struct without children
        Value::Object(obj) if obj.is_empty() => DataType::Null,
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

fn list_of(element_type: DataType) -> DataType {
    DataType::List(Arc::new(Field::new("item", element_type, true)))
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        (DataType::List(a), DataType::List(b)) => list_of(merge_types(a.data_type(), b.data_type())),

        (DataType::Struct(a), DataType::Struct(b)) => {
            let mut field_types = FieldTypes::default();
            for field in a.iter().chain(b.iter()) {
                field_types.observe(field.name(), field.data_type().clone());
            }
            DataType::Struct(Fields::from(field_types.into_fields()))
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
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

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        other => Err(Error::output(format!(
            "Unsupported column type for JSON input: {other}"
        ))),
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];
    let mut validity: Vec<bool> = Vec::with_capacity(values.len());

    for value in values {
        if let Some(Value::Array(arr)) = value {
            all_items.extend(arr.iter().map(|item| Some(item).filter(|v| !v.is_null())));
            validity.push(true);
        } else {
            validity.push(false);
        }
        // Both array and non-array cases need an offset
        let offset = i32::try_from(all_items.len()).map_err(|_| Error::Output {
            message: "Array too large for i32 offset".to_string(),
        })?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());

    let list_array = ListArray::try_new(
        Arc::clone(field),
        offset_buffer,
        items_array,
        Some(NullBuffer::from(validity)),
    )?;
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for field in fields {
        let child_values: Vec<Option<&Value>> = values
            .iter()
            .map(|v| v.and_then(Value::as_object).and_then(|obj| present(obj, field.name())))
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let validity: Vec<bool> = values
        .iter()
        .map(|v| matches!(v, Some(Value::Object(_))))
        .collect();

    let struct_array =
        StructArray::try_new(fields.clone(), child_arrays, Some(NullBuffer::from(validity)))?;
    Ok(Arc::new(struct_array))
}

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns a vector of JSON objects, one per row in the batch.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row_idx in 0..batch.num_rows() {
        let mut record = Map::new();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let value = array_value_to_json(batch.column(col_idx).as_ref(), row_idx)?;
            record.insert(field.name().clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),

        DataType::Boolean => Ok(Value::Bool(array.as_boolean().value(row))),

        DataType::Int64 => Ok(Value::Number(
            array.as_primitive::<Int64Type>().value(row).into(),
        )),

        DataType::Float64 => {
            let val = array.as_primitive::<Float64Type>().value(row);
            Ok(serde_json::Number::from_f64(val).map_or(Value::Null, Value::Number))
        }

        DataType::Utf8 => Ok(Value::String(
            array.as_string::<i32>().value(row).to_string(),
        )),

        DataType::LargeUtf8 => Ok(Value::String(
            array.as_string::<i64>().value(row).to_string(),
        )),

        DataType::List(_) => {
            let values = array.as_list::<i32>().value(row);
            let mut items = Vec::with_capacity(values.len());
            for i in 0..values.len() {
                items.push(array_value_to_json(values.as_ref(), i)?);
            }
            Ok(Value::Array(items))
        }

        DataType::Struct(_) => {
            let arr = array.as_struct();
            let mut obj = Map::new();
            for (i, field) in arr.fields().iter().enumerate() {
                let val = array_value_to_json(arr.column(i).as_ref(), row)?;
                obj.insert(field.name().clone(), val);
            }
            Ok(Value::Object(obj))
        }

        other => Err(Error::output(format!(
            "Cannot render column type {other} as JSON"
        ))),
    }
}
