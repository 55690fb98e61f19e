//! Row-to-Arrow bridge for engine handoff.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType as ArrowType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use floe_common::{DataType, Error, Result, Row, Value};

/// Days from the proleptic-Gregorian CE epoch to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn arrow_type(data_type: DataType) -> ArrowType {
    match data_type {
        DataType::Boolean => ArrowType::Boolean,
        DataType::Int64 => ArrowType::Int64,
        DataType::Float64 => ArrowType::Float64,
        DataType::Utf8 => ArrowType::Utf8,
        DataType::Date => ArrowType::Date32,
        DataType::Timestamp => ArrowType::Timestamp(TimeUnit::Microsecond, None),
    }
}

pub fn output_schema(fields: &[(String, DataType)]) -> Arc<Schema> {
    Arc::new(Schema::new(
        fields
            .iter()
            .map(|(name, dt)| Field::new(name, arrow_type(*dt), true))
            .collect::<Vec<_>>(),
    ))
}

/// Builds one `RecordBatch` from projected rows.
///
/// Every row must already have the declared width and types; a mismatch is a
/// projection error, not a silent coercion.
pub fn rows_to_batch(fields: &[(String, DataType)], rows: &[Row]) -> Result<RecordBatch> {
    let schema = output_schema(fields);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    for (i, (name, dt)) in fields.iter().enumerate() {
        columns.push(build_column(name, *dt, rows, i)?);
    }
    RecordBatch::try_new(schema, columns).map_err(|e| Error::projection(e.to_string()))
}

fn field_error(name: &str, index: usize, value: &Value) -> Error {
    Error::projection(format!(
        "column '{name}' (output position {index}) declared one type but row holds {value:?}"
    ))
}

fn field<'a>(row: &'a Row, name: &str, index: usize) -> Result<&'a Value> {
    row.get(index).ok_or_else(|| {
        Error::projection(format!(
            "row has {} fields, column '{name}' wants position {index}",
            row.len()
        ))
    })
}

fn build_column(name: &str, dt: DataType, rows: &[Row], index: usize) -> Result<ArrayRef> {
    match dt {
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(rows.len());
            for row in rows {
                match field(row, name, index)? {
                    Value::Boolean(v) => b.append_value(*v),
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(rows.len());
            for row in rows {
                match field(row, name, index)? {
                    Value::Int64(v) => b.append_value(*v),
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(rows.len());
            for row in rows {
                match field(row, name, index)? {
                    Value::Float64(v) => b.append_value(*v),
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Utf8 => {
            let mut b = StringBuilder::new();
            for row in rows {
                match field(row, name, index)? {
                    Value::Utf8(v) => b.append_value(v),
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Date => {
            let mut b = Date32Builder::with_capacity(rows.len());
            for row in rows {
                match field(row, name, index)? {
                    Value::Date(v) => {
                        b.append_value(v.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                    }
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        DataType::Timestamp => {
            let mut b = TimestampMicrosecondBuilder::with_capacity(rows.len());
            for row in rows {
                match field(row, name, index)? {
                    Value::Timestamp(v) => b.append_value(v.and_utc().timestamp_micros()),
                    Value::Null => b.append_null(),
                    other => return Err(field_error(name, index, other)),
                }
            }
            Ok(Arc::new(b.finish()))
        }
    }
}
