use entmap_data::{Row, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row as _, ValueRef};

/// Convert a driver row into an entmap [`Row`].
///
/// The `Any` driver erases column types, so each column is tried against the
/// value kinds it can carry, narrowest first.
pub fn convert(row: &AnyRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        out.push(column.name(), column_value(row, idx)?);
    }
    Ok(out)
}

fn column_value(row: &AnyRow, idx: usize) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }
    if let Ok(v) = row.try_get::<bool, _>(idx) {
        return Ok(Value::Bool(v));
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(Value::Int(v));
    }
    if let Ok(v) = row.try_get::<i32, _>(idx) {
        return Ok(Value::Int(v.into()));
    }
    if let Ok(v) = row.try_get::<i16, _>(idx) {
        return Ok(Value::Int(v.into()));
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(Value::Float(v));
    }
    if let Ok(v) = row.try_get::<f32, _>(idx) {
        return Ok(Value::Float(v.into()));
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Ok(Value::Text(v));
    }
    row.try_get::<Vec<u8>, _>(idx).map(Value::Bytes)
}
