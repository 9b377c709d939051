//! Conversion of polars DataFrames into report data sets.

use std::io::Cursor;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader, TimeUnit};

use crate::error::{ReportError, Result};
use crate::spec::{DataSet, EnumCellValue, HeaderMap, RowRecord};

/// Convert a DataFrame into a header map (column name as key and label) and
/// a data set with one record per row.
pub fn derive_data_set_from_dataframe(df: &DataFrame) -> Result<(HeaderMap, DataSet)> {
    let l_colnames: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let header_map: HeaderMap = l_colnames
        .iter()
        .map(|c_name| (c_name.clone(), c_name.clone()))
        .collect();

    let l_cols = df.get_columns();
    let mut data_set = DataSet::new();
    for n_idx_row in 0..df.height() {
        let mut row = RowRecord::new();
        for (c_name, col) in l_colnames.iter().zip(l_cols) {
            let value = col.get(n_idx_row).map_err(|err| {
                ReportError::DataFrame(format!("Failed to access cell value: {err}"))
            })?;
            row.insert(c_name.clone(), derive_cell_value_from_any_value(value));
        }
        data_set.push(row);
    }

    Ok((header_map, data_set))
}

/// Read IPC-serialized DataFrame bytes and convert them like
/// [`derive_data_set_from_dataframe`].
pub fn derive_data_set_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<(HeaderMap, DataSet)> {
    let df = IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| {
            ReportError::DataFrame(format!("Failed to read IPC DataFrame bytes: {err}"))
        })?;
    derive_data_set_from_dataframe(&df)
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(n) => EnumCellValue::Integer(n),
            Err(_) => EnumCellValue::Float(val as f64),
        },
        AnyValue::Int8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Integer(val),
        AnyValue::Float32(val) => EnumCellValue::Float(f64::from(val)),
        AnyValue::Float64(val) => EnumCellValue::Float(val),
        AnyValue::Date(n_days) => derive_date_from_epoch_days(n_days)
            .map_or_else(|| EnumCellValue::String(n_days.to_string()), EnumCellValue::Date),
        AnyValue::Datetime(n_ts, time_unit, _) => derive_date_time_from_timestamp(n_ts, time_unit)
            .map_or_else(|| EnumCellValue::String(n_ts.to_string()), EnumCellValue::DateTime),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn derive_date_from_epoch_days(n_days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(chrono::Duration::days(i64::from(n_days)))
}

fn derive_date_time_from_timestamp(n_ts: i64, time_unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match time_unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(n_ts)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(n_ts),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(n_ts),
    }?;
    Some(dt.naive_utc())
}
