//! Build [`SpecSheetData`] from caller data: explicit rows, ordered records,
//! polars DataFrames, and files on disk.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use polars::prelude::{
    AnyValue, CsvReadOptions, DataFrame, IpcReader, SerReader, TimeUnit,
};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, XlsxExportError};
use crate::spec::{EnumCellValue, SpecSheetData};
use crate::util::validate_unique_columns;

/// One record: column name to value, in column order.
pub type SheetRecord = IndexMap<String, EnumCellValue>;

impl SpecSheetData {
    /// Build a sheet from a header and row-major values.
    ///
    /// Every row must have exactly one value per column.
    pub fn new(
        sheet_name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<EnumCellValue>>,
    ) -> Result<Self> {
        let sheet_name = sheet_name.into();
        validate_unique_columns(&sheet_name, &columns)?;
        for (n_idx_row, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(XlsxExportError::RaggedRow {
                    sheet: sheet_name,
                    row: n_idx_row,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            sheet_name,
            columns,
            rows,
        })
    }

    /// Build a sheet from ordered records.
    ///
    /// The header is the first record's key order. Later records may list the
    /// same keys in another order; a record with missing or extra keys is
    /// rejected. Zero records give an empty sheet with no columns.
    pub fn from_records(sheet_name: impl Into<String>, records: &[SheetRecord]) -> Result<Self> {
        let sheet_name = sheet_name.into();
        let Some(record_first) = records.first() else {
            return Ok(Self {
                sheet_name,
                columns: vec![],
                rows: vec![],
            });
        };
        let l_colnames: Vec<String> = record_first.keys().cloned().collect();

        let mut l_rows = Vec::with_capacity(records.len());
        for (n_idx_row, record) in records.iter().enumerate() {
            let l_missing: Vec<&str> = l_colnames
                .iter()
                .filter(|c_name| !record.contains_key(c_name.as_str()))
                .map(String::as_str)
                .collect();
            let l_extra: Vec<&str> = record
                .keys()
                .filter(|c_name| !record_first.contains_key(c_name.as_str()))
                .map(String::as_str)
                .collect();
            if !l_missing.is_empty() || !l_extra.is_empty() {
                return Err(XlsxExportError::RecordColumnMismatch {
                    sheet: sheet_name,
                    row: n_idx_row,
                    detail: format!("missing {l_missing:?}, unexpected {l_extra:?}"),
                });
            }

            l_rows.push(
                l_colnames
                    .iter()
                    .map(|c_name| record[c_name.as_str()].clone())
                    .collect(),
            );
        }

        Ok(Self {
            sheet_name,
            columns: l_colnames,
            rows: l_rows,
        })
    }

    /// Build a sheet from a polars DataFrame, keeping column and row order.
    pub fn from_dataframe(sheet_name: impl Into<String>, df: &DataFrame) -> Result<Self> {
        let sheet_name = sheet_name.into();
        let l_colnames: Vec<String> = df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        validate_unique_columns(&sheet_name, &l_colnames)?;

        let l_cols = df.get_columns();
        let mut l_rows = Vec::with_capacity(df.height());
        for n_idx_row in 0..df.height() {
            let mut row = Vec::with_capacity(l_cols.len());
            for col in l_cols {
                row.push(derive_cell_value_from_any_value(col.get(n_idx_row)?));
            }
            l_rows.push(row);
        }

        Ok(Self {
            sheet_name,
            columns: l_colnames,
            rows: l_rows,
        })
    }
}

/// Map one polars scalar onto a cell value.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::Boolean(val) => EnumCellValue::Bool(val),
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt16(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt32(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(n) => EnumCellValue::Integer(n),
            Err(_) => EnumCellValue::Number(val as f64),
        },
        AnyValue::Int8(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int16(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int32(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int64(val) => EnumCellValue::Integer(val),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        AnyValue::Date(n_days) => derive_date_from_epoch_days(n_days)
            .map_or(EnumCellValue::None, EnumCellValue::Date),
        AnyValue::Datetime(n_ts, time_unit, _) => derive_datetime_from_epoch(n_ts, time_unit)
            .map_or(EnumCellValue::None, EnumCellValue::DateTime),
        AnyValue::DatetimeOwned(n_ts, time_unit, _) => {
            derive_datetime_from_epoch(n_ts, time_unit)
                .map_or(EnumCellValue::None, EnumCellValue::DateTime)
        }
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn derive_date_from_epoch_days(n_days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(TimeDelta::days(n_days as i64))
}

fn derive_datetime_from_epoch(n_ts: i64, time_unit: TimeUnit) -> Option<NaiveDateTime> {
    let n_per_sec: i64 = match time_unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    };
    let n_secs = n_ts.div_euclid(n_per_sec);
    let n_nanos = (n_ts.rem_euclid(n_per_sec) * (1_000_000_000 / n_per_sec)) as u32;
    DateTime::from_timestamp(n_secs, n_nanos).map(|dt| dt.naive_utc())
}

/// Decode an Arrow IPC payload into a DataFrame.
pub fn read_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    Ok(IpcReader::new(Cursor::new(v_ipc_df)).finish()?)
}

/// Read a DataFrame from `.csv` or Arrow IPC (`.ipc`, `.arrow`, `.feather`).
pub fn read_dataframe_from_path(path: &Path) -> Result<DataFrame> {
    let c_ext = derive_lowercase_extension(path);
    debug!(path = %path.display(), ext = %c_ext, "reading dataframe");
    match c_ext.as_str() {
        "csv" => Ok(CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?),
        "ipc" | "arrow" | "feather" => Ok(IpcReader::new(File::open(path)?).finish()?),
        _ => Err(XlsxExportError::UnsupportedInput {
            path: path.to_path_buf(),
        }),
    }
}

/// Read a JSON array of objects, keeping each object's key order.
pub fn read_records_from_json_path(path: &Path) -> Result<Vec<SheetRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let l_objects: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(reader)?;
    Ok(l_objects
        .into_iter()
        .map(|obj| {
            obj.into_iter()
                .map(|(c_name, value)| (c_name, derive_cell_value_from_json(value)))
                .collect()
        })
        .collect())
}

/// Map one JSON scalar onto a cell value; nested values keep their JSON text.
pub fn derive_cell_value_from_json(value: Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(val) => EnumCellValue::Bool(val),
        Value::Number(val) => match val.as_i64() {
            Some(n) => EnumCellValue::Integer(n),
            None => val
                .as_f64()
                .map_or(EnumCellValue::None, EnumCellValue::Number),
        },
        Value::String(val) => EnumCellValue::String(val),
        other => EnumCellValue::String(other.to_string()),
    }
}

/// Load one sheet from a file, dispatching on extension.
pub fn read_sheet_from_path(sheet_name: &str, path: &Path) -> Result<SpecSheetData> {
    if derive_lowercase_extension(path) == "json" {
        let l_records = read_records_from_json_path(path)?;
        return SpecSheetData::from_records(sheet_name, &l_records);
    }
    let df = read_dataframe_from_path(path)?;
    SpecSheetData::from_dataframe(sheet_name, &df)
}

fn derive_lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
