//! Stateless helper utilities used by the planner and writer.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::error::{Result, XlsxExportError};
use crate::spec::{EnumCellValue, EnumColumnKind, SpecCellRange, SpecXlsxValuePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecXlsxValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Normalize one cell for writing: missing and non-finite values become
/// blanks, or policy text when `if_keep_missing_values` is set.
pub fn convert_cell_value(
    value: &EnumCellValue,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::None => {
            if if_keep_missing_values {
                EnumCellValue::String(value_policy.missing_value_str.clone())
            } else {
                EnumCellValue::None
            }
        }
        EnumCellValue::Number(n) if !n.is_finite() => {
            if if_keep_missing_values {
                EnumCellValue::String(
                    convert_nan_inf_to_str(*n, value_policy)
                        .unwrap_or_else(|| value_policy.nan_str.clone()),
                )
            } else {
                EnumCellValue::None
            }
        }
        other => other.clone(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnKindInference

/// Classify a column from its first data-row sample only.
///
/// A column whose first value is blank, text or a non-finite float is
/// non-numeric even when every later row holds a number.
pub fn derive_column_kind(sample: Option<&EnumCellValue>) -> EnumColumnKind {
    match sample {
        Some(EnumCellValue::Number(x)) if !x.is_finite() => EnumColumnKind::NonNumeric,
        Some(value) if value.is_numeric() => EnumColumnKind::Numeric,
        _ => EnumColumnKind::NonNumeric,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(sheet_name: &str, columns: &[String]) -> Result<()> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(XlsxExportError::DuplicateColumnName {
        sheet: sheet_name.to_string(),
        detail: c_msg,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Reject names Excel would refuse; names are never rewritten.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let invalid = |reason: String| XlsxExportError::InvalidSheetName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty".to_string()));
    }
    let n_len = name.chars().count();
    if n_len > N_LEN_EXCEL_SHEET_NAME_MAX {
        return Err(invalid(format!(
            "{n_len} characters, limit is {N_LEN_EXCEL_SHEET_NAME_MAX}"
        )));
    }
    if let Some(chr) = name.chars().find(|chr| TUP_EXCEL_ILLEGAL.contains(chr)) {
        return Err(invalid(format!("contains illegal character {chr:?}")));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid(
            "must not start or end with an apostrophe".to_string(),
        ));
    }
    Ok(())
}

/// Reject repeated sheet names (Excel compares them case-insensitively).
pub fn validate_unique_sheet_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut set_names_seen = BTreeSet::new();
    for name in names {
        if !set_names_seen.insert(name.to_lowercase()) {
            return Err(XlsxExportError::DuplicateSheetName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Reject sheets that do not fit one worksheet (header row included).
pub fn validate_sheet_extent(sheet_name: &str, height_data: usize, width: usize) -> Result<()> {
    if height_data + 1 > N_NROWS_EXCEL_MAX || width > N_NCOLS_EXCEL_MAX {
        return Err(XlsxExportError::SheetTooLarge {
            sheet: sheet_name.to_string(),
            rows: height_data + 1,
            cols: width,
        });
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellReferences

/// Zero-based column index to Excel letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letter(n_idx_col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = n_idx_col + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_rem as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Zero-based `(row, col)` to an A1 reference.
pub fn derive_cell_ref(n_idx_row: usize, n_idx_col: usize) -> String {
    format!("{}{}", derive_column_letter(n_idx_col), n_idx_row + 1)
}

/// Range to `A1:B4` notation.
pub fn derive_range_ref(range: &SpecCellRange) -> String {
    format!(
        "{}:{}",
        derive_cell_ref(range.row_first, range.col_first),
        derive_cell_ref(range.row_last, range.col_last)
    )
}

pub fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| XlsxExportError::Config(format!("row index overflow: {value}")))
}

pub fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| XlsxExportError::Config(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Colors

/// Parse `#RRGGBB` or `RRGGBB` into a packed RGB integer.
pub fn parse_hex_color(value: &str) -> Result<u32> {
    let c_hex = value.trim().trim_start_matches('#');
    if c_hex.len() != 6 || !c_hex.chars().all(|chr| chr.is_ascii_hexdigit()) {
        return Err(XlsxExportError::InvalidColor {
            value: value.to_string(),
        });
    }
    u32::from_str_radix(c_hex, 16).map_err(|_| XlsxExportError::InvalidColor {
        value: value.to_string(),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
