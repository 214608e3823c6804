//! Pure planning stage: sheet data in, immutable workbook plan out.
//!
//! Nothing here touches the filesystem or the xlsx writer, so every
//! presentation decision can be checked without reading a file back.

use tracing::{debug, warn};

use crate::conf::N_ROWS_FROZEN;
use crate::error::{Result, XlsxExportError};
use crate::spec::{
    EnumCellValue, EnumColumnKind, SpecCellRange, SpecColorScaleRule, SpecSheetData, SpecSheetPlan,
    SpecWorkbookPlan, SpecXlsxExportOptions,
};
use crate::util::{
    convert_cell_value, derive_column_kind, derive_column_letter, parse_hex_color,
    validate_sheet_extent, validate_sheet_name, validate_unique_sheet_names,
};

/// Plan every sheet in insertion order.
pub fn plan_workbook(
    sheets: &[SpecSheetData],
    options: &SpecXlsxExportOptions,
) -> Result<SpecWorkbookPlan> {
    validate_export_options(options)?;
    validate_unique_sheet_names(sheets.iter().map(|sheet| sheet.sheet_name.as_str()))?;

    let l_sheet_plans = sheets
        .iter()
        .map(|sheet| plan_sheet(sheet, options))
        .collect::<Result<Vec<_>>>()?;

    Ok(SpecWorkbookPlan {
        sheets: l_sheet_plans,
        options: options.clone(),
    })
}

/// Plan one sheet: frozen header, full-extent autofilter, and a color scale
/// for each column whose first data value is numeric.
pub fn plan_sheet(sheet: &SpecSheetData, options: &SpecXlsxExportOptions) -> Result<SpecSheetPlan> {
    validate_sheet_name(&sheet.sheet_name)?;
    validate_sheet_extent(&sheet.sheet_name, sheet.height(), sheet.width())?;

    let n_height = sheet.height();
    let n_width = sheet.width();

    let autofilter = if n_width == 0 {
        None
    } else {
        Some(SpecCellRange {
            row_first: 0,
            col_first: 0,
            row_last: n_height,
            col_last: n_width - 1,
        })
    };

    // Columns are judged on the cells as written, so NaN/Inf samples that
    // become blanks or policy text are not numeric.
    let l_rows: Vec<Vec<EnumCellValue>> = sheet
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| {
                    convert_cell_value(value, options.keep_missing_values, &options.value_policy)
                })
                .collect()
        })
        .collect();

    let mut l_color_scales = Vec::new();
    let mut l_warnings = Vec::new();
    for (n_idx_col, c_name) in sheet.columns.iter().enumerate() {
        match derive_column_kind(l_rows.first().and_then(|row| row.get(n_idx_col))) {
            EnumColumnKind::Numeric => l_color_scales.push(SpecColorScaleRule {
                column: c_name.clone(),
                range: SpecCellRange {
                    row_first: 1,
                    col_first: n_idx_col,
                    row_last: n_height,
                    col_last: n_idx_col,
                },
            }),
            EnumColumnKind::NonNumeric => {
                if let Some(n_idx_row) = find_numeric_row_after_first(&l_rows, n_idx_col) {
                    let c_msg = format!(
                        "column {c_name:?} ({}) not color-scaled: first value is not numeric, \
                         but row {} is",
                        derive_column_letter(n_idx_col),
                        n_idx_row + 2
                    );
                    warn!(sheet = %sheet.sheet_name, "{c_msg}");
                    l_warnings.push(c_msg);
                }
            }
        }
    }

    debug!(
        sheet = %sheet.sheet_name,
        rows = n_height,
        cols = n_width,
        color_scales = l_color_scales.len(),
        "planned sheet"
    );

    Ok(SpecSheetPlan {
        sheet_name: sheet.sheet_name.clone(),
        columns: sheet.columns.clone(),
        rows: l_rows,
        freeze_cell: (N_ROWS_FROZEN, 0),
        autofilter,
        color_scales: l_color_scales,
        warnings: l_warnings,
    })
}

fn find_numeric_row_after_first(rows: &[Vec<EnumCellValue>], n_idx_col: usize) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.get(n_idx_col).is_some_and(|value| value.is_numeric()))
        .map(|(n_idx_row, _)| n_idx_row)
}

fn validate_export_options(options: &SpecXlsxExportOptions) -> Result<()> {
    let policy = &options.color_scale;
    parse_hex_color(&policy.color_min)?;
    parse_hex_color(&policy.color_mid)?;
    parse_hex_color(&policy.color_max)?;
    if policy.percentile_mid > 100 {
        return Err(XlsxExportError::Config(format!(
            "color_scale.percentile_mid must be <= 100, got {}",
            policy.percentile_mid
        )));
    }
    Ok(())
}
