//! Shared XLSX specification models.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::conf::{
    derive_default_color_scale_policy, derive_default_date_formats, derive_default_header_format,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields leave the writer default in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Scalar cell value carried from source data to the written sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Boolean value.
    Bool(bool),
    /// Integer value. Written as an Excel number (f64), so magnitudes above
    /// 2^53 lose precision.
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// Text value.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    DateTime(NaiveDateTime),
}

impl EnumCellValue {
    /// `true` for integer and floating-point values only.
    pub fn is_numeric(&self) -> bool {
        matches!(self, EnumCellValue::Integer(_) | EnumCellValue::Number(_))
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        EnumCellValue::Integer(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        EnumCellValue::Number(value)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        EnumCellValue::Bool(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        EnumCellValue::String(value)
    }
}

impl From<NaiveDate> for EnumCellValue {
    fn from(value: NaiveDate) -> Self {
        EnumCellValue::Date(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        EnumCellValue::DateTime(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(EnumCellValue::None, Into::into)
    }
}

/// Column classification derived from the first data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// First sample is an integer or float.
    Numeric,
    /// First sample is missing, null or any other type.
    NonNumeric,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetData

/// One named tab of tabular data, row-major and aligned to `columns`.
///
/// Construct through [`SpecSheetData::new`], `from_records` or
/// `from_dataframe` so that every row matches the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetData {
    /// Tab name.
    pub sheet_name: String,
    /// Header row in output order.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecSheetData {
    /// Number of data rows, header excluded.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Replacement text for missing and non-finite values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value when keep-missing is enabled.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Three-stop heat map colors (`#RRGGBB`) and the mid percentile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColorScalePolicy {
    /// Color for the lowest value.
    pub color_min: String,
    /// Color for the mid percentile.
    pub color_mid: String,
    /// Color for the highest value.
    pub color_max: String,
    /// Percentile of the middle stop, `0..=100`.
    pub percentile_mid: u8,
}

impl Default for SpecColorScalePolicy {
    fn default() -> Self {
        derive_default_color_scale_policy()
    }
}

/// Export-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxExportOptions {
    /// Value conversion policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Write missing/NaN/Inf as policy text instead of blank.
    pub keep_missing_values: bool,
    /// Heat map applied to numeric columns.
    pub color_scale: SpecColorScalePolicy,
    /// Header row format.
    pub fmt_header: SpecCellFormat,
    /// Date cell format.
    pub fmt_date: SpecCellFormat,
    /// Datetime cell format.
    pub fmt_datetime: SpecCellFormat,
}

impl Default for SpecXlsxExportOptions {
    fn default() -> Self {
        let (fmt_date, fmt_datetime) = derive_default_date_formats();
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            keep_missing_values: false,
            color_scale: SpecColorScalePolicy::default(),
            fmt_header: derive_default_header_format(),
            fmt_date,
            fmt_datetime,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetPlanSpecification

/// Zero-based inclusive cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// First row (inclusive).
    pub row_first: usize,
    /// First column (inclusive).
    pub col_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

impl SpecCellRange {
    /// Number of cells covered.
    pub fn area(&self) -> usize {
        (self.row_last - self.row_first + 1) * (self.col_last - self.col_first + 1)
    }
}

/// Declarative min/percentile/max color scale over one column's data cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColorScaleRule {
    /// Header text of the column.
    pub column: String,
    /// Target cells (rows 2..=last of one column).
    pub range: SpecCellRange,
}

/// Immutable description of one tab, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetPlan {
    /// Tab name.
    pub sheet_name: String,
    /// Header row.
    pub columns: Vec<String>,
    /// Data rows after value-policy conversion.
    pub rows: Vec<Vec<EnumCellValue>>,
    /// Top-left cell of the scrolling pane as `(row, col)`.
    pub freeze_cell: (u32, u16),
    /// Autofilter extent; `None` when the sheet has no columns.
    pub autofilter: Option<SpecCellRange>,
    /// Color-scale rules, in column order.
    pub color_scales: Vec<SpecColorScaleRule>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

/// Immutable description of a whole workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbookPlan {
    /// Tabs in output order.
    pub sheets: Vec<SpecSheetPlan>,
    /// Options the plan was derived with.
    pub options: SpecXlsxExportOptions,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Tab name.
    pub sheet_name: String,
    /// Data rows written, header excluded.
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
    /// Columns that received a color scale.
    pub cols_color_scaled: Vec<String>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

/// Outcome of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxExportSummary {
    /// Written workbook path.
    pub file_out: PathBuf,
    /// Sheets in output order.
    pub sheets: Vec<SpecSheetSummary>,
}

impl SpecXlsxExportSummary {
    /// Number of sheets written.
    pub fn n_sheets(&self) -> usize {
        self.sheets.len()
    }

    /// Data rows across all sheets.
    pub fn n_rows_total(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.n_rows).sum()
    }

    /// All sheet warnings, prefixed with the sheet name.
    pub fn warnings(&self) -> Vec<String> {
        self.sheets
            .iter()
            .flat_map(|sheet| {
                sheet
                    .warnings
                    .iter()
                    .map(move |msg| format!("{}: {msg}", sheet.sheet_name))
            })
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
