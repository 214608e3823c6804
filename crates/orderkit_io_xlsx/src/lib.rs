//! `orderkit_io_xlsx`:
//! Formatted XLSX export for order-report tables.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : sheet data, options, plans and summaries
//! - `error`  : error taxonomy
//! - `util`   : pure helper functions
//! - `source` : sheet construction from records, DataFrames and files
//! - `plan`   : pure planning stage (freeze, autofilter, color scales)
//! - `writer` : serialization stage and export entry points
pub mod conf;
pub mod error;
pub mod plan;
pub mod source;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use error::{Result, XlsxExportError};
pub use plan::{plan_sheet, plan_workbook};
pub use source::{
    SheetRecord, read_dataframe_from_ipc_bytes, read_dataframe_from_path,
    read_records_from_json_path, read_sheet_from_path,
};
pub use spec::{
    EnumCellValue, EnumColumnKind, SpecCellFormat, SpecCellRange, SpecColorScalePolicy,
    SpecColorScaleRule, SpecSheetData, SpecSheetPlan, SpecSheetSummary, SpecWorkbookPlan,
    SpecXlsxExportOptions, SpecXlsxExportSummary, SpecXlsxValuePolicy,
};
pub use util::{derive_column_kind, derive_range_ref};
pub use writer::{XlsxExporter, export_workbook, write_workbook_plan};
