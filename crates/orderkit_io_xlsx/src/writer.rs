//! Serialization stage: writes a [`SpecWorkbookPlan`] as one `.xlsx` file.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{
    Color, ConditionalFormat3ColorScale, ConditionalFormatType, Format, FormatAlign,
    FormatBorder, Workbook, Worksheet,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::plan::plan_workbook;
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecColorScalePolicy, SpecSheetData, SpecSheetPlan,
    SpecSheetSummary, SpecWorkbookPlan, SpecXlsxExportOptions, SpecXlsxExportSummary,
};
use crate::util::{cast_col_num, cast_row_num, parse_hex_color};

/// Export entry point holding the options shared by every call.
#[derive(Debug, Clone, Default)]
pub struct XlsxExporter {
    options: SpecXlsxExportOptions,
}

impl XlsxExporter {
    pub fn new(options: SpecXlsxExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SpecXlsxExportOptions {
        &self.options
    }

    /// Plan without writing.
    pub fn plan(&self, sheets: &[SpecSheetData]) -> Result<SpecWorkbookPlan> {
        plan_workbook(sheets, &self.options)
    }

    /// Write `sheets` to `path_file_out`, creating or overwriting it.
    ///
    /// The parent directory must already exist.
    pub fn export(
        &self,
        sheets: &[SpecSheetData],
        path_file_out: impl AsRef<Path>,
    ) -> Result<SpecXlsxExportSummary> {
        let plan = self.plan(sheets)?;
        write_workbook_plan(&plan, path_file_out.as_ref())
    }
}

/// Plan and write in one call with explicit options.
pub fn export_workbook(
    sheets: &[SpecSheetData],
    path_file_out: impl AsRef<Path>,
    options: &SpecXlsxExportOptions,
) -> Result<SpecXlsxExportSummary> {
    let plan = plan_workbook(sheets, options)?;
    write_workbook_plan(&plan, path_file_out.as_ref())
}

/// Serialize a plan. The file is opened, written and closed inside `save`.
pub fn write_workbook_plan(
    plan: &SpecWorkbookPlan,
    path_file_out: &Path,
) -> Result<SpecXlsxExportSummary> {
    let mut workbook = Workbook::new();

    let fmt_header = derive_rust_xlsx_format(&plan.options.fmt_header);
    let fmt_date = derive_rust_xlsx_format(&plan.options.fmt_date);
    let fmt_datetime = derive_rust_xlsx_format(&plan.options.fmt_datetime);
    let color_scale = derive_color_scale(&plan.options.color_scale)?;

    let mut l_summaries = Vec::with_capacity(plan.sheets.len());
    for sheet_plan in &plan.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_plan.sheet_name)?;

        write_header(worksheet, &sheet_plan.columns, &fmt_header)?;
        write_rows(worksheet, &sheet_plan.rows, &fmt_date, &fmt_datetime)?;
        apply_sheet_rules(worksheet, sheet_plan, &color_scale)?;

        debug!(
            sheet = %sheet_plan.sheet_name,
            rows = sheet_plan.rows.len(),
            "wrote sheet"
        );
        l_summaries.push(SpecSheetSummary {
            sheet_name: sheet_plan.sheet_name.clone(),
            n_rows: sheet_plan.rows.len(),
            n_cols: sheet_plan.columns.len(),
            cols_color_scaled: sheet_plan
                .color_scales
                .iter()
                .map(|rule| rule.column.clone())
                .collect(),
            warnings: sheet_plan.warnings.clone(),
        });
    }

    workbook.save(path_file_out)?;

    let summary = SpecXlsxExportSummary {
        file_out: PathBuf::from(path_file_out),
        sheets: l_summaries,
    };
    info!(
        path = %path_file_out.display(),
        sheets = summary.n_sheets(),
        rows = summary.n_rows_total(),
        "workbook saved"
    );
    Ok(summary)
}

fn write_header(worksheet: &mut Worksheet, columns: &[String], fmt_header: &Format) -> Result<()> {
    for (n_idx_col, c_name) in columns.iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        if c_name.is_empty() {
            worksheet.write_blank(0, n_col, fmt_header)?;
        } else {
            worksheet.write_string_with_format(0, n_col, c_name, fmt_header)?;
        }
    }
    Ok(())
}

fn write_rows(
    worksheet: &mut Worksheet,
    rows: &[Vec<EnumCellValue>],
    fmt_date: &Format,
    fmt_datetime: &Format,
) -> Result<()> {
    for (n_idx_row, row) in rows.iter().enumerate() {
        let n_row = cast_row_num(n_idx_row + 1)?;
        for (n_idx_col, value) in row.iter().enumerate() {
            let n_col = cast_col_num(n_idx_col)?;
            match value {
                EnumCellValue::None => {}
                EnumCellValue::Bool(val) => {
                    worksheet.write_boolean(n_row, n_col, *val)?;
                }
                EnumCellValue::Integer(val) => {
                    worksheet.write_number(n_row, n_col, *val as f64)?;
                }
                EnumCellValue::Number(val) => {
                    worksheet.write_number(n_row, n_col, *val)?;
                }
                EnumCellValue::String(val) => {
                    worksheet.write_string(n_row, n_col, val)?;
                }
                EnumCellValue::Date(val) => {
                    worksheet.write_datetime_with_format(n_row, n_col, val, fmt_date)?;
                }
                EnumCellValue::DateTime(val) => {
                    worksheet.write_datetime_with_format(n_row, n_col, val, fmt_datetime)?;
                }
            }
        }
    }
    Ok(())
}

fn apply_sheet_rules(
    worksheet: &mut Worksheet,
    sheet_plan: &SpecSheetPlan,
    color_scale: &ConditionalFormat3ColorScale,
) -> Result<()> {
    let (n_row_freeze, n_col_freeze) = sheet_plan.freeze_cell;
    worksheet.set_freeze_panes(n_row_freeze, n_col_freeze)?;

    if let Some(range) = &sheet_plan.autofilter {
        worksheet.autofilter(
            cast_row_num(range.row_first)?,
            cast_col_num(range.col_first)?,
            cast_row_num(range.row_last)?,
            cast_col_num(range.col_last)?,
        )?;
    }

    for rule in &sheet_plan.color_scales {
        worksheet.add_conditional_format(
            cast_row_num(rule.range.row_first)?,
            cast_col_num(rule.range.col_first)?,
            cast_row_num(rule.range.row_last)?,
            cast_col_num(rule.range.col_last)?,
            color_scale,
        )?;
    }
    Ok(())
}

/// Lowest and highest stops are the defaults; only the midpoint is set.
fn derive_color_scale(policy: &SpecColorScalePolicy) -> Result<ConditionalFormat3ColorScale> {
    Ok(ConditionalFormat3ColorScale::new()
        .set_midpoint(
            ConditionalFormatType::Percentile,
            policy.percentile_mid as i32,
        )
        .set_minimum_color(Color::RGB(parse_hex_color(&policy.color_min)?))
        .set_midpoint_color(Color::RGB(parse_hex_color(&policy.color_mid)?))
        .set_maximum_color(Color::RGB(parse_hex_color(&policy.color_max)?)))
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
