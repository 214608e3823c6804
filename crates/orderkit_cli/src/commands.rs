//! CLI command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use orderkit_io_xlsx::{
    SpecColorScalePolicy, SpecSheetData, SpecSheetSummary, SpecXlsxExportOptions, XlsxExporter,
    read_sheet_from_path,
};
use tracing::info;

const C_RULE: &str = "------------------------------------------------------------";

pub struct ExportArgs {
    pub output: PathBuf,
    pub sheets: Vec<(String, PathBuf)>,
    pub min_color: String,
    pub mid_color: String,
    pub max_color: String,
    pub mid_percentile: u8,
    pub keep_missing: bool,
    pub dry_run: bool,
}

/// Split `NAME=FILE` at the first `=`.
pub fn parse_sheet_arg(value: &str) -> Result<(String, PathBuf), String> {
    let Some((name, path)) = value.split_once('=') else {
        return Err(format!("expected NAME=FILE, got {value:?}"));
    };
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=FILE, got {value:?}"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

pub fn export(args: ExportArgs) -> anyhow::Result<()> {
    if args.sheets.is_empty() {
        bail!("at least one --sheet NAME=FILE is required");
    }

    let options = SpecXlsxExportOptions {
        keep_missing_values: args.keep_missing,
        color_scale: SpecColorScalePolicy {
            color_min: args.min_color,
            color_mid: args.mid_color,
            color_max: args.max_color,
            percentile_mid: args.mid_percentile,
        },
        ..Default::default()
    };
    let exporter = XlsxExporter::new(options);

    let mut l_sheets: Vec<SpecSheetData> = Vec::with_capacity(args.sheets.len());
    for (sheet_name, path) in &args.sheets {
        let sheet = read_sheet_from_path(sheet_name, path)
            .with_context(|| format!("failed to load sheet {sheet_name:?} from {}", path.display()))?;
        info!(sheet = %sheet_name, rows = sheet.height(), "loaded sheet");
        l_sheets.push(sheet);
    }

    if args.dry_run {
        let plan = exporter.plan(&l_sheets).context("failed to plan workbook")?;
        for sheet_plan in &plan.sheets {
            print_sheet_report(&SpecSheetSummary {
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
        println!(
            "Dry run: {} not written, sheets: {}",
            args.output.display(),
            plan.sheets.len()
        );
        return Ok(());
    }

    if let Some(dir_parent) = args.output.parent()
        && !dir_parent.as_os_str().is_empty()
    {
        fs::create_dir_all(dir_parent)
            .with_context(|| format!("failed to create {}", dir_parent.display()))?;
    }

    let summary = exporter
        .export(&l_sheets, &args.output)
        .with_context(|| format!("failed to export {}", args.output.display()))?;

    for sheet_summary in &summary.sheets {
        print_sheet_report(sheet_summary);
    }
    println!(
        "Created file {}, sheets: {}, total data rows: {}",
        summary.file_out.display(),
        summary.n_sheets(),
        summary.n_rows_total()
    );
    Ok(())
}

fn print_sheet_report(summary: &SpecSheetSummary) {
    println!("{C_RULE}");
    println!("Sheet: {}", summary.sheet_name);
    println!("Rows returned: {}", summary.n_rows);
    if summary.cols_color_scaled.is_empty() {
        println!("Color scale: none");
    } else {
        println!("Color scale: {}", summary.cols_color_scaled.join(", "));
    }
    for c_msg in &summary.warnings {
        println!("Warning: {c_msg}");
    }
    println!("{C_RULE}");
}
