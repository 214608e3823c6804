//! End-to-end export tests: write a workbook, then read it back.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use orderkit_io_xlsx::{
    EnumCellValue, SheetRecord, SpecSheetData, SpecXlsxExportOptions, XlsxExportError,
    XlsxExporter, export_workbook,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn record(pairs: &[(&str, EnumCellValue)]) -> SheetRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn sheet_totals() -> SpecSheetData {
    SpecSheetData::from_records(
        "totals",
        &[
            record(&[("state", "SP".into()), ("revenue", 1000i64.into())]),
            record(&[("state", "RJ".into()), ("revenue", 500i64.into())]),
            record(&[("state", "MG".into()), ("revenue", 750i64.into())]),
        ],
    )
    .unwrap()
}

fn read_part_xml(path: &Path, c_part: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(c_part).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

fn read_sheet_xml(path: &Path, n_sheet: usize) -> String {
    read_part_xml(path, &format!("xl/worksheets/sheet{n_sheet}.xml"))
}

fn read_rows(path: &Path, sheet_name: &str) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet_name).unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

#[test]
fn test_export_end_to_end_totals() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("report.xlsx");

    let summary = XlsxExporter::default()
        .export(&[sheet_totals()], &path_out)
        .unwrap();

    assert_eq!(summary.n_sheets(), 1);
    assert_eq!(summary.n_rows_total(), 3);
    assert_eq!(summary.sheets[0].cols_color_scaled, vec!["revenue".to_string()]);
    assert_eq!(summary.file_out, path_out);

    let workbook: Xlsx<_> = open_workbook(&path_out).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["totals".to_string()]);

    let rows = read_rows(&path_out, "totals");
    assert_eq!(
        rows,
        vec![
            vec![Data::String("state".into()), Data::String("revenue".into())],
            vec![Data::String("SP".into()), Data::Float(1000.0)],
            vec![Data::String("RJ".into()), Data::Float(500.0)],
            vec![Data::String("MG".into()), Data::Float(750.0)],
        ]
    );

    let xml = read_sheet_xml(&path_out, 1);
    assert!(xml.contains(r#"ySplit="1""#), "{xml}");
    assert!(xml.contains(r#"state="frozen""#));
    assert!(!xml.contains("xSplit"));
    assert!(xml.contains(r#"<autoFilter ref="A1:B4""#));
    assert!(xml.contains(r#"<conditionalFormatting sqref="B2:B4">"#));
    assert!(!xml.contains(r#"sqref="A2:A4""#));
    assert!(xml.contains(r#"type="colorScale""#));
    assert!(xml.contains(r#"<cfvo type="min""#));
    assert!(xml.contains(r#"<cfvo type="percentile" val="50""#));
    assert!(xml.contains(r#"<cfvo type="max""#));
    assert!(xml.contains(r#"rgb="FFAA0000""#));
    assert!(xml.contains(r#"rgb="FFFFFF00""#));
    assert!(xml.contains(r#"rgb="FF00AA00""#));
}

#[test]
fn test_export_keeps_sheet_order_and_counts_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("multi.xlsx");

    let sheet_months = SpecSheetData::new(
        "monthly_revenue",
        vec!["month".to_string(), "revenue".to_string()],
        vec![
            vec!["2017-01".into(), 120.5f64.into()],
            vec!["2017-02".into(), 98.25f64.into()],
        ],
    )
    .unwrap();
    let sheet_sellers = SpecSheetData::new(
        "top_sellers",
        vec!["seller_city".to_string(), "revenue".to_string()],
        vec![vec!["sao paulo".into(), 5000i64.into()]],
    )
    .unwrap();

    let summary = export_workbook(
        &[sheet_months, sheet_totals(), sheet_sellers],
        &path_out,
        &SpecXlsxExportOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.n_sheets(), 3);
    assert_eq!(summary.n_rows_total(), 2 + 3 + 1);

    let workbook: Xlsx<_> = open_workbook(&path_out).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "monthly_revenue".to_string(),
            "totals".to_string(),
            "top_sellers".to_string()
        ]
    );

    let xml_sellers = read_sheet_xml(&path_out, 3);
    assert!(xml_sellers.contains(r#"<autoFilter ref="A1:B2""#));
    assert!(
        xml_sellers.contains(r#"<conditionalFormatting sqref="B2">"#)
            || xml_sellers.contains(r#"sqref="B2:B2""#)
    );
}

#[test]
fn test_export_text_column_gets_no_color_scale() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("text.xlsx");

    let sheet = SpecSheetData::new(
        "labels",
        vec!["code".to_string()],
        vec![vec!["abc".into()], vec![42i64.into()]],
    )
    .unwrap();
    let summary = XlsxExporter::default().export(&[sheet], &path_out).unwrap();

    assert!(summary.sheets[0].cols_color_scaled.is_empty());
    assert_eq!(summary.sheets[0].warnings.len(), 1);
    assert_eq!(summary.warnings().len(), 1);
    assert!(summary.warnings()[0].starts_with("labels: "));

    let xml = read_sheet_xml(&path_out, 1);
    assert!(!xml.contains("conditionalFormatting"));
    assert!(xml.contains(r#"<autoFilter ref="A1:A3""#));
}

#[test]
fn test_export_header_only_sheet() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("header_only.xlsx");

    let sheet = SpecSheetData::new(
        "no_rows",
        vec!["category".to_string(), "revenue".to_string()],
        vec![],
    )
    .unwrap();
    let summary = XlsxExporter::default().export(&[sheet], &path_out).unwrap();

    assert_eq!(summary.n_rows_total(), 0);
    assert_eq!(
        read_rows(&path_out, "no_rows"),
        vec![vec![
            Data::String("category".into()),
            Data::String("revenue".into())
        ]]
    );

    let xml = read_sheet_xml(&path_out, 1);
    assert!(xml.contains(r#"ySplit="1""#));
    assert!(xml.contains(r#"<autoFilter ref="A1:B1""#));
    assert!(!xml.contains("conditionalFormatting"));
}

#[test]
fn test_export_empty_sheet_and_empty_workbook() {
    let temp_dir = TempDir::new().unwrap();

    let path_empty_sheet = temp_dir.path().join("empty_sheet.xlsx");
    let sheet = SpecSheetData::from_records("top_categories", &[]).unwrap();
    let summary = XlsxExporter::default()
        .export(&[sheet], &path_empty_sheet)
        .unwrap();
    assert_eq!(summary.n_sheets(), 1);
    assert_eq!(summary.sheets[0].n_cols, 0);
    let xml = read_sheet_xml(&path_empty_sheet, 1);
    assert!(xml.contains(r#"ySplit="1""#));
    assert!(!xml.contains("autoFilter"));

    let path_no_sheets = temp_dir.path().join("no_sheets.xlsx");
    let summary = XlsxExporter::default().export(&[], &path_no_sheets).unwrap();
    assert_eq!(summary.n_sheets(), 0);
    assert_eq!(summary.n_rows_total(), 0);
    assert!(path_no_sheets.exists());
}

#[test]
fn test_export_writes_dates_bools_and_blanks() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("typed.xlsx");

    let d_first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    let sheet = SpecSheetData::new(
        "orders",
        vec![
            "purchased".to_string(),
            "delivered".to_string(),
            "freight".to_string(),
        ],
        vec![
            vec![d_first.into(), true.into(), f64::NAN.into()],
            vec![
                d_first.and_hms_opt(10, 30, 0).unwrap().into(),
                false.into(),
                EnumCellValue::None,
            ],
        ],
    )
    .unwrap();
    XlsxExporter::default().export(&[sheet], &path_out).unwrap();

    let rows = read_rows(&path_out, "orders");
    assert!(matches!(rows[1][0], Data::DateTime(_)));
    assert_eq!(rows[1][1], Data::Bool(true));
    assert_eq!(rows[1][2], Data::Empty);
    assert!(matches!(rows[2][0], Data::DateTime(_)));
    assert_eq!(rows[2][1], Data::Bool(false));
}

#[test]
fn test_export_keep_missing_values_writes_policy_text() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("missing.xlsx");

    let sheet = SpecSheetData::new(
        "scores",
        vec!["review_score".to_string(), "delivery_days".to_string()],
        vec![
            vec![5i64.into(), f64::INFINITY.into()],
            vec![EnumCellValue::None, 3.5f64.into()],
        ],
    )
    .unwrap();
    let options = SpecXlsxExportOptions {
        keep_missing_values: true,
        ..Default::default()
    };
    let summary = export_workbook(&[sheet], &path_out, &options).unwrap();

    let rows = read_rows(&path_out, "scores");
    assert_eq!(rows[1][1], Data::String("Inf".into()));
    assert_eq!(rows[2][0], Data::String("NA".into()));
    // Row 2 of delivery_days holds the text "Inf", so only review_score is scaled.
    assert_eq!(
        summary.sheets[0].cols_color_scaled,
        vec!["review_score".to_string()]
    );
    assert_eq!(summary.sheets[0].warnings.len(), 1);
    assert!(summary.sheets[0].warnings[0].contains("\"delivery_days\""));

    let xml = read_sheet_xml(&path_out, 1);
    assert!(xml.contains(r#"<conditionalFormatting sqref="A2:A3">"#));
    assert!(!xml.contains(r#"sqref="B2:B3""#));
}

#[test]
fn test_export_applies_header_and_date_formats() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("styles.xlsx");

    let sheet = SpecSheetData::new(
        "orders",
        vec!["purchased_on".to_string()],
        vec![vec![NaiveDate::from_ymd_opt(2018, 3, 1).unwrap().into()]],
    )
    .unwrap();
    export_workbook(&[sheet], &path_out, &SpecXlsxExportOptions::default()).unwrap();

    let xml = read_part_xml(&path_out, "xl/styles.xml");
    assert!(xml.contains("<b/>"));
    assert!(xml.contains(r#"style="thin""#));
    assert!(xml.contains(r#"horizontal="center""#));
    assert!(xml.contains(r#"vertical="top""#));
    assert!(xml.contains(r#"formatCode="yyyy-mm-dd""#));
}

#[test]
fn test_export_large_integers_are_written_as_f64() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("ids.xlsx");

    let sheet = SpecSheetData::new(
        "ids",
        vec!["order_id".to_string()],
        vec![vec![9_007_199_254_740_993i64.into()]],
    )
    .unwrap();
    export_workbook(&[sheet], &path_out, &SpecXlsxExportOptions::default()).unwrap();

    let rows = read_rows(&path_out, "ids");
    assert_eq!(rows[1][0], Data::Float(9_007_199_254_740_992.0));
}

#[test]
fn test_export_custom_colors() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("colors.xlsx");

    let mut options = SpecXlsxExportOptions::default();
    options.color_scale.color_min = "#F8696B".to_string();
    options.color_scale.color_mid = "FFEB84".to_string();
    options.color_scale.color_max = "#63BE7B".to_string();
    options.color_scale.percentile_mid = 40;
    XlsxExporter::new(options)
        .export(&[sheet_totals()], &path_out)
        .unwrap();

    let xml = read_sheet_xml(&path_out, 1);
    assert!(xml.contains(r#"<cfvo type="percentile" val="40""#));
    assert!(xml.contains(r#"rgb="FFF8696B""#));
    assert!(xml.contains(r#"rgb="FFFFEB84""#));
    assert!(xml.contains(r#"rgb="FF63BE7B""#));
}

#[test]
fn test_export_is_idempotent_for_sheet_content() {
    let temp_dir = TempDir::new().unwrap();
    let path_a = temp_dir.path().join("a.xlsx");
    let path_b = temp_dir.path().join("b.xlsx");

    let exporter = XlsxExporter::default();
    exporter.export(&[sheet_totals()], &path_a).unwrap();
    exporter.export(&[sheet_totals()], &path_b).unwrap();

    assert_eq!(read_sheet_xml(&path_a, 1), read_sheet_xml(&path_b, 1));

    exporter.export(&[sheet_totals()], &path_a).unwrap();
    assert_eq!(read_sheet_xml(&path_a, 1), read_sheet_xml(&path_b, 1));
}

#[test]
fn test_export_unwritable_destination_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("missing_dir").join("report.xlsx");

    let err = XlsxExporter::default()
        .export(&[sheet_totals()], &path_out)
        .unwrap_err();
    assert!(matches!(err, XlsxExportError::Io(_)), "{err}");
    assert!(!path_out.exists());
}

#[test]
fn test_export_rejects_invalid_sheet_name_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("bad.xlsx");

    let sheet = SpecSheetData::new("a:b", vec!["x".to_string()], vec![]).unwrap();
    let err = XlsxExporter::default()
        .export(&[sheet], &path_out)
        .unwrap_err();
    assert!(matches!(err, XlsxExportError::InvalidSheetName { .. }));
    assert!(!path_out.exists());
}

#[test]
fn test_export_from_dataframe() {
    let temp_dir = TempDir::new().unwrap();
    let path_out = temp_dir.path().join("frame.xlsx");

    let df = polars::df!(
        "customer_state" => ["SP", "RJ", "MG"],
        "avg_order_value" => [142.5f64, 160.0, 151.25],
    )
    .unwrap();
    let sheet = SpecSheetData::from_dataframe("avg_order_by_state", &df).unwrap();
    let summary = XlsxExporter::default().export(&[sheet], &path_out).unwrap();

    assert_eq!(summary.sheets[0].n_rows, 3);
    assert_eq!(
        summary.sheets[0].cols_color_scaled,
        vec!["avg_order_value".to_string()]
    );
    let rows = read_rows(&path_out, "avg_order_by_state");
    assert_eq!(rows[3][1], Data::Float(151.25));
}
