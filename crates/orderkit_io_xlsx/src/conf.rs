//! XLSX constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecColorScalePolicy};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Rows kept visible above the freeze boundary (the header row).
pub const N_ROWS_FROZEN: u32 = 1;

/// Color-scale stop for the column minimum.
pub const C_COLOR_SCALE_MIN: &str = "#AA0000";
/// Color-scale stop for the mid percentile.
pub const C_COLOR_SCALE_MID: &str = "#FFFF00";
/// Color-scale stop for the column maximum.
pub const C_COLOR_SCALE_MAX: &str = "#00AA00";
/// Percentile used for the middle stop.
pub const N_COLOR_SCALE_MID_PERCENTILE: u8 = 50;

/// Number format for date cells.
pub const C_NUM_FORMAT_DATE: &str = "yyyy-mm-dd";
/// Number format for datetime cells.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";

/// Header cell format: bold, thin border, centered.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        bold: Some(true),
        border: Some(1),
        align: Some("center".to_string()),
        valign: Some("top".to_string()),
        ..Default::default()
    }
}

/// Date and datetime cell formats, in that order.
pub fn derive_default_date_formats() -> (SpecCellFormat, SpecCellFormat) {
    (
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATE.to_string()),
            ..Default::default()
        },
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATETIME.to_string()),
            ..Default::default()
        },
    )
}

/// Red to yellow to green heat map.
pub fn derive_default_color_scale_policy() -> SpecColorScalePolicy {
    SpecColorScalePolicy {
        color_min: C_COLOR_SCALE_MIN.to_string(),
        color_mid: C_COLOR_SCALE_MID.to_string(),
        color_max: C_COLOR_SCALE_MAX.to_string(),
        percentile_mid: N_COLOR_SCALE_MID_PERCENTILE,
    }
}
