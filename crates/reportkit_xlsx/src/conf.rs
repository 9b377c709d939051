//! Report constants and default preset factories.

use crate::spec::{EnumBorderStyle, SpecCellFormat, SpecReportFormats, SpecStylePolicy};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Data rows per sheet when unset or assigned a non-positive value.
pub const N_NROWS_PER_SHEET_DEFAULT: usize = 10;
/// Upper bound for data rows per sheet.
pub const N_NROWS_PER_SHEET_MAX: usize = 65_536;

/// Sheet name used by [`crate::report::ExcelReport`] unless overridden.
pub const C_SHEET_NAME_DEFAULT: &str = "Report";
/// Fallback when a sheet name sanitizes to nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";

/// Text written for NaN values.
pub const C_NAN_STR: &str = "NaN";
/// Text written for positive infinity.
pub const C_POSINF_STR: &str = "Inf";
/// Text written for negative infinity.
pub const C_NEGINF_STR: &str = "-Inf";

/// File extensions whose content type is derived for report downloads.
pub const TUP_REPORT_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "csv", "ods"];

/// Named style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStylePreset {
    /// Thin borders, filled bold header, bold title.
    #[default]
    Standard,
    /// Thin borders, bold header without fill.
    BordersOnly,
    /// No borders, bold header.
    Plain,
}

/// Build the title/header/body formats for one border style.
pub fn derive_default_report_formats(
    border: EnumBorderStyle,
    if_fill_header: bool,
) -> SpecReportFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        border: Some(border),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    SpecReportFormats {
        title: SpecCellFormat {
            font_name: cfg_base_fmt_spec.font_name.clone(),
            font_size: Some(14),
            bold: Some(true),
            align: Some("center".to_string()),
            valign: Some("vcenter".to_string()),
            ..Default::default()
        },
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            bg_color: if if_fill_header {
                Some("#D9D9D9".to_string())
            } else {
                None
            },
            ..Default::default()
        }),
        body: cfg_base_fmt_spec,
    }
}

/// Map a named preset onto a concrete style policy.
pub fn derive_style_policy(preset: EnumStylePreset) -> SpecStylePolicy {
    match preset {
        EnumStylePreset::Standard => SpecStylePolicy::new(EnumBorderStyle::Thin, true),
        EnumStylePreset::BordersOnly => SpecStylePolicy::new(EnumBorderStyle::Thin, false),
        EnumStylePreset::Plain => SpecStylePolicy::new(EnumBorderStyle::None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_in_borders_and_fill() {
        let policy_standard = derive_style_policy(EnumStylePreset::Standard);
        let policy_borders = derive_style_policy(EnumStylePreset::BordersOnly);
        let policy_plain = derive_style_policy(EnumStylePreset::Plain);

        assert_eq!(policy_standard.border_style(), EnumBorderStyle::Thin);
        assert_eq!(policy_borders.border_style(), EnumBorderStyle::Thin);
        assert_eq!(policy_plain.border_style(), EnumBorderStyle::None);

        assert!(policy_standard.formats().header.bg_color.is_some());
        assert!(policy_borders.formats().header.bg_color.is_none());
        assert_eq!(policy_plain.formats().body.border, Some(EnumBorderStyle::None));
        assert_eq!(policy_standard.max_rows_per_sheet(), N_NROWS_PER_SHEET_DEFAULT);
    }

    #[test]
    fn test_title_format_has_no_border() {
        let fmts = derive_default_report_formats(EnumBorderStyle::Thick, true);
        assert_eq!(fmts.title.border, None);
        assert_eq!(fmts.header.border, Some(EnumBorderStyle::Thick));
        assert_eq!(fmts.header.bold, Some(true));
    }
}
