//! Stateless helper utilities used by the report writer.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveTime;

use crate::conf::{
    C_NAN_STR, C_NEGINF_STR, C_POSINF_STR, C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NROWS_PER_SHEET_DEFAULT, N_NROWS_PER_SHEET_MAX, TUP_EXCEL_ILLEGAL, TUP_REPORT_EXTENSIONS,
};
use crate::date::{EnumDatePattern, convert_date_time_to_excel_serial, format_date_time};
use crate::spec::{
    EnumCellKind, EnumCellValue, SpecAutofitCellsPolicy, SpecSheetReport, SpecSheetSlice,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to display text; return error for finite values.
pub fn convert_nan_inf_to_str(x: f64) -> Result<String, String> {
    if x.is_nan() {
        return Ok(C_NAN_STR.to_string());
    }
    if x.is_infinite() {
        return Ok(if x.is_sign_positive() {
            C_POSINF_STR.to_string()
        } else {
            C_NEGINF_STR.to_string()
        });
    }
    Err("Input is neither NaN nor Inf.".to_string())
}

/// Decide the typed cell representation of a loosely typed value.
///
/// Precedence: boolean, date/timestamp, native number, integer text,
/// decimal text, then plain text. Absent values become empty text and
/// non-finite numbers stay text since cells cannot hold them.
pub fn convert_cell_value(value: &EnumCellValue) -> EnumCellKind {
    match value {
        EnumCellValue::Boolean(val) => EnumCellKind::Boolean(*val),
        EnumCellValue::Date(val) => convert_date_value(val.and_time(NaiveTime::MIN), value),
        EnumCellValue::DateTime(val) => convert_date_value(*val, value),
        EnumCellValue::Integer(val) => EnumCellKind::Number(*val as f64),
        EnumCellValue::Float(val) => {
            if val.is_finite() {
                EnumCellKind::Number(*val)
            } else {
                EnumCellKind::String(
                    convert_nan_inf_to_str(*val).unwrap_or_else(|_| C_NAN_STR.to_string()),
                )
            }
        }
        EnumCellValue::String(s) => {
            if let Ok(v) = s.parse::<i64>() {
                EnumCellKind::Number(v as f64)
            } else if let Ok(v) = s.parse::<f64>()
                && v.is_finite()
            {
                EnumCellKind::Number(v)
            } else {
                EnumCellKind::String(s.clone())
            }
        }
        EnumCellValue::None => EnumCellKind::String(String::new()),
    }
}

fn convert_date_value(value: chrono::NaiveDateTime, value_raw: &EnumCellValue) -> EnumCellKind {
    if convert_date_time_to_excel_serial(value).is_none() {
        return EnumCellKind::String(value_raw.to_string());
    }
    EnumCellKind::Date(value)
}

/// Date pattern used to render date cells under the display-date flag.
pub fn derive_date_display_pattern(if_display_date: bool) -> EnumDatePattern {
    if if_display_date {
        EnumDatePattern::DateDash
    } else {
        EnumDatePattern::DateTimeDash
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowPagination

/// Resolve a requested rows-per-sheet value into `[1, N_NROWS_PER_SHEET_MAX]`.
///
/// Non-positive requests fall back to the default.
pub fn clamp_rows_per_sheet(n_rows: i64) -> usize {
    if n_rows <= 0 {
        return N_NROWS_PER_SHEET_DEFAULT;
    }
    usize::try_from(n_rows).map_or(N_NROWS_PER_SHEET_MAX, |n_rows| {
        usize::min(n_rows, N_NROWS_PER_SHEET_MAX)
    })
}

/// Split `height_data` rows into sheet slices of at most `n_rows_per_sheet`.
///
/// An empty data set still yields one (empty) slice so the header is written.
pub fn plan_sheet_slices(
    height_data: usize,
    n_rows_per_sheet: usize,
    sheet_name: &str,
    report: &mut SpecSheetReport,
) -> Vec<SpecSheetSlice> {
    let n_rows_per_sheet = usize::max(1, n_rows_per_sheet);

    let mut l_row_slices = Vec::new();
    let mut n_row_start = 0;
    while n_row_start < height_data {
        let n_row_end = usize::min(height_data, n_row_start + n_rows_per_sheet);
        l_row_slices.push((n_row_start, n_row_end));
        n_row_start = n_row_end;
    }

    if l_row_slices.is_empty() {
        l_row_slices.push((0, 0));
    }

    let n_parts_total = l_row_slices.len();

    let l_sheet_parts: Vec<SpecSheetSlice> = l_row_slices
        .into_iter()
        .enumerate()
        .map(|(n_idx, (row_start, row_end))| SpecSheetSlice {
            sheet_name: if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx + 1)
            },
            row_start_inclusive: row_start,
            row_end_exclusive: row_end,
        })
        .collect();

    if n_parts_total > 1 {
        report.warn(format!(
            "Row limit overflow: {height_data} rows split into {n_parts_total} sheets \
             of at most {n_rows_per_sheet} rows."
        ));
    }

    l_sheet_parts
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }

    let c_name: String = trim_sheet_name_boundary(&c_name)
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();
    let c_name = trim_sheet_name_boundary(&c_name);

    if c_name.is_empty() {
        return C_SHEET_NAME_FALLBACK.to_string();
    }
    // Reserved by Excel.
    if c_name.eq_ignore_ascii_case("history") {
        return format!("{c_name}_");
    }
    c_name.to_string()
}

/// Strip whitespace and apostrophes from both ends until neither remains.
fn trim_sheet_name_boundary(name: &str) -> &str {
    let mut c_name = name;
    loop {
        let c_trimmed = c_name.trim().trim_matches('\'');
        if c_trimmed.len() == c_name.len() {
            return c_trimmed;
        }
        c_name = c_trimmed;
    }
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    derive_suffixed_sheet_name(base_name, &format!("_{part_idx_1based}"))
}

fn derive_suffixed_sheet_name(base_name: &str, suffix: &str) -> String {
    let n_len_base_name_max =
        N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(suffix.chars().count());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{suffix}")
}

/// Reserve a workbook-unique sheet name, suffixing `__2`, `__3`, ... on clash.
///
/// `set_names_lower` holds lowercased names since Excel compares sheet names
/// case-insensitively.
pub fn derive_unique_sheet_name(name: &str, set_names_lower: &mut BTreeSet<String>) -> String {
    if set_names_lower.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let mut n_idx = 2usize;
    loop {
        let candidate = derive_suffixed_sheet_name(name, &format!("__{n_idx}"));
        if set_names_lower.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Estimate displayed width units for one rendered cell.
pub fn estimate_width_len(value: &EnumCellKind, if_display_date: bool) -> usize {
    match value {
        EnumCellKind::String(s) => estimate_unicode_string_width(s),
        EnumCellKind::Formula(s) => estimate_unicode_string_width(s),
        EnumCellKind::Boolean(val) => {
            if *val {
                4
            } else {
                5
            }
        }
        EnumCellKind::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                (*n as i64).to_string().len()
            } else {
                n.to_string().len()
            }
        }
        EnumCellKind::Date(value) => {
            format_date_time(derive_date_display_pattern(if_display_date), *value).len()
        }
    }
}

pub(crate) fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Final column width for a recorded content width under `policy`.
pub fn derive_column_width(width_recorded: usize, policy: &SpecAutofitCellsPolicy) -> f64 {
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    usize::min(
        n_max,
        usize::max(n_min, width_recorded + policy.width_cell_padding),
    ) as f64
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ContentType

/// Derive a MIME type from the file extension of `file_name`.
///
/// Only report extensions are recognized; anything else yields `None`.
pub fn derive_content_type(file_name: &str) -> Option<String> {
    let c_ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    if !TUP_REPORT_EXTENSIONS.contains(&c_ext.as_str()) {
        return None;
    }
    mime_guess::from_ext(&c_ext)
        .first_raw()
        .map(ToString::to_string)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
