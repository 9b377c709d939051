//! Sheet builder that renders data sets into a `rust_xlsxwriter` workbook.

use std::collections::BTreeSet;

use log::{debug, warn};
use rust_xlsxwriter::{DocProperties, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::date::convert_date_time_to_excel_serial;
use crate::error::{ReportError, Result};
use crate::spec::{
    DataSet, EnumBorderStyle, EnumCellKind, EnumCellValue, HeaderMap, SpecCellFormat,
    SpecSheetReport, SpecSheetSlice, SpecStylePolicy,
};
use crate::util::{
    convert_cell_value, derive_column_width, derive_date_display_pattern,
    derive_unique_sheet_name, estimate_unicode_string_width, estimate_width_len,
    plan_sheet_slices, sanitize_sheet_name,
};

/// Resolved library formats for data cells.
#[derive(Debug, Clone)]
pub struct ReportCellFormats {
    /// Text, number and boolean cells.
    pub body: Format,
    /// Date cells (body format plus date number format).
    pub date: Format,
}

impl ReportCellFormats {
    /// Resolve data cell formats from a style policy.
    pub fn from_policy(style_policy: &SpecStylePolicy) -> Self {
        Self {
            body: derive_rust_xlsx_format(&style_policy.formats().body),
            date: derive_rust_xlsx_format(&derive_date_cell_format(style_policy)),
        }
    }
}

/// Body format plus the number format of the policy's date display pattern.
pub fn derive_date_cell_format(style_policy: &SpecStylePolicy) -> SpecCellFormat {
    style_policy.formats().body.with_(SpecCellFormat {
        num_format: Some(
            derive_date_display_pattern(style_policy.if_display_date())
                .excel_num_format()
                .to_string(),
        ),
        ..Default::default()
    })
}

/// Workbook under construction plus the sheet names it already holds.
///
/// The workbook is owned here and released when this value is dropped or
/// consumed by [`Self::save_to_buffer`].
pub struct ReportWorkbook {
    workbook: Workbook,
    set_sheet_names_existing: BTreeSet<String>,
    l_sheet_names: Vec<String>,
    l_reports: Vec<SpecSheetReport>,
}

impl Default for ReportWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWorkbook {
    /// Create an empty workbook with default document properties.
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            set_sheet_names_existing: BTreeSet::new(),
            l_sheet_names: Vec::new(),
            l_reports: Vec::new(),
        }
    }

    /// Create an empty workbook carrying `properties`.
    pub fn with_properties(properties: &DocProperties) -> Self {
        let mut workbook = Self::new();
        workbook.workbook.set_properties(properties);
        workbook
    }

    /// Sheet names in creation order.
    pub fn sheet_names(&self) -> &[String] {
        &self.l_sheet_names
    }

    /// Snapshot of per-call sheet reports.
    pub fn report(&self) -> Vec<SpecSheetReport> {
        self.l_reports.clone()
    }

    /// Render `data_set` into one or more sheets.
    ///
    /// Every sheet repeats the title (if non-empty) and the header row; data
    /// rows are split every `style_policy.max_rows_per_sheet()` rows.
    pub fn create_sheet(
        &mut self,
        sheet_name: &str,
        title: &str,
        header_map: &HeaderMap,
        data_set: &DataSet,
        style_policy: &SpecStylePolicy,
    ) -> Result<SpecSheetReport> {
        let mut report = SpecSheetReport::default();

        let l_sheet_parts = plan_sheet_slices(
            data_set.len(),
            style_policy.max_rows_per_sheet(),
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        );
        for c_warning in &report.warnings {
            warn!("{c_warning}");
        }

        let fmt_title = derive_rust_xlsx_format(&style_policy.formats().title);
        let fmt_header = derive_rust_xlsx_format(&style_policy.formats().header);
        let fmts_cell = ReportCellFormats::from_policy(style_policy);

        // Sheets are rendered detached and only pushed once all parts succeed.
        let mut l_sheets_written = Vec::with_capacity(l_sheet_parts.len());
        let mut l_worksheets = Vec::with_capacity(l_sheet_parts.len());
        for sheet_slice in l_sheet_parts {
            let sheet_name_unique = derive_unique_sheet_name(
                &sheet_slice.sheet_name,
                &mut self.set_sheet_names_existing,
            );
            let sheet_slice = SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..sheet_slice
            };
            l_sheets_written.push(sheet_slice.clone());

            let mut worksheet = Worksheet::new();
            let result_write = worksheet
                .set_name(&sheet_slice.sheet_name)
                .map_err(ReportError::from)
                .and_then(|worksheet| {
                    write_sheet_slice(
                        worksheet,
                        &sheet_slice,
                        title,
                        header_map,
                        data_set,
                        style_policy,
                        &fmt_title,
                        &fmt_header,
                        &fmts_cell,
                    )
                });
            if let Err(err) = result_write {
                for sheet_written in &l_sheets_written {
                    self.set_sheet_names_existing
                        .remove(&sheet_written.sheet_name.to_lowercase());
                }
                return Err(err);
            }

            debug!(
                "wrote sheet {:?}: rows {}..{} of {}",
                sheet_slice.sheet_name,
                sheet_slice.row_start_inclusive,
                sheet_slice.row_end_exclusive,
                data_set.len()
            );
            l_worksheets.push(worksheet);
        }

        for worksheet in l_worksheets {
            self.workbook.push_worksheet(worksheet);
        }
        self.l_sheet_names
            .extend(l_sheets_written.iter().map(|s| s.sheet_name.clone()));
        report.sheets = l_sheets_written;
        self.l_reports.push(report.clone());
        Ok(report)
    }

    /// Serialize the workbook into xlsx bytes, consuming it.
    pub fn save_to_buffer(mut self) -> Result<Vec<u8>> {
        let v_buffer = self.workbook.save_to_buffer()?;
        debug!(
            "serialized workbook: {} sheets, {} bytes",
            self.l_sheet_names.len(),
            v_buffer.len()
        );
        Ok(v_buffer)
    }
}

#[allow(clippy::too_many_arguments)]
fn write_sheet_slice(
    worksheet: &mut Worksheet,
    sheet_slice: &SpecSheetSlice,
    title: &str,
    header_map: &HeaderMap,
    data_set: &DataSet,
    style_policy: &SpecStylePolicy,
    fmt_title: &Format,
    fmt_header: &Format,
    fmts_cell: &ReportCellFormats,
) -> Result<()> {
    let n_width = header_map.len();
    let mut n_row_cursor = 0usize;

    if !title.is_empty() {
        write_title(worksheet, title, n_width, fmt_title)?;
        n_row_cursor += 1;
    }

    let n_row_header = n_row_cursor;
    write_header(worksheet, n_row_header, header_map, fmt_header)?;
    n_row_cursor += 1;

    worksheet.set_freeze_panes(cast_row_num(n_row_cursor)?, 0)?;

    let if_expand_columns = style_policy.if_expand_columns();
    let if_display_date = style_policy.if_display_date();
    let mut l_width_by_col: Vec<usize> = if if_expand_columns {
        header_map
            .values()
            .map(|c_label| estimate_unicode_string_width(c_label))
            .collect()
    } else {
        vec![]
    };

    let value_missing = EnumCellValue::None;
    let l_rows =
        &data_set.rows()[sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive];
    for (n_idx_row, row) in l_rows.iter().enumerate() {
        for (n_idx_col, c_key) in header_map.keys().enumerate() {
            let value = convert_cell_value(row.get(c_key).unwrap_or(&value_missing));
            if if_expand_columns {
                l_width_by_col[n_idx_col] = usize::max(
                    l_width_by_col[n_idx_col],
                    estimate_width_len(&value, if_display_date),
                );
            }
            write_cell_kind(
                worksheet,
                n_row_cursor + n_idx_row,
                n_idx_col,
                &value,
                fmts_cell,
            )?;
        }
    }

    for (n_idx_col, n_width_recorded) in l_width_by_col.into_iter().enumerate() {
        worksheet.set_column_width(
            cast_col_num(n_idx_col)?,
            derive_column_width(n_width_recorded, &style_policy.policy_autofit),
        )?;
    }

    Ok(())
}

fn write_title(
    worksheet: &mut Worksheet,
    title: &str,
    n_width: usize,
    fmt_title: &Format,
) -> Result<()> {
    // A single-cell merge range is rejected by the library.
    if n_width <= 1 {
        worksheet.write_string_with_format(0, 0, title, fmt_title)?;
        return Ok(());
    }
    worksheet.merge_range(0, 0, 0, cast_col_num(n_width - 1)?, title, fmt_title)?;
    Ok(())
}

fn write_header(
    worksheet: &mut Worksheet,
    row_idx: usize,
    header_map: &HeaderMap,
    fmt_header: &Format,
) -> Result<()> {
    for (col_idx, c_label) in header_map.values().enumerate() {
        worksheet.write_string_with_format(
            cast_row_num(row_idx)?,
            cast_col_num(col_idx)?,
            c_label,
            fmt_header,
        )?;
    }
    Ok(())
}

/// Coerce `value` and write it into the target cell.
///
/// Returns the typed representation that was written.
pub fn set_cell_value(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    formats: &ReportCellFormats,
) -> Result<EnumCellKind> {
    let kind = convert_cell_value(value);
    write_cell_kind(worksheet, row_idx, col_idx, &kind, formats)?;
    Ok(kind)
}

/// Write an already typed cell with the matching library setter.
pub fn write_cell_kind(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellKind,
    formats: &ReportCellFormats,
) -> Result<()> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;

    match value {
        EnumCellKind::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, &formats.body)?;
        }
        EnumCellKind::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, &formats.body)?;
        }
        EnumCellKind::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, &formats.body)?;
        }
        EnumCellKind::Date(value) => match convert_date_time_to_excel_serial(*value) {
            Some(n_serial) => {
                worksheet.write_number_with_format(n_row, n_col, n_serial, &formats.date)?;
            }
            None => {
                worksheet.write_string_with_format(
                    n_row,
                    n_col,
                    value.to_string(),
                    &formats.body,
                )?;
            }
        },
        EnumCellKind::Formula(val) => {
            worksheet.write_formula_with_format(n_row, n_col, val.as_str(), &formats.body)?;
        }
    }
    Ok(())
}

/// Translate a format specification into a library format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
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
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: EnumBorderStyle) -> FormatBorder {
    match border {
        EnumBorderStyle::None => FormatBorder::None,
        EnumBorderStyle::Thin => FormatBorder::Thin,
        EnumBorderStyle::Medium => FormatBorder::Medium,
        EnumBorderStyle::Dashed => FormatBorder::Dashed,
        EnumBorderStyle::Dotted => FormatBorder::Dotted,
        EnumBorderStyle::Thick => FormatBorder::Thick,
        EnumBorderStyle::Double => FormatBorder::Double,
        EnumBorderStyle::Hair => FormatBorder::Hair,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ReportError::RowIndexOverflow(value));
    }
    u32::try_from(value).map_err(|_| ReportError::RowIndexOverflow(value))
}

fn cast_col_num(value: usize) -> Result<u16> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ReportError::ColumnIndexOverflow(value));
    }
    u16::try_from(value).map_err(|_| ReportError::ColumnIndexOverflow(value))
}
