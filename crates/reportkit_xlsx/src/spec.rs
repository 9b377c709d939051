//! Shared report specification models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::Value;

use crate::conf::{N_NROWS_PER_SHEET_DEFAULT, derive_default_report_formats};
use crate::util::clamp_rows_per_sheet;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Border line style applied to all four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumBorderStyle {
    /// No border.
    None,
    /// Thin solid line.
    #[default]
    Thin,
    /// Medium solid line.
    Medium,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
    /// Thick solid line.
    Thick,
    /// Double line.
    Double,
    /// Hairline.
    Hair,
}

/// Cell format specification, overlaid field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<EnumBorderStyle>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Formats used for the three row kinds of a report sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Merged title row.
    pub title: SpecCellFormat,
    /// Column label row.
    pub header: SpecCellFormat,
    /// Data rows.
    pub body: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Loosely typed input value of one row cell or report attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing value.
    None,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    DateTime(NaiveDateTime),
    /// Text value.
    String(String),
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Boolean(val) => write!(f, "{val}"),
            Self::Integer(val) => write!(f, "{val}"),
            Self::Float(val) => write!(f, "{val}"),
            Self::Date(val) => write!(f, "{val}"),
            Self::DateTime(val) => write!(f, "{val}"),
            Self::String(val) => f.write_str(val),
        }
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for EnumCellValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for EnumCellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl From<&Value> for EnumCellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(val) => Self::Boolean(*val),
            Value::Number(val) => match val.as_i64() {
                Some(n) => Self::Integer(n),
                None => val.as_f64().map_or_else(|| Self::String(val.to_string()), Self::Float),
            },
            Value::String(val) => Self::String(val.clone()),
            Value::Array(_) | Value::Object(_) => Self::String(value.to_string()),
        }
    }
}

/// Typed cell representation decided by the coercer.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellKind {
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Boolean(bool),
    /// Text cell; absent values become the empty string.
    String(String),
    /// Date cell (midnight for plain dates); the style policy decides
    /// whether it displays as a date or a timestamp.
    Date(NaiveDateTime),
    /// Formula cell (never produced from a plain value).
    Formula(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataModel

/// Ordered column key to header label mapping.
pub type HeaderMap = IndexMap<String, String>;
/// One data row keyed by column key.
pub type RowRecord = BTreeMap<String, EnumCellValue>;
/// Report-level metadata independent of row data.
pub type AttributeMap = BTreeMap<String, EnumCellValue>;

/// Ordered sequence of row records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    rows: Vec<RowRecord>,
}

impl DataSet {
    /// Empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row, keeping insertion order.
    pub fn push(&mut self, row: RowRecord) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when no rows are present.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Build from loosely typed JSON.
    ///
    /// Only an array is read; objects inside it become rows and other array
    /// items are skipped. Any other value yields an empty data set.
    pub fn from_json_value(value: &Value) -> Self {
        let Value::Array(l_items) = value else {
            return Self::new();
        };

        l_items
            .iter()
            .filter_map(|item| match item {
                Value::Object(dict_row) => Some(
                    dict_row
                        .iter()
                        .map(|(c_key, val)| (c_key.clone(), EnumCellValue::from(val)))
                        .collect::<RowRecord>(),
                ),
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<RowRecord>> for DataSet {
    fn from(rows: Vec<RowRecord>) -> Self {
        Self { rows }
    }
}

impl FromIterator<RowRecord> for DataSet {
    fn from_iter<I: IntoIterator<Item = RowRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StylePolicy

/// Autofit bounds applied when column expansion is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Rendering and pagination options for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStylePolicy {
    border: EnumBorderStyle,
    if_fill_header: bool,
    formats: SpecReportFormats,
    if_expand_columns: bool,
    if_display_date: bool,
    n_rows_per_sheet_max: usize,
    /// Column width bounds used by expansion.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecStylePolicy {
    fn default() -> Self {
        Self::new(EnumBorderStyle::Thin, true)
    }
}

impl SpecStylePolicy {
    /// Build a policy for `border`; `if_fill_header` shades the header row.
    pub fn new(border: EnumBorderStyle, if_fill_header: bool) -> Self {
        Self {
            border,
            if_fill_header,
            formats: derive_default_report_formats(border, if_fill_header),
            if_expand_columns: false,
            if_display_date: true,
            n_rows_per_sheet_max: N_NROWS_PER_SHEET_DEFAULT,
            policy_autofit: SpecAutofitCellsPolicy::default(),
        }
    }

    pub fn border_style(&self) -> EnumBorderStyle {
        self.border
    }

    /// Change the border style and re-derive the row formats.
    pub fn set_border_style(&mut self, border: EnumBorderStyle) {
        self.border = border;
        self.formats = derive_default_report_formats(border, self.if_fill_header);
    }

    pub fn formats(&self) -> &SpecReportFormats {
        &self.formats
    }

    /// Replace the derived formats wholesale.
    pub fn set_formats(&mut self, formats: SpecReportFormats) {
        self.formats = formats;
    }

    pub fn if_expand_columns(&self) -> bool {
        self.if_expand_columns
    }

    pub fn set_expand_columns(&mut self, if_expand_columns: bool) {
        self.if_expand_columns = if_expand_columns;
    }

    pub fn if_display_date(&self) -> bool {
        self.if_display_date
    }

    /// `true` renders date cells as calendar dates, `false` as timestamps.
    pub fn set_display_date(&mut self, if_display_date: bool) {
        self.if_display_date = if_display_date;
    }

    pub fn max_rows_per_sheet(&self) -> usize {
        self.n_rows_per_sheet_max
    }

    /// Set data rows per sheet; `<= 0` restores the default and values
    /// above the ceiling are clamped.
    pub fn set_max_rows_per_sheet(&mut self, n_rows: i64) {
        self.n_rows_per_sheet_max = clamp_rows_per_sheet(n_rows);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Concrete sheet emitted to the workbook after pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
}

impl SpecSheetSlice {
    /// Number of data rows in this slice.
    pub fn height(&self) -> usize {
        self.row_end_exclusive - self.row_start_inclusive
    }
}

/// Per `create_sheet` call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Sheet slices produced by the call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
