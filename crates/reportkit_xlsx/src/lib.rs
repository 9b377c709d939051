//! `reportkit_xlsx`:
//! Paginated Excel report generation from in-memory row data.
//!
//! Modules:
//! - `conf`   : constants and style presets
//! - `spec`   : cell values, formats, style policy and data models
//! - `error`  : crate error type
//! - `date`   : date patterns and Excel serial conversion
//! - `util`   : pure helpers (coercion, pagination, sheet names, widths)
//! - `frame`  : polars DataFrame input adapter
//! - `writer` : sheet builder over `rust_xlsxwriter`
//! - `report` : report container
pub mod conf;
pub mod date;
pub mod error;
pub mod frame;
pub mod report;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    EnumStylePreset, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_NROWS_PER_SHEET_DEFAULT, N_NROWS_PER_SHEET_MAX, TUP_EXCEL_ILLEGAL,
    derive_default_report_formats, derive_style_policy,
};
pub use date::EnumDatePattern;
pub use error::{ReportError, Result};
pub use frame::{derive_data_set_from_dataframe, derive_data_set_from_ipc_bytes};
pub use report::ExcelReport;
pub use spec::{
    AttributeMap, DataSet, EnumBorderStyle, EnumCellKind, EnumCellValue, HeaderMap, RowRecord,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecReportFormats, SpecSheetReport, SpecSheetSlice,
    SpecStylePolicy,
};
pub use util::{
    clamp_rows_per_sheet, convert_cell_value, convert_nan_inf_to_str, derive_content_type,
    plan_sheet_slices, sanitize_sheet_name,
};
pub use writer::{ReportCellFormats, ReportWorkbook, derive_date_cell_format, set_cell_value};
