//! Report container: header map, data, attributes and download metadata.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use log::{debug, warn};
use rust_xlsxwriter::{DocProperties, ExcelDateTime};
use serde_json::Value;

use crate::conf::{C_SHEET_NAME_DEFAULT, EnumStylePreset, derive_style_policy};
use crate::error::Result;
use crate::spec::{
    AttributeMap, DataSet, EnumCellValue, HeaderMap, SpecSheetReport, SpecStylePolicy,
};
use crate::util::derive_content_type;
use crate::writer::ReportWorkbook;

/// One downloadable Excel report.
///
/// Holds everything needed to render the workbook; [`Self::generate_report`]
/// builds a fresh workbook on every call, so a shared reference can be used
/// for concurrent read-only generation.
#[derive(Debug, Clone)]
pub struct ExcelReport {
    header_map: HeaderMap,
    data_set: DataSet,
    style_policy: SpecStylePolicy,
    attributes: AttributeMap,

    file_name: String,
    content_type: Option<String>,
    title: String,
    if_header_attachment: bool,
    sheet_name: String,

    created_at: NaiveDateTime,
}

impl ExcelReport {
    /// Report with the standard preset.
    pub fn new(header_map: HeaderMap) -> Self {
        Self::with_style(header_map, SpecStylePolicy::default())
    }

    pub fn with_preset(header_map: HeaderMap, preset: EnumStylePreset) -> Self {
        Self::with_style(header_map, derive_style_policy(preset))
    }

    pub fn with_style(header_map: HeaderMap, style_policy: SpecStylePolicy) -> Self {
        let now = Local::now().naive_local();
        Self {
            header_map,
            data_set: DataSet::new(),
            style_policy,
            attributes: AttributeMap::new(),
            file_name: String::new(),
            content_type: None,
            title: String::new(),
            if_header_attachment: true,
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            created_at: now.with_nanosecond(0).unwrap_or(now),
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Data

    pub fn header_map(&self) -> &HeaderMap {
        &self.header_map
    }

    pub fn set_header_map(&mut self, header_map: HeaderMap) {
        self.header_map = header_map;
    }

    pub fn data(&self) -> &DataSet {
        &self.data_set
    }

    pub fn set_data(&mut self, data_set: DataSet) {
        self.data_set = data_set;
    }

    /// Replace the data from loosely typed JSON.
    ///
    /// Anything other than an array of objects leaves the report with no rows.
    pub fn set_data_value(&mut self, value: &Value) {
        self.data_set = DataSet::from_json_value(value);
        if !value.is_array() {
            debug!("ignoring non-array report data: {value}");
        }
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Metadata

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Store the download file name and derive its content type.
    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
        self.content_type = derive_content_type(&self.file_name);
        if self.content_type.is_none() {
            warn!("no content type for report file name {:?}", self.file_name);
        }
    }

    /// Content type derived from the file name; `None` when unrecognized.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn max_rows_per_sheet(&self) -> usize {
        self.style_policy.max_rows_per_sheet()
    }

    /// See [`SpecStylePolicy::set_max_rows_per_sheet`].
    pub fn set_max_rows_per_sheet(&mut self, n_rows: i64) {
        self.style_policy.set_max_rows_per_sheet(n_rows);
    }

    /// Whether callers should deliver the report as a file attachment.
    pub fn if_header_attachment(&self) -> bool {
        self.if_header_attachment
    }

    pub fn set_header_attachment(&mut self, if_header_attachment: bool) {
        self.if_header_attachment = if_header_attachment;
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn set_sheet_name(&mut self, sheet_name: impl Into<String>) {
        self.sheet_name = sheet_name.into();
    }

    pub fn style_policy(&self) -> &SpecStylePolicy {
        &self.style_policy
    }

    pub fn style_policy_mut(&mut self) -> &mut SpecStylePolicy {
        &mut self.style_policy
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Attributes

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Replace all attributes; `None` clears them.
    pub fn set_attributes(&mut self, attributes: Option<AttributeMap>) {
        self.attributes = attributes.unwrap_or_default();
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<EnumCellValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Generation

    /// Empty workbook carrying this report's title and creation time.
    pub fn new_workbook(&self) -> Result<ReportWorkbook> {
        let created_at = ExcelDateTime::from_ymd(
            u16::try_from(self.created_at.year()).unwrap_or(1970),
            self.created_at.month() as u8,
            self.created_at.day() as u8,
        )?
        .and_hms(
            self.created_at.hour() as u16,
            self.created_at.minute() as u8,
            self.created_at.second(),
        )?;

        let mut properties = DocProperties::new().set_creation_datetime(&created_at);
        if !self.title.is_empty() {
            properties = properties.set_title(&self.title);
        }
        Ok(ReportWorkbook::with_properties(&properties))
    }

    /// Add sheets for `data_set` to `workbook` using this report's style.
    pub fn create_sheet(
        &self,
        workbook: &mut ReportWorkbook,
        sheet_name: &str,
        title: &str,
        header_map: &HeaderMap,
        data_set: &DataSet,
    ) -> Result<SpecSheetReport> {
        workbook.create_sheet(sheet_name, title, header_map, data_set, &self.style_policy)
    }

    /// Serialize `workbook`, or an empty default workbook when `None`.
    pub fn get_bytes(&self, workbook: Option<ReportWorkbook>) -> Result<Vec<u8>> {
        match workbook {
            Some(workbook) => workbook.save_to_buffer(),
            None => self.new_workbook()?.save_to_buffer(),
        }
    }

    /// Render the stored header map and data into xlsx bytes.
    ///
    /// Repeated calls on an unchanged report return identical bytes.
    pub fn generate_report(&self) -> Result<Vec<u8>> {
        let mut workbook = self.new_workbook()?;
        let report = self.create_sheet(
            &mut workbook,
            &self.sheet_name,
            &self.title,
            &self.header_map,
            &self.data_set,
        )?;
        debug!(
            "generated report {:?}: {} rows over {} sheets",
            self.file_name,
            self.data_set.len(),
            report.sheets.len()
        );
        self.get_bytes(Some(workbook))
    }

    // #endregion
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use serde_json::json;

    use super::*;
    use crate::conf::N_NROWS_PER_SHEET_MAX;
    use crate::spec::RowRecord;

    fn derive_header_map() -> HeaderMap {
        [("ID", "Identification"), ("NAME", "Name"), ("AGE", "Age")]
            .into_iter()
            .map(|(c_key, c_label)| (c_key.to_string(), c_label.to_string()))
            .collect()
    }

    fn derive_data_set(n_rows: usize) -> DataSet {
        (0..n_rows)
            .map(|n_idx| {
                RowRecord::from([
                    ("ID".to_string(), EnumCellValue::from((12_345 + n_idx).to_string())),
                    ("NAME".to_string(), EnumCellValue::from("James Camire")),
                    ("AGE".to_string(), EnumCellValue::from(56)),
                ])
            })
            .collect()
    }

    fn read_back(v_bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(v_bytes)).unwrap()
    }

    #[test]
    fn test_generate_report_single_sheet() {
        let mut report = ExcelReport::new(derive_header_map());
        report.set_data(derive_data_set(5));

        let mut reader = read_back(report.generate_report().unwrap());
        assert_eq!(reader.sheet_names(), vec!["Report".to_string()]);

        let range = reader.worksheet_range("Report").unwrap();
        assert_eq!(range.height(), 6);
        assert_eq!(range.width(), 3);
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(12_345.0)));
        assert_eq!(
            range.get_value((1, 1)),
            Some(&Data::String("James Camire".to_string()))
        );
    }

    #[test]
    fn test_generate_report_with_title_adds_one_row() {
        let mut report = ExcelReport::new(derive_header_map());
        report.set_title("Staff");
        report.set_data(derive_data_set(5));

        let mut reader = read_back(report.generate_report().unwrap());
        let range = reader.worksheet_range("Report").unwrap();
        assert_eq!(range.height(), 7);
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Staff".to_string())));
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("Identification".to_string()))
        );
    }

    #[test]
    fn test_generate_report_paginates() {
        let mut report = ExcelReport::with_preset(derive_header_map(), EnumStylePreset::Plain);
        report.set_max_rows_per_sheet(700);
        report.set_data(derive_data_set(800));

        let mut reader = read_back(report.generate_report().unwrap());
        assert_eq!(
            reader.sheet_names(),
            vec!["Report_1".to_string(), "Report_2".to_string()]
        );
        for (c_sheet, n_rows_data) in [("Report_1", 700), ("Report_2", 100)] {
            let range = reader.worksheet_range(c_sheet).unwrap();
            assert_eq!(range.height(), n_rows_data + 1);
            assert_eq!(range.get_value((0, 2)), Some(&Data::String("Age".to_string())));
        }
    }

    #[test]
    fn test_set_max_rows_per_sheet_clamps() {
        let mut report = ExcelReport::new(derive_header_map());
        assert_eq!(report.max_rows_per_sheet(), 10);

        report.set_max_rows_per_sheet(0);
        assert_eq!(report.max_rows_per_sheet(), 10);
        report.set_max_rows_per_sheet(100_000);
        assert_eq!(report.max_rows_per_sheet(), N_NROWS_PER_SHEET_MAX);
        report.set_max_rows_per_sheet(1_000);
        assert_eq!(report.max_rows_per_sheet(), 1_000);
    }

    #[test]
    fn test_set_file_name_derives_content_type() {
        let mut report = ExcelReport::new(derive_header_map());
        assert_eq!(report.content_type(), None);

        report.set_file_name("MyReport.xlsx");
        assert_eq!(report.file_name(), "MyReport.xlsx");
        assert_eq!(
            report.content_type(),
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        );

        report.set_file_name("AnotherReport.123");
        assert_eq!(report.content_type(), None);
    }

    #[test]
    fn test_attributes() {
        let mut report = ExcelReport::new(derive_header_map());
        assert!(report.attributes().is_empty());

        report.add_attribute("author", "James Camire");
        report.add_attribute("revision", 3);
        let attributes = report.attributes().clone();
        assert_eq!(attributes.len(), 2);

        report.set_attributes(None);
        assert!(report.attributes().is_empty());

        report.set_attributes(Some(attributes.clone()));
        assert_eq!(report.attributes(), &attributes);
        assert_eq!(report.attributes()["revision"], EnumCellValue::Integer(3));
    }

    #[test]
    fn test_set_data_value_accepts_non_array() {
        let mut report = ExcelReport::new(derive_header_map());
        report.set_data_value(&json!("Test"));
        assert!(report.data().is_empty());

        let mut reader = read_back(report.generate_report().unwrap());
        let range = reader.worksheet_range("Report").unwrap();
        assert_eq!(range.height(), 1);

        report.set_data_value(&json!([{"ID": "12345", "AGE": 56}]));
        assert_eq!(report.data().len(), 1);
    }

    #[test]
    fn test_generate_report_is_repeatable() {
        let mut report = ExcelReport::new(derive_header_map());
        report.set_title("Staff");
        report.set_data(derive_data_set(25));

        let v_first = report.generate_report().unwrap();
        let v_second = report.generate_report().unwrap();
        assert_eq!(v_first, v_second);
    }

    #[test]
    fn test_get_bytes_and_extra_sheets() {
        let report = ExcelReport::new(derive_header_map());
        assert!(!report.get_bytes(None).unwrap().is_empty());

        let mut workbook = report.new_workbook().unwrap();
        report
            .create_sheet(&mut workbook, "Extra", "", report.header_map(), &derive_data_set(2))
            .unwrap();
        report
            .create_sheet(&mut workbook, "Extra", "", report.header_map(), &derive_data_set(1))
            .unwrap();
        assert_eq!(
            workbook.sheet_names(),
            &["Extra".to_string(), "Extra__2".to_string()]
        );

        let mut reader = read_back(report.get_bytes(Some(workbook)).unwrap());
        assert_eq!(reader.worksheet_range("Extra__2").unwrap().height(), 2);
    }

    #[test]
    fn test_defaults() {
        let report = ExcelReport::new(derive_header_map());
        assert!(report.if_header_attachment());
        assert_eq!(report.sheet_name(), "Report");
        assert_eq!(report.title(), "");
        assert!(report.style_policy().formats().header.bg_color.is_some());
    }
}
