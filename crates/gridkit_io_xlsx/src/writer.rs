//! Stateful workbook exporter and sheet renderer.
//!
//! One exporter owns one workbook plus its style slot cache. Each sheet
//! render follows a fixed sequence: create sheet, write the header row,
//! stream body rows, done. Rendering a sheet with zero body rows is valid
//! and produces a header-only table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::debug;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::cache::StyleSlotCache;
use crate::conf::{N_COL_START_IDX, N_ROW_START_IDX, N_WIDTH_COLUMN_DEFAULT};
use crate::resource::{prepare_render_resource_from_keys, prepare_render_resource_from_schema};
use crate::schema::SheetRowModel;
use crate::spec::{
    EnumCellValue, ExportError, SpecDeclaredColumnStyles, SpecExportReport, SpecRenderResource,
    SpecSheetReport,
};
use crate::util::{
    cast_col_num, cast_row_num, convert_cell_value, derive_unique_sheet_name, sanitize_sheet_name,
};

/// Sheet currently accepting appended rows.
#[derive(Debug)]
struct SpecActiveSheet {
    n_idx_worksheet: usize,
    n_row_cursor: usize,
    resource: SpecRenderResource,
}

/// Workbook exporter for the two export modes.
///
/// The workbook is buffered in memory until [`Self::save_to_buffer`] or
/// [`Self::save_to_path`] is called; serialization of the container format
/// is delegated to `rust_xlsxwriter`. One exporter must not be shared
/// between concurrent exports; each export constructs its own.
pub struct XlsxExporter {
    workbook: Workbook,
    cache: StyleSlotCache,
    set_sheet_names_existing: BTreeSet<String>,
    l_sheet_reports: Vec<SpecSheetReport>,
    active: Option<SpecActiveSheet>,
    if_closed: bool,
}

impl XlsxExporter {
    /// Exporter with a fresh workbook and an empty style slot cache.
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            cache: StyleSlotCache::new(),
            set_sheet_names_existing: BTreeSet::new(),
            l_sheet_reports: Vec::new(),
            active: None,
            if_closed: false,
        }
    }

    /// Render one sheet from schema-driven row models.
    pub fn write_sheet_from_models<T: SheetRowModel>(
        &mut self,
        rows: &[T],
        sheet_name: &str,
    ) -> Result<(), ExportError> {
        self.validate_open()?;
        let resource = prepare_render_resource_from_schema(&T::schema(), &mut self.cache)?;
        self.render_sheet(rows, resource, sheet_name, &|row: &T, c_key| {
            row.value_of(c_key)
        })
    }

    /// Render one sheet from key/value records and declared parallel
    /// header/field-key lists. Missing keys render as blank body cells.
    pub fn write_sheet_from_keys(
        &mut self,
        rows: &[BTreeMap<String, EnumCellValue>],
        header_names: &[String],
        field_keys: &[String],
        styles: &SpecDeclaredColumnStyles,
        sheet_name: &str,
    ) -> Result<(), ExportError> {
        self.validate_open()?;
        let resource =
            prepare_render_resource_from_keys(header_names, field_keys, styles, &mut self.cache)?;
        self.render_sheet(rows, resource, sheet_name, &lookup_map_value)
    }

    /// Append body rows to the most recently rendered sheet, continuing
    /// its row cursor with the same render resource.
    pub fn append_rows_from_models<T: SheetRowModel>(
        &mut self,
        rows: &[T],
    ) -> Result<(), ExportError> {
        self.append_rows(rows, &|row: &T, c_key| row.value_of(c_key))
    }

    /// Append key/value records to the most recently rendered sheet.
    pub fn append_rows_from_keys(
        &mut self,
        rows: &[BTreeMap<String, EnumCellValue>],
    ) -> Result<(), ExportError> {
        self.append_rows(rows, &lookup_map_value)
    }

    /// Accumulated per-sheet reports plus the workbook slot count.
    pub fn report(&self) -> SpecExportReport {
        SpecExportReport {
            sheets: self.l_sheet_reports.clone(),
            n_style_slots: self.cache.slot_count(),
        }
    }

    /// Serialize the workbook to XLSX container bytes. Closes the exporter
    /// for further sheet writes.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, ExportError> {
        self.if_closed = true;
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Serialize the workbook to a file. Closes the exporter for further
    /// sheet writes.
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ExportError> {
        self.if_closed = true;
        self.workbook.save(path)?;
        Ok(())
    }

    fn validate_open(&self) -> Result<(), ExportError> {
        if self.if_closed {
            return Err(ExportError::WorkbookClosed);
        }
        Ok(())
    }

    fn render_sheet<R>(
        &mut self,
        rows: &[R],
        resource: SpecRenderResource,
        sheet_name: &str,
        value_of: &dyn Fn(&R, &str) -> EnumCellValue,
    ) -> Result<(), ExportError> {
        let sheet_name_unique = derive_unique_sheet_name(
            &mut self.set_sheet_names_existing,
            &sanitize_sheet_name(sheet_name, "_"),
        );

        // The worksheet joins the workbook only once fully rendered, so a
        // failed render leaves no orphan sheet and the report index stays
        // aligned with the workbook index.
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet_name_unique)?;
        for n_idx_col in 0..resource.n_columns() {
            worksheet.set_column_width(
                cast_col_num(N_COL_START_IDX + n_idx_col)?,
                N_WIDTH_COLUMN_DEFAULT,
            )?;
        }

        let mut n_row_cursor = N_ROW_START_IDX;
        write_header_row(&mut worksheet, &self.cache, &resource, n_row_cursor)?;
        n_row_cursor += 1;

        write_body_rows(
            &mut worksheet,
            &self.cache,
            &resource,
            rows,
            &mut n_row_cursor,
            value_of,
        )?;

        let n_idx_worksheet = self.l_sheet_reports.len();
        self.workbook.push_worksheet(worksheet);
        self.l_sheet_reports.push(SpecSheetReport {
            sheet_name: sheet_name_unique,
            n_rows_header: 1,
            n_rows_body: rows.len(),
            n_cols: resource.n_columns(),
            header_source: resource.header_source,
        });
        debug!(
            "Rendered sheet {:?}: {} columns, {} body rows.",
            self.l_sheet_reports[n_idx_worksheet].sheet_name,
            resource.n_columns(),
            rows.len()
        );
        self.active = Some(SpecActiveSheet {
            n_idx_worksheet,
            n_row_cursor,
            resource,
        });
        Ok(())
    }

    fn append_rows<R>(
        &mut self,
        rows: &[R],
        value_of: &dyn Fn(&R, &str) -> EnumCellValue,
    ) -> Result<(), ExportError> {
        self.validate_open()?;
        let Some(mut active) = self.active.take() else {
            return Err(ExportError::NoActiveSheet);
        };

        let worksheet = self.workbook.worksheet_from_index(active.n_idx_worksheet)?;
        write_body_rows(
            worksheet,
            &self.cache,
            &active.resource,
            rows,
            &mut active.n_row_cursor,
            value_of,
        )?;

        if let Some(report) = self.l_sheet_reports.get_mut(active.n_idx_worksheet) {
            report.n_rows_body += rows.len();
        }
        self.active = Some(active);
        Ok(())
    }
}

fn lookup_map_value(row: &BTreeMap<String, EnumCellValue>, field_key: &str) -> EnumCellValue {
    row.get(field_key).cloned().unwrap_or(EnumCellValue::None)
}

fn write_header_row(
    worksheet: &mut Worksheet,
    cache: &StyleSlotCache,
    resource: &SpecRenderResource,
    n_row: usize,
) -> Result<(), ExportError> {
    for (n_idx_col, col) in resource.l_columns.iter().enumerate() {
        worksheet.write_string_with_format(
            cast_row_num(n_row)?,
            cast_col_num(N_COL_START_IDX + n_idx_col)?,
            &col.header_name,
            cache.format_of(resource.l_slots_header[n_idx_col]),
        )?;
    }
    Ok(())
}

fn write_body_rows<R>(
    worksheet: &mut Worksheet,
    cache: &StyleSlotCache,
    resource: &SpecRenderResource,
    rows: &[R],
    n_row_cursor: &mut usize,
    value_of: &dyn Fn(&R, &str) -> EnumCellValue,
) -> Result<(), ExportError> {
    for row in rows {
        for (n_idx_col, col) in resource.l_columns.iter().enumerate() {
            let value_raw = value_of(row, &col.field_key);
            let value = convert_cell_value(&value_raw, col.value_kind);
            write_cell_with_format(
                worksheet,
                *n_row_cursor,
                N_COL_START_IDX + n_idx_col,
                &value,
                cache.format_of(resource.l_slots_body[n_idx_col]),
            )?;
        }
        *n_row_cursor += 1;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: usize,
    n_col: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ExportError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(cast_row_num(n_row)?, cast_col_num(n_col)?, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(
                cast_row_num(n_row)?,
                cast_col_num(n_col)?,
                val,
                format,
            )?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(
                cast_row_num(n_row)?,
                cast_col_num(n_col)?,
                *val,
                format,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schema::SpecSheetSchema;
    use crate::spec::{EnumHeaderSource, EnumStyleRef, EnumValueKind, SpecColumnDescriptor};

    struct UserRow {
        rank: i64,
        nickname: String,
    }

    impl SheetRowModel for UserRow {
        fn schema() -> SpecSheetSchema {
            SpecSheetSchema::builder()
                .style_header_default(EnumStyleRef::named("GREY_HEADER"))
                .style_body_default(EnumStyleRef::named("BODY"))
                .column(SpecColumnDescriptor::new(
                    "rank",
                    "Rank",
                    EnumValueKind::Integer,
                ))
                .column(SpecColumnDescriptor::new(
                    "nickname",
                    "Nickname",
                    EnumValueKind::Text,
                ))
                .build()
        }

        fn value_of(&self, field_key: &str) -> EnumCellValue {
            match field_key {
                "rank" => EnumCellValue::Number(self.rank as f64),
                "nickname" => EnumCellValue::String(self.nickname.clone()),
                _ => EnumCellValue::None,
            }
        }
    }

    fn user_rows() -> Vec<UserRow> {
        vec![
            UserRow {
                rank: 1,
                nickname: "a".to_string(),
            },
            UserRow {
                rank: 2,
                nickname: "b".to_string(),
            },
        ]
    }

    #[test]
    fn test_model_export_reports_rows_cols_and_slots() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models(&user_rows(), "users")
            .expect("write");

        let report = exporter.report();
        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].sheet_name, "users");
        assert_eq!(report.sheets[0].n_rows_header, 1);
        assert_eq!(report.sheets[0].n_rows_body, 2);
        assert_eq!(report.sheets[0].n_cols, 2);
        assert_eq!(report.sheets[0].header_source, EnumHeaderSource::AnnotatedModel);
        // Shared grey header slot + integer body slot + text body slot.
        assert_eq!(report.n_style_slots, 3);
    }

    #[test]
    fn test_empty_rows_render_header_only() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models::<UserRow>(&[], "empty")
            .expect("write");

        let report = exporter.report();
        assert_eq!(report.sheets[0].n_rows_header, 1);
        assert_eq!(report.sheets[0].n_rows_body, 0);
    }

    #[test]
    fn test_append_rows_extends_last_sheet() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models(&user_rows(), "users")
            .expect("write");
        exporter
            .append_rows_from_models(&[UserRow {
                rank: 3,
                nickname: "c".to_string(),
            }])
            .expect("append");

        assert_eq!(exporter.report().sheets[0].n_rows_body, 3);
    }

    #[test]
    fn test_append_without_sheet_fails() {
        let mut exporter = XlsxExporter::new();
        let result = exporter.append_rows_from_models(&user_rows());
        assert!(matches!(result, Err(ExportError::NoActiveSheet)));
    }

    #[test]
    fn test_multi_sheet_shares_slots_and_uniquifies_names() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models(&user_rows(), "users")
            .expect("first sheet");
        exporter
            .write_sheet_from_models(&user_rows(), "users")
            .expect("second sheet");

        let report = exporter.report();
        assert_eq!(report.sheets.len(), 2);
        assert_eq!(report.sheets[0].sheet_name, "users");
        assert_eq!(report.sheets[1].sheet_name, "users__2");
        // Identical resolved styles across sheets: still 3 slots.
        assert_eq!(report.n_style_slots, 3);
    }

    #[test]
    fn test_apostrophe_sheet_name_renders_and_appends_in_place() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models(&user_rows(), "'users'")
            .expect("write");
        exporter
            .append_rows_from_models(&[UserRow {
                rank: 3,
                nickname: "c".to_string(),
            }])
            .expect("append");

        let report = exporter.report();
        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].sheet_name, "users");
        assert_eq!(report.sheets[0].n_rows_body, 3);
    }

    #[test]
    fn test_long_duplicate_sheet_names_stay_distinct() {
        let mut exporter = XlsxExporter::new();
        let c_name = "y".repeat(31);
        for _ in 0..11 {
            exporter
                .write_sheet_from_models(&user_rows(), &c_name)
                .expect("sheet");
        }

        let report = exporter.report();
        assert_eq!(report.sheets.len(), 11);
        let set_names: BTreeSet<String> = report
            .sheets
            .iter()
            .map(|sheet| sheet.sheet_name.clone())
            .collect();
        assert_eq!(set_names.len(), 11);
    }

    #[test]
    fn test_key_mode_export_with_missing_keys() {
        let mut exporter = XlsxExporter::new();
        let l_headers: Vec<String> = ["Rank", "Nickname"].iter().map(ToString::to_string).collect();
        let l_keys: Vec<String> = ["rank", "nickname"].iter().map(ToString::to_string).collect();

        let mut row_full = BTreeMap::new();
        row_full.insert("rank".to_string(), EnumCellValue::Number(1.0));
        row_full.insert(
            "nickname".to_string(),
            EnumCellValue::String("a".to_string()),
        );
        let mut row_sparse = BTreeMap::new();
        row_sparse.insert("rank".to_string(), EnumCellValue::Number(2.0));

        exporter
            .write_sheet_from_keys(
                &[row_full, row_sparse],
                &l_headers,
                &l_keys,
                &SpecDeclaredColumnStyles::default(),
                "custom",
            )
            .expect("write");

        let report = exporter.report();
        assert_eq!(report.sheets[0].n_rows_body, 2);
        assert_eq!(report.sheets[0].header_source, EnumHeaderSource::DeclaredKeys);
        // Uniform header style + uniform body style.
        assert_eq!(report.n_style_slots, 2);
    }

    #[test]
    fn test_write_after_save_fails() {
        let mut exporter = XlsxExporter::new();
        exporter
            .write_sheet_from_models(&user_rows(), "users")
            .expect("write");
        exporter.save_to_buffer().expect("save");

        let result = exporter.write_sheet_from_models(&user_rows(), "more");
        assert!(matches!(result, Err(ExportError::WorkbookClosed)));
        let result = exporter.append_rows_from_models(&user_rows());
        assert!(matches!(result, Err(ExportError::WorkbookClosed)));
    }

    #[test]
    fn test_config_error_leaves_workbook_untouched() {
        let mut exporter = XlsxExporter::new();
        let l_headers: Vec<String> = ["A", "B"].iter().map(ToString::to_string).collect();
        let l_keys: Vec<String> = ["a"].iter().map(ToString::to_string).collect();

        let result = exporter.write_sheet_from_keys(
            &[],
            &l_headers,
            &l_keys,
            &SpecDeclaredColumnStyles::default(),
            "bad",
        );
        assert!(matches!(
            result,
            Err(ExportError::HeaderFieldCountMismatch { .. })
        ));
        assert_eq!(exporter.report().sheets.len(), 0);
        assert_eq!(exporter.report().n_style_slots, 0);
    }
}
