//! `gridkit_io_xlsx` v1:
//! Typed tabular-data XLSX export kernel.
//!
//! Renders row records into styled workbook sheets, resolving per-column
//! header/body styles from a layered configuration (field override >
//! schema default > engine default) and interning materialized format
//! slots workbook-wide so visually identical cells never allocate
//! duplicate slots.
//!
//! Module map:
//! - `conf`     : constants, named style variants, value-kind data formats
//! - `spec`     : shared models, report, error type
//! - `schema`   : declarative column tables and the row-model trait
//! - `style`    : style precedence resolution and format materialization
//! - `cache`    : workbook-scoped style slot cache
//! - `resource` : render-resource construction and validation
//! - `util`     : pure helper functions
//! - `writer`   : stateful exporter facade and sheet renderer
pub mod cache;
pub mod conf;
pub mod resource;
pub mod schema;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use cache::StyleSlotCache;
pub use conf::{
    EnumNamedCellStyle, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_WIDTH_COLUMN_DEFAULT, TUP_EXCEL_ILLEGAL, derive_value_kind_num_format,
};
pub use resource::{prepare_render_resource_from_keys, prepare_render_resource_from_schema};
pub use schema::{SheetRowModel, SheetSchemaBuilder, SpecSheetSchema};
pub use spec::{
    EnumCellValue, EnumHeaderSource, EnumRenderLocation, EnumStyleRef, EnumValueKind, ExportError,
    SpecCellBorder, SpecCellStyle, SpecColumnDescriptor, SpecDeclaredColumnStyles,
    SpecExportReport, SpecRenderResource, SpecSheetReport, SpecStyleCacheKey,
};
pub use style::{derive_style_from_ref, derive_workbook_format, resolve_cell_style};
pub use util::{convert_cell_value, sanitize_sheet_name};
pub use writer::XlsxExporter;
