//! Shared export specification models and top-level error type.

use std::collections::BTreeMap;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Semantic column value kind; decides the data format merged into the
/// materialized workbook format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumValueKind {
    /// Plain text column.
    Text,
    /// Whole-number column.
    Integer,
    /// Fractional-number column.
    Decimal,
    /// Date column; cell values carry Excel serial numbers.
    Date,
    /// Anything else; rendered as text without a number format.
    Other,
}

/// Whether a cell belongs to the header row or a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumRenderLocation {
    /// Header row cell.
    Header,
    /// Data row cell.
    Body,
}

/// Origin of a render resource's header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumHeaderSource {
    /// Derived from a sheet-model schema.
    AnnotatedModel,
    /// Supplied by the caller as parallel header/field-key lists.
    DeclaredKeys,
}

/// Normalized runtime cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StyleSpecification

/// Border line styles for top/bottom/left/right, as xlsxwriter border codes
/// (`0` none, `1` thin, `2` medium, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellBorder {
    /// Top border style.
    pub top: i64,
    /// Bottom border style.
    pub bottom: i64,
    /// Left border style.
    pub left: i64,
    /// Right border style.
    pub right: i64,
}

impl SpecCellBorder {
    /// Same border style on all four sides.
    pub fn uniform(style: i64) -> Self {
        Self {
            top: style,
            bottom: style,
            left: style,
            right: style,
        }
    }
}

/// Cell style definition independent of any workbook: fill, borders and
/// alignment. The data format is not part of the definition; it is decided
/// by the column's [`EnumValueKind`] at materialization time.
///
/// `Default` is the engine fallback style: no fill, thin border, left
/// horizontal alignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellStyle {
    /// Background fill color as `RRGGBB` hex text.
    pub bg_color: Option<String>,
    /// Border styles per side.
    pub borders: SpecCellBorder,
    /// Horizontal alignment keyword (`left`, `center`, `right`, ...).
    pub align: Option<String>,
    /// Vertical alignment keyword (`top`, `vcenter`, `bottom`, ...).
    pub valign: Option<String>,
}

impl Default for SpecCellStyle {
    fn default() -> Self {
        Self {
            bg_color: None,
            borders: SpecCellBorder::uniform(1),
            align: Some("left".to_string()),
            valign: None,
        }
    }
}

/// Reference to a style definition, resolved during render-resource
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumStyleRef {
    /// Sentinel: fall through to the next precedence level.
    #[default]
    None,
    /// Exact-name lookup into the closed variant set
    /// ([`crate::conf::EnumNamedCellStyle`]).
    Named(String),
    /// Programmatic style-building unit, invoked fresh per resolution.
    Builder(fn() -> SpecCellStyle),
}

impl EnumStyleRef {
    /// Convenience constructor for a named-variant reference.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnAndResource

/// One exported column: field key, display header name, value kind and
/// optional per-location style overrides. Declaration order defines the
/// left-to-right column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnDescriptor {
    /// Field key; identity of the column within one render resource.
    pub field_key: String,
    /// Display name written into the header row.
    pub header_name: String,
    /// Semantic value kind of body cells.
    pub value_kind: EnumValueKind,
    /// Header style override; `EnumStyleRef::None` falls through.
    pub style_header: EnumStyleRef,
    /// Body style override; `EnumStyleRef::None` falls through.
    pub style_body: EnumStyleRef,
}

impl SpecColumnDescriptor {
    /// Column with both style references left at the fall-through sentinel.
    pub fn new(
        field_key: impl Into<String>,
        header_name: impl Into<String>,
        value_kind: EnumValueKind,
    ) -> Self {
        Self {
            field_key: field_key.into(),
            header_name: header_name.into(),
            value_kind,
            style_header: EnumStyleRef::None,
            style_body: EnumStyleRef::None,
        }
    }

    /// Replace the header style reference.
    pub fn with_header_style(mut self, style_ref: EnumStyleRef) -> Self {
        self.style_header = style_ref;
        self
    }

    /// Replace the body style reference.
    pub fn with_body_style(mut self, style_ref: EnumStyleRef) -> Self {
        self.style_body = style_ref;
        self
    }
}

/// Cache key for one materialized style slot: value kind, field key and
/// render location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecStyleCacheKey {
    /// Value kind driving the data format.
    pub value_kind: EnumValueKind,
    /// Column field key.
    pub field_key: String,
    /// Header or body.
    pub location: EnumRenderLocation,
}

impl SpecStyleCacheKey {
    /// Build a key from its parts.
    pub fn of(
        value_kind: EnumValueKind,
        field_key: impl Into<String>,
        location: EnumRenderLocation,
    ) -> Self {
        Self {
            value_kind,
            field_key: field_key.into(),
            location,
        }
    }
}

/// Immutable, fully resolved bundle consumed by one sheet render pass:
/// ordered columns, per-cell-location style slots and the header source tag.
///
/// Slot handles index into the workbook-scoped
/// [`crate::cache::StyleSlotCache`] and must not be reused against another
/// workbook.
#[derive(Debug, Clone)]
pub struct SpecRenderResource {
    /// Exported columns in render order.
    pub l_columns: Vec<SpecColumnDescriptor>,
    /// Header style slot per column, aligned with `l_columns`.
    pub l_slots_header: Vec<usize>,
    /// Body style slot per column, aligned with `l_columns`.
    pub l_slots_body: Vec<usize>,
    /// Style slot by (value kind, field key, location).
    pub dict_slot_by_key: BTreeMap<SpecStyleCacheKey, usize>,
    /// Whether headers came from a schema or a declared key list.
    pub header_source: EnumHeaderSource,
}

impl SpecRenderResource {
    /// Number of exported columns.
    pub fn n_columns(&self) -> usize {
        self.l_columns.len()
    }

    /// Field keys in render order.
    pub fn field_order(&self) -> Vec<&str> {
        self.l_columns
            .iter()
            .map(|col| col.field_key.as_str())
            .collect()
    }

    /// `(field_key, header_name)` pairs in render order.
    pub fn header_names(&self) -> Vec<(&str, &str)> {
        self.l_columns
            .iter()
            .map(|col| (col.field_key.as_str(), col.header_name.as_str()))
            .collect()
    }

    /// Style slot for one cache key, if the resource declares it.
    pub fn slot_of(
        &self,
        value_kind: EnumValueKind,
        field_key: &str,
        location: EnumRenderLocation,
    ) -> Option<usize> {
        self.dict_slot_by_key
            .get(&SpecStyleCacheKey::of(value_kind, field_key, location))
            .copied()
    }
}

/// Uniform column styles for declared-key mode: one header style and one
/// body style applied to every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDeclaredColumnStyles {
    /// Style applied to all header cells.
    pub style_header: EnumStyleRef,
    /// Style applied to all body cells.
    pub style_body: EnumStyleRef,
}

impl Default for SpecDeclaredColumnStyles {
    fn default() -> Self {
        Self {
            style_header: EnumStyleRef::named(crate::conf::STYLE_NAME_GREY_HEADER),
            style_body: EnumStyleRef::named(crate::conf::STYLE_NAME_BODY),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet render outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Final (sanitized, unique) sheet name in the workbook.
    pub sheet_name: String,
    /// Header rows written; always 1.
    pub n_rows_header: usize,
    /// Body rows written, including appended rows.
    pub n_rows_body: usize,
    /// Columns rendered.
    pub n_cols: usize,
    /// Header origin.
    pub header_source: EnumHeaderSource,
}

/// Per-workbook export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Rendered sheets in creation order.
    pub sheets: Vec<SpecSheetReport>,
    /// Distinct style slots materialized in the workbook.
    pub n_style_slots: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Export failure. Every configuration variant is raised during
/// render-resource construction, before the workbook is mutated.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Schema declares no exported columns; the header row would be empty.
    #[error("Sheet schema declares no exported columns.")]
    NoExportedColumns,

    /// Named style reference does not match any closed-set variant.
    #[error("Unknown named cell style variant: {name:?}.")]
    UnknownStyleVariant {
        /// The unresolvable variant name.
        name: String,
    },

    /// Declared-key mode lists differ in length.
    #[error("Header/field key count mismatch: {n_headers} header names vs {n_fields} field keys.")]
    HeaderFieldCountMismatch {
        /// Number of declared header names.
        n_headers: usize,
        /// Number of declared field keys.
        n_fields: usize,
    },

    /// The same field key appears more than once in one resource.
    #[error("Duplicate field key: {0:?}.")]
    DuplicateFieldKey(String),

    /// Rows were appended with no sheet rendered yet.
    #[error("No active sheet; render a sheet before appending rows.")]
    NoActiveSheet,

    /// A sheet write was attempted after the workbook was serialized.
    #[error("Workbook already closed; no further sheets can be written.")]
    WorkbookClosed,

    /// Row index does not fit the worksheet address space.
    #[error("Row index overflow: {0}.")]
    RowIndexOverflow(usize),

    /// Column index does not fit the worksheet address space.
    #[error("Column index overflow: {0}.")]
    ColumnIndexOverflow(usize),

    /// Underlying workbook error.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
