//! Export constants and the closed set of named cell-style variants.

use crate::spec::{EnumValueKind, SpecCellBorder, SpecCellStyle};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// First header row index of a rendered sheet.
pub const N_ROW_START_IDX: usize = 0;
/// First column index of a rendered sheet.
pub const N_COL_START_IDX: usize = 0;
/// Uniform column width applied at sheet creation.
pub const N_WIDTH_COLUMN_DEFAULT: f64 = 25.0;

/// Variant name of [`EnumNamedCellStyle::GreyHeader`].
pub const STYLE_NAME_GREY_HEADER: &str = "GREY_HEADER";
/// Variant name of [`EnumNamedCellStyle::BlueHeader`].
pub const STYLE_NAME_BLUE_HEADER: &str = "BLUE_HEADER";
/// Variant name of [`EnumNamedCellStyle::BlackHeader`].
pub const STYLE_NAME_BLACK_HEADER: &str = "BLACK_HEADER";
/// Variant name of [`EnumNamedCellStyle::Body`].
pub const STYLE_NAME_BODY: &str = "BODY";

/// Closed set of predefined cell-style variants, resolved by exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumNamedCellStyle {
    /// Grey header fill, thin borders, centered.
    GreyHeader,
    /// Light blue header fill, thin borders, centered.
    BlueHeader,
    /// Black header fill, thin borders, centered.
    BlackHeader,
    /// White body fill, thin borders, right-aligned.
    Body,
}

impl EnumNamedCellStyle {
    /// Resolve a variant by exact name; `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            STYLE_NAME_GREY_HEADER => Some(Self::GreyHeader),
            STYLE_NAME_BLUE_HEADER => Some(Self::BlueHeader),
            STYLE_NAME_BLACK_HEADER => Some(Self::BlackHeader),
            STYLE_NAME_BODY => Some(Self::Body),
            _ => None,
        }
    }

    /// Canonical variant name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GreyHeader => STYLE_NAME_GREY_HEADER,
            Self::BlueHeader => STYLE_NAME_BLUE_HEADER,
            Self::BlackHeader => STYLE_NAME_BLACK_HEADER,
            Self::Body => STYLE_NAME_BODY,
        }
    }

    /// Style definition of this variant.
    pub fn style(&self) -> SpecCellStyle {
        match self {
            Self::GreyHeader => SpecCellStyle {
                bg_color: Some("D9D9D9".to_string()),
                borders: SpecCellBorder::uniform(1),
                align: Some("center".to_string()),
                valign: Some("vcenter".to_string()),
            },
            Self::BlueHeader => SpecCellStyle {
                bg_color: Some("DFEBF6".to_string()),
                borders: SpecCellBorder::uniform(1),
                align: Some("center".to_string()),
                valign: Some("vcenter".to_string()),
            },
            Self::BlackHeader => SpecCellStyle {
                bg_color: Some("000000".to_string()),
                borders: SpecCellBorder::uniform(1),
                align: Some("center".to_string()),
                valign: Some("vcenter".to_string()),
            },
            Self::Body => SpecCellStyle {
                bg_color: Some("FFFFFF".to_string()),
                borders: SpecCellBorder::uniform(1),
                align: Some("right".to_string()),
                valign: Some("vcenter".to_string()),
            },
        }
    }
}

/// Data format code merged into the materialized format for one value kind.
pub fn derive_value_kind_num_format(value_kind: EnumValueKind) -> Option<&'static str> {
    match value_kind {
        EnumValueKind::Integer => Some("0"),
        EnumValueKind::Decimal => Some("0.0000"),
        EnumValueKind::Date => Some("yyyy-mm-dd"),
        EnumValueKind::Text | EnumValueKind::Other => None,
    }
}
