//! Style resolution and materialization.
//!
//! Resolution decides *which* style definition applies to one cell location
//! (field override, then schema default, then engine default) and is pure
//! with respect to the workbook. Materialization turns a resolved
//! definition plus a value kind into a `rust_xlsxwriter::Format`.

use log::warn;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

use crate::conf::{EnumNamedCellStyle, derive_value_kind_num_format};
use crate::spec::{EnumStyleRef, EnumValueKind, ExportError, SpecCellStyle};

/// Pick the style reference that applies: a non-sentinel field-level
/// override wins over the schema-level default.
pub fn resolve_applied_style_ref<'a>(
    ref_field: &'a EnumStyleRef,
    ref_schema_default: &'a EnumStyleRef,
) -> &'a EnumStyleRef {
    if matches!(ref_field, EnumStyleRef::None) {
        return ref_schema_default;
    }
    ref_field
}

/// Resolve one style reference into a concrete style definition.
///
/// The `EnumStyleRef::None` sentinel resolves to the engine default; the
/// schema contract expects default styles to always be declared, so that
/// branch is logged as unexpected but never fails.
pub fn derive_style_from_ref(style_ref: &EnumStyleRef) -> Result<SpecCellStyle, ExportError> {
    match style_ref {
        EnumStyleRef::None => {
            warn!("No style declared at any precedence level; using engine default style.");
            Ok(SpecCellStyle::default())
        }
        EnumStyleRef::Named(name) => match EnumNamedCellStyle::from_name(name) {
            Some(variant) => Ok(variant.style()),
            None => Err(ExportError::UnknownStyleVariant { name: name.clone() }),
        },
        EnumStyleRef::Builder(build_fn) => Ok(build_fn()),
    }
}

/// Full precedence resolution for one cell location.
pub fn resolve_cell_style(
    ref_field: &EnumStyleRef,
    ref_schema_default: &EnumStyleRef,
) -> Result<SpecCellStyle, ExportError> {
    derive_style_from_ref(resolve_applied_style_ref(ref_field, ref_schema_default))
}

/// Materialize a resolved style definition into a workbook format, merging
/// in the value-kind data format.
pub fn derive_workbook_format(style: &SpecCellStyle, value_kind: EnumValueKind) -> Format {
    let mut format = Format::new();

    if let Some(val) = &style.bg_color {
        format = format.set_background_color(val.as_str());
    }

    format = format.set_border_top(derive_format_border(style.borders.top));
    format = format.set_border_bottom(derive_format_border(style.borders.bottom));
    format = format.set_border_left(derive_format_border(style.borders.left));
    format = format.set_border_right(derive_format_border(style.borders.right));

    if let Some(val) = &style.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &style.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(num_format) = derive_value_kind_num_format(value_kind) {
        format = format.set_num_format(num_format);
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        0 => FormatBorder::None,
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
