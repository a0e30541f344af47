//! Render-resource construction for the two export modes.
//!
//! All configuration validation happens here, before any style slot is
//! materialized and before the workbook sees a single cell, so a failed
//! export never leaves a partially-styled document.

use std::collections::BTreeMap;

use log::debug;

use crate::cache::StyleSlotCache;
use crate::schema::SpecSheetSchema;
use crate::spec::{
    EnumHeaderSource, EnumRenderLocation, EnumStyleRef, EnumValueKind, ExportError, SpecCellStyle,
    SpecColumnDescriptor, SpecDeclaredColumnStyles, SpecRenderResource, SpecStyleCacheKey,
};
use crate::style::resolve_cell_style;
use crate::util::validate_unique_field_keys;

/// Build the render resource for a schema-driven (annotated-model) export.
///
/// Header cells always use the [`EnumValueKind::Text`] data format; body
/// cells use the column's declared kind.
pub fn prepare_render_resource_from_schema(
    schema: &SpecSheetSchema,
    cache: &mut StyleSlotCache,
) -> Result<SpecRenderResource, ExportError> {
    if schema.is_empty() {
        return Err(ExportError::NoExportedColumns);
    }

    let l_field_keys: Vec<&str> = schema
        .l_columns
        .iter()
        .map(|col| col.field_key.as_str())
        .collect();
    validate_unique_field_keys(&l_field_keys)?;

    // Resolve every style before the first slot is interned.
    let mut l_styles_resolved: Vec<(SpecCellStyle, SpecCellStyle)> =
        Vec::with_capacity(schema.n_columns());
    for col in &schema.l_columns {
        let style_header = resolve_cell_style(&col.style_header, &schema.style_header_default)?;
        let style_body = resolve_cell_style(&col.style_body, &schema.style_body_default)?;
        l_styles_resolved.push((style_header, style_body));
    }

    let resource = intern_column_slots(
        schema.l_columns.clone(),
        &l_styles_resolved,
        EnumHeaderSource::AnnotatedModel,
        cache,
    );
    debug!(
        "Prepared schema render resource: {} columns, {} style slots in workbook.",
        resource.n_columns(),
        cache.slot_count()
    );
    Ok(resource)
}

/// Build the render resource for a declared-key export: parallel header
/// name / field key lists plus one uniform header style and one uniform
/// body style for every column. All columns carry the text value kind.
pub fn prepare_render_resource_from_keys(
    header_names: &[String],
    field_keys: &[String],
    styles: &SpecDeclaredColumnStyles,
    cache: &mut StyleSlotCache,
) -> Result<SpecRenderResource, ExportError> {
    if header_names.len() != field_keys.len() {
        return Err(ExportError::HeaderFieldCountMismatch {
            n_headers: header_names.len(),
            n_fields: field_keys.len(),
        });
    }
    if field_keys.is_empty() {
        return Err(ExportError::NoExportedColumns);
    }

    let l_field_keys: Vec<&str> = field_keys.iter().map(String::as_str).collect();
    validate_unique_field_keys(&l_field_keys)?;

    let style_header = resolve_cell_style(&styles.style_header, &EnumStyleRef::None)?;
    let style_body = resolve_cell_style(&styles.style_body, &EnumStyleRef::None)?;

    let l_columns: Vec<SpecColumnDescriptor> = field_keys
        .iter()
        .zip(header_names.iter())
        .map(|(c_key, c_header)| {
            SpecColumnDescriptor::new(c_key.clone(), c_header.clone(), EnumValueKind::Text)
        })
        .collect();
    let l_styles_resolved: Vec<(SpecCellStyle, SpecCellStyle)> = l_columns
        .iter()
        .map(|_| (style_header.clone(), style_body.clone()))
        .collect();

    let resource = intern_column_slots(
        l_columns,
        &l_styles_resolved,
        EnumHeaderSource::DeclaredKeys,
        cache,
    );
    debug!(
        "Prepared declared-key render resource: {} columns, {} style slots in workbook.",
        resource.n_columns(),
        cache.slot_count()
    );
    Ok(resource)
}

fn intern_column_slots(
    l_columns: Vec<SpecColumnDescriptor>,
    l_styles_resolved: &[(SpecCellStyle, SpecCellStyle)],
    header_source: EnumHeaderSource,
    cache: &mut StyleSlotCache,
) -> SpecRenderResource {
    let mut l_slots_header = Vec::with_capacity(l_columns.len());
    let mut l_slots_body = Vec::with_capacity(l_columns.len());
    let mut dict_slot_by_key = BTreeMap::new();

    for (col, (style_header, style_body)) in l_columns.iter().zip(l_styles_resolved) {
        let n_slot_header = cache.intern(EnumValueKind::Text, style_header);
        let n_slot_body = cache.intern(col.value_kind, style_body);

        l_slots_header.push(n_slot_header);
        l_slots_body.push(n_slot_body);
        dict_slot_by_key.insert(
            SpecStyleCacheKey::of(
                EnumValueKind::Text,
                col.field_key.clone(),
                EnumRenderLocation::Header,
            ),
            n_slot_header,
        );
        dict_slot_by_key.insert(
            SpecStyleCacheKey::of(
                col.value_kind,
                col.field_key.clone(),
                EnumRenderLocation::Body,
            ),
            n_slot_body,
        );
    }

    SpecRenderResource {
        l_columns,
        l_slots_header,
        l_slots_body,
        dict_slot_by_key,
        header_source,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn user_schema() -> SpecSheetSchema {
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

    #[test]
    fn test_schema_resource_preserves_order_and_names() {
        let mut cache = StyleSlotCache::new();
        let resource =
            prepare_render_resource_from_schema(&user_schema(), &mut cache).expect("resource");

        assert_eq!(resource.field_order(), vec!["rank", "nickname"]);
        assert_eq!(
            resource.header_names(),
            vec![("rank", "Rank"), ("nickname", "Nickname")]
        );
        assert_eq!(resource.header_source, EnumHeaderSource::AnnotatedModel);
    }

    #[test]
    fn test_identical_resolved_styles_share_slots() {
        let mut cache = StyleSlotCache::new();
        let resource =
            prepare_render_resource_from_schema(&user_schema(), &mut cache).expect("resource");

        // Both header cells resolve to the same grey style: one slot.
        assert_eq!(resource.l_slots_header[0], resource.l_slots_header[1]);
        // Integer body and text body share a style definition but differ in
        // data format, so they occupy distinct slots.
        assert_ne!(resource.l_slots_body[0], resource.l_slots_body[1]);
        // 1 header + 2 body slots in total.
        assert_eq!(cache.slot_count(), 3);
    }

    #[test]
    fn test_by_key_lookup_matches_aligned_slots() {
        let mut cache = StyleSlotCache::new();
        let resource =
            prepare_render_resource_from_schema(&user_schema(), &mut cache).expect("resource");

        assert_eq!(
            resource.slot_of(EnumValueKind::Text, "rank", EnumRenderLocation::Header),
            Some(resource.l_slots_header[0])
        );
        assert_eq!(
            resource.slot_of(EnumValueKind::Integer, "rank", EnumRenderLocation::Body),
            Some(resource.l_slots_body[0])
        );
        assert_eq!(
            resource.slot_of(EnumValueKind::Decimal, "rank", EnumRenderLocation::Body),
            None
        );
    }

    #[test]
    fn test_empty_schema_is_rejected() {
        let mut cache = StyleSlotCache::new();
        let result =
            prepare_render_resource_from_schema(&SpecSheetSchema::default(), &mut cache);
        assert!(matches!(result, Err(ExportError::NoExportedColumns)));
        assert_eq!(cache.slot_count(), 0);
    }

    #[test]
    fn test_key_mode_length_mismatch_fails_before_any_slot() {
        let mut cache = StyleSlotCache::new();
        let l_headers: Vec<String> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let l_keys: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();

        let result = prepare_render_resource_from_keys(
            &l_headers,
            &l_keys,
            &SpecDeclaredColumnStyles::default(),
            &mut cache,
        );
        assert!(matches!(
            result,
            Err(ExportError::HeaderFieldCountMismatch {
                n_headers: 5,
                n_fields: 4
            })
        ));
        assert_eq!(cache.slot_count(), 0);
    }

    #[test]
    fn test_key_mode_uses_uniform_styles_and_text_kind() {
        let mut cache = StyleSlotCache::new();
        let l_headers: Vec<String> = ["Rank", "Nickname"].iter().map(ToString::to_string).collect();
        let l_keys: Vec<String> = ["rank", "nickname"].iter().map(ToString::to_string).collect();

        let resource = prepare_render_resource_from_keys(
            &l_headers,
            &l_keys,
            &SpecDeclaredColumnStyles::default(),
            &mut cache,
        )
        .expect("resource");

        assert_eq!(resource.header_source, EnumHeaderSource::DeclaredKeys);
        assert!(resource
            .l_columns
            .iter()
            .all(|col| col.value_kind == EnumValueKind::Text));
        // One header slot + one body slot for the whole sheet.
        assert_eq!(cache.slot_count(), 2);
    }

    #[test]
    fn test_duplicate_field_keys_are_rejected() {
        let mut cache = StyleSlotCache::new();
        let schema = SpecSheetSchema::builder()
            .column(SpecColumnDescriptor::new("a", "A", EnumValueKind::Text))
            .column(SpecColumnDescriptor::new("a", "A again", EnumValueKind::Text))
            .build();

        let result = prepare_render_resource_from_schema(&schema, &mut cache);
        assert!(matches!(
            result,
            Err(ExportError::DuplicateFieldKey(key)) if key == "a"
        ));
    }
}
