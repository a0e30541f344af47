//! Declarative sheet schemas: static column descriptor tables that replace
//! per-call type introspection.

use crate::spec::{EnumCellValue, EnumStyleRef, SpecColumnDescriptor};

/// Ordered column descriptor table plus schema-level default styles for one
/// row model. Built once per model via [`SheetSchemaBuilder`].
#[derive(Debug, Clone, Default)]
pub struct SpecSheetSchema {
    /// Exported columns in render order.
    pub l_columns: Vec<SpecColumnDescriptor>,
    /// Default header style applied where a column declares no override.
    pub style_header_default: EnumStyleRef,
    /// Default body style applied where a column declares no override.
    pub style_body_default: EnumStyleRef,
}

impl SpecSheetSchema {
    /// Start an empty schema builder.
    pub fn builder() -> SheetSchemaBuilder {
        SheetSchemaBuilder::default()
    }

    /// Number of exported columns.
    pub fn n_columns(&self) -> usize {
        self.l_columns.len()
    }

    /// `true` when the schema exports no columns.
    pub fn is_empty(&self) -> bool {
        self.l_columns.is_empty()
    }
}

/// Incremental [`SpecSheetSchema`] constructor.
///
/// `extends` takes the place of superclass field traversal: the base
/// schema's columns always come first, own columns follow in declaration
/// order, and base default styles are inherited unless this builder sets
/// its own.
#[derive(Debug, Clone, Default)]
pub struct SheetSchemaBuilder {
    l_columns_base: Vec<SpecColumnDescriptor>,
    l_columns_own: Vec<SpecColumnDescriptor>,
    style_header_default: EnumStyleRef,
    style_body_default: EnumStyleRef,
}

impl SheetSchemaBuilder {
    /// Inherit columns and default styles from a base schema.
    pub fn extends(mut self, base: &SpecSheetSchema) -> Self {
        self.l_columns_base.extend(base.l_columns.iter().cloned());
        if self.style_header_default == EnumStyleRef::None {
            self.style_header_default = base.style_header_default.clone();
        }
        if self.style_body_default == EnumStyleRef::None {
            self.style_body_default = base.style_body_default.clone();
        }
        self
    }

    /// Append one exported column.
    pub fn column(mut self, descriptor: SpecColumnDescriptor) -> Self {
        self.l_columns_own.push(descriptor);
        self
    }

    /// Set the schema-level default header style.
    pub fn style_header_default(mut self, style_ref: EnumStyleRef) -> Self {
        self.style_header_default = style_ref;
        self
    }

    /// Set the schema-level default body style.
    pub fn style_body_default(mut self, style_ref: EnumStyleRef) -> Self {
        self.style_body_default = style_ref;
        self
    }

    /// Finalize the schema, base columns first.
    pub fn build(self) -> SpecSheetSchema {
        let mut l_columns = self.l_columns_base;
        l_columns.extend(self.l_columns_own);
        SpecSheetSchema {
            l_columns,
            style_header_default: self.style_header_default,
            style_body_default: self.style_body_default,
        }
    }
}

/// Row model exported through a declarative schema.
///
/// `schema` is expected to be pure and stable per type; `value_of` returns
/// the runtime value for one field key of this record.
pub trait SheetRowModel {
    /// Column table and default styles for this model.
    fn schema() -> SpecSheetSchema;

    /// Runtime value of `field_key` for this record;
    /// [`EnumCellValue::None`] when the record has no such field.
    fn value_of(&self, field_key: &str) -> EnumCellValue;
}
