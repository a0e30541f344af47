//! Workbook-scoped style slot cache.
//!
//! XLSX workbooks cap the number of distinct format slots (low thousands),
//! so formats must be allocated per distinct style, never per cell. The
//! cache interns resolved style definitions workbook-wide: the first
//! request for a distinct (value kind, style) identity materializes one
//! format slot, every later request returns the same slot handle. Slot
//! growth is therefore bounded by distinct (column, location) styles
//! rather than by rows or cells, across all sheets of one workbook.

use std::collections::BTreeMap;

use rust_xlsxwriter::Format;

use crate::spec::{EnumValueKind, SpecCellStyle};
use crate::style::derive_workbook_format;

/// Interning cache from resolved style identity to a materialized format
/// slot. Owned by one exporter; never shared across workbooks, since
/// format slots are not portable between documents.
#[derive(Default)]
pub struct StyleSlotCache {
    dict_slot_by_identity: BTreeMap<(EnumValueKind, SpecCellStyle), usize>,
    l_formats: Vec<Format>,
}

impl StyleSlotCache {
    /// Empty cache for a fresh workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot for this (value kind, style) identity, materializing
    /// a new format only on first sight.
    pub fn intern(&mut self, value_kind: EnumValueKind, style: &SpecCellStyle) -> usize {
        if let Some(n_slot) = self
            .dict_slot_by_identity
            .get(&(value_kind, style.clone()))
        {
            return *n_slot;
        }

        let n_slot = self.l_formats.len();
        self.l_formats
            .push(derive_workbook_format(style, value_kind));
        self.dict_slot_by_identity
            .insert((value_kind, style.clone()), n_slot);
        n_slot
    }

    /// Materialized format for one slot handle.
    pub fn format_of(&self, n_slot: usize) -> &Format {
        &self.l_formats[n_slot]
    }

    /// Number of distinct materialized slots.
    pub fn slot_count(&self) -> usize {
        self.l_formats.len()
    }
}
