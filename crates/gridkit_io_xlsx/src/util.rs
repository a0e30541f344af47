//! Stateless helpers shared by resource construction and the writer.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, EnumValueKind, ExportError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to a valid Excel sheet name. Boundary
/// apostrophes and the reserved name `history` are rejected by the
/// workbook, so they are stripped here as well.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let c_name: String = c_name
        .trim()
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();
    // Truncation can re-expose a boundary apostrophe; trim after capping.
    let c_name = c_name
        .trim_matches(|ch: char| ch == '\'' || ch.is_whitespace())
        .to_string();
    if c_name.is_empty() || c_name.eq_ignore_ascii_case("history") {
        return "Sheet".to_string();
    }
    c_name
}

/// Derive a workbook-unique sheet name, recording it in `set_names_existing`.
pub fn derive_unique_sheet_name(set_names_existing: &mut BTreeSet<String>, name: &str) -> String {
    if !set_names_existing.contains(name) {
        set_names_existing.insert(name.to_string());
        return name.to_string();
    }

    let mut n_idx = 2usize;
    loop {
        // The base shrinks with the suffix so the suffix itself is never
        // truncated away; distinct indices always yield distinct names.
        let c_suffix = format!("__{n_idx}");
        let n_len_base_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
        let base_name: String = name.chars().take(usize::max(1, n_len_base_max)).collect();
        let candidate = format!("{base_name}{c_suffix}");
        if !set_names_existing.contains(&candidate) {
            set_names_existing.insert(candidate.clone());
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldKeyValidation

/// Reject duplicated field keys; a resource maps each key to one column.
pub fn validate_unique_field_keys(field_keys: &[&str]) -> Result<(), ExportError> {
    let mut set_seen = BTreeSet::new();
    for c_key in field_keys {
        if !set_seen.insert(*c_key) {
            return Err(ExportError::DuplicateFieldKey((*c_key).to_string()));
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize one runtime value against its column kind: numeric kinds parse
/// numeric-looking text, the text kind renders numbers as text, and
/// non-finite numbers become blanks.
pub fn convert_cell_value(value: &EnumCellValue, value_kind: EnumValueKind) -> EnumCellValue {
    match value_kind {
        EnumValueKind::Text | EnumValueKind::Other => match value {
            EnumCellValue::Number(n) => EnumCellValue::String(n.to_string()),
            _ => value.clone(),
        },
        EnumValueKind::Integer | EnumValueKind::Decimal | EnumValueKind::Date => match value {
            EnumCellValue::Number(n) => {
                if n.is_finite() {
                    EnumCellValue::Number(*n)
                } else {
                    EnumCellValue::None
                }
            }
            EnumCellValue::String(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => EnumCellValue::Number(n),
                _ => EnumCellValue::String(s.clone()),
            },
            EnumCellValue::None => EnumCellValue::None,
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

/// Cast a row index into the worksheet address space, enforcing the
/// worksheet row cap.
pub fn cast_row_num(value: usize) -> Result<u32, ExportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ExportError::RowIndexOverflow(value));
    }
    Ok(value as u32)
}

/// Cast a column index into the worksheet address space, enforcing the
/// worksheet column cap.
pub fn cast_col_num(value: usize) -> Result<u16, ExportError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ExportError::ColumnIndexOverflow(value));
    }
    Ok(value as u16)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
