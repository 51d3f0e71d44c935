// src/process/transform.rs
//
// Column normalization over the typed registry records.

use chrono::Datelike;

use crate::error::{Result, SebraError};
use crate::process::load::Transaction;

/// Lowercase every column name.
///
/// Idempotent. Fails with `SchemaMismatch` when two distinct input names
/// fold to the same lowercase form, since the result could no longer be
/// used as a unique header set.
pub fn lowercase_columns(names: &[String]) -> Result<Vec<String>> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let lower = name.to_lowercase();
        if !seen.insert(lower.clone()) {
            return Err(SebraError::schema(
                "header row",
                lower,
                "two columns lowercase to the same name",
            ));
        }
        out.push(lower);
    }
    Ok(out)
}

/// Derive `reg_year` from `reg_date`, in place.
///
/// The date field is statically part of the schema, so unlike a dynamic
/// table there is no missing-column case to report.
pub fn add_reg_year(rows: &mut [Transaction]) {
    for row in rows.iter_mut() {
        row.reg_year = Some(row.reg_date.year());
    }
}

/// Uppercase every declared text field, in place.
///
/// Walks one field across all rows at a time, so peak allocation is
/// bounded by a single column rather than a copy of the table. Null
/// receiver names pass through; numeric and date fields are not touched.
pub fn uppercase_text_fields(rows: &mut [Transaction]) {
    let text_fields: &[fn(&mut Transaction) -> Option<&mut String>] = &[
        |t| Some(&mut t.client_receiver_acc),
        |t| Some(&mut t.client_name_hash),
        |t| t.client_receiver_name.as_mut(),
        |t| Some(&mut t.primary_organization),
    ];

    for field in text_fields {
        for row in rows.iter_mut() {
            if let Some(value) = field(row) {
                *value = value.to_uppercase();
            }
        }
    }
}
