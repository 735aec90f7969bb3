// Mapping enrichment results back onto the worksheet.
//
// The i-th returned value belongs to the i-th row of the *filtered* input
// set; matching back into the full sheet goes by row id, so rows excluded
// from the filter are left exactly as they were.

use rustc_hash::FxHashMap;
use serde_json::Value;

use tabula_engine::cell::CellValue;
use tabula_engine::row::Row;
use tabula_engine::worksheet::Worksheet;

/// The full replacement row set for `update_worksheet` after a successful
/// enrichment. `enriched_row_ids` are the filtered rows' ids, in the order
/// they were sent; `values` pair positionally. An unknown target column
/// leaves every row untouched rather than planting a stray key.
pub fn apply_enrichment(
    sheet: &Worksheet,
    target_column_id: &str,
    enriched_row_ids: &[i64],
    values: &[Value],
) -> Vec<Row> {
    if sheet.column(target_column_id).is_none() {
        return sheet.rows.clone();
    }

    let by_id: FxHashMap<i64, &Value> = enriched_row_ids
        .iter()
        .copied()
        .zip(values.iter())
        .collect();

    sheet
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if let Some(value) = by_id.get(&row.id) {
                row.set(target_column_id, value_to_cell(value));
            }
            row
        })
        .collect()
}

fn value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Bool(b) => CellValue::Bool(*b),
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Null => CellValue::empty(),
        other => CellValue::Text(other.to_string()),
    }
}
