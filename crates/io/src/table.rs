// Flat-table shaping shared by the CSV and XLSX adapters.
//
// Export: header row of column labels, one record per row, both in column
// order. Import: columns derived from header labels (text type, sanitized
// ids), one row per record, all-empty records dropped, fresh ids handed out
// as one contiguous batch.

use tabula_engine::cell::CellValue;
use tabula_engine::column::Column;
use tabula_engine::ids::RowIdGenerator;
use tabula_engine::row::Row;
use tabula_engine::worksheet::Worksheet;

/// Columns and rows produced by an import, before they are handed to a
/// store via `update_worksheet`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl ImportedTable {
    pub fn into_worksheet(self, id: i64, name: impl Into<String>) -> Worksheet {
        Worksheet {
            id,
            name: name.into(),
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Header labels in column order.
pub fn export_header(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.label.clone()).collect()
}

/// Display values per row, in column order. Checkboxes serialize as
/// "true"/"false" so the visible value survives a text-typed re-import.
pub fn export_records(sheet: &Worksheet) -> Vec<Vec<String>> {
    sheet
        .rows
        .iter()
        .map(|row| {
            sheet
                .columns
                .iter()
                .map(|col| row.display(&col.id))
                .collect()
        })
        .collect()
}

/// Build a table from a header row plus records.
///
/// Distinct labels that sanitize to the same id collapse: the first keeps
/// the column slot, the last field wins the row key. Records shorter than
/// the header are padded with empty cells; all-empty records are dropped.
pub fn build_table(
    header: &[String],
    records: &[Vec<String>],
    ids: &mut RowIdGenerator,
) -> ImportedTable {
    let mut columns: Vec<Column> = Vec::with_capacity(header.len());
    for label in header {
        let col = Column::from_label(label.clone());
        if !columns.iter().any(|c| c.id == col.id) {
            columns.push(col);
        }
    }

    let kept: Vec<&Vec<String>> = records
        .iter()
        .filter(|record| !record.iter().all(|field| field.is_empty()))
        .collect();

    let id_batch = ids.reserve(kept.len());
    let rows = kept
        .into_iter()
        .zip(id_batch)
        .map(|(record, id)| {
            let mut row = Row::empty(id, &columns);
            for (i, label) in header.iter().enumerate() {
                let value = record.get(i).cloned().unwrap_or_default();
                row.set(
                    tabula_engine::ids::sanitize_column_id(label),
                    CellValue::Text(value),
                );
            }
            row
        })
        .collect();

    ImportedTable { columns, rows }
}
