// Excel import/export.
//
// Import reads the first sheet only, first row as header, values as text.
// Export writes one sheet named "Sheet1": header row of labels, then data.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use tabula_engine::ids::RowIdGenerator;
use tabula_engine::worksheet::Worksheet;

use crate::table::{build_table, export_header, export_records, ImportedTable};

/// Sheet name used for exports.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

pub fn import(path: &Path, ids: &mut RowIdGenerator) -> Result<ImportedTable, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open workbook: {e}"))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Workbook has no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{sheet_name}': {e}"))?;

    let mut grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    if grid.is_empty() {
        return Err("Excel sheet is empty".to_string());
    }

    let header = grid.remove(0);
    Ok(build_table(&header, &grid, ids))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Format nicely: integers without decimals
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => format!("{n}"),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        // Raw serial; no number-format layer here to tell dates from times
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

pub fn export(sheet: &Worksheet, path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(EXPORT_SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet: {e}"))?;

    for (col, label) in export_header(&sheet.columns).iter().enumerate() {
        worksheet
            .write_string(0, col as u16, label.as_str())
            .map_err(|e| format!("Failed to write header: {e}"))?;
    }

    for (row_idx, record) in export_records(sheet).iter().enumerate() {
        for (col_idx, value) in record.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32 + 1, col_idx as u16, value.as_str())
                .map_err(|e| format!("Failed to write cell: {e}"))?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use tabula_engine::cell::CellValue;
    use tabula_engine::column::{Column, ColumnType};
    use tabula_engine::worksheet::starter_worksheet;

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let ws = starter_worksheet();
        export(&ws, &path).unwrap();

        let mut ids = RowIdGenerator::from_seed(100);
        let table = import(&path, &mut ids).unwrap();

        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0].id, "first_name");
        assert_eq!(table.columns[0].label, "First Name");
        assert_eq!(table.columns[0].column_type, ColumnType::Text);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].display("first_name"), "Alice");
        assert_eq!(table.rows[1].display("major"), "Mathematics");
    }

    #[test]
    fn test_checkbox_round_trips_as_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flags.xlsx");
        let mut ws = starter_worksheet();
        ws.columns
            .push(Column::new("ok", "OK", ColumnType::Checkbox));
        for row in &mut ws.rows {
            row.set("ok", CellValue::Bool(true));
        }
        export(&ws, &path).unwrap();

        let mut ids = RowIdGenerator::from_seed(1);
        let table = import(&path, &mut ids).unwrap();
        assert_eq!(table.rows[0].display("ok"), "true");
        // Import never infers types
        assert_eq!(
            table.columns.last().unwrap().column_type,
            ColumnType::Text
        );
    }

    #[test]
    fn test_empty_worksheet_export_then_import_fails_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let ws = Worksheet::new(1, "Empty");
        export(&ws, &path).unwrap();

        // No columns means no header row was written
        let mut ids = RowIdGenerator::from_seed(1);
        assert!(import(&path, &mut ids).is_err());
    }

    #[test]
    fn test_cell_to_string_numbers() {
        assert_eq!(cell_to_string(&Data::Float(30.0)), "30");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Bool(false)), "false");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
