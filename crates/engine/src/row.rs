// Rows: a stable numeric id plus one cell per current column id.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::column::Column;

/// One worksheet row. Serializes as the flat object shape
/// `{"id": 1, "first_name": "Alice", ...}`; cell keys live beside `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    #[serde(flatten)]
    pub cells: FxHashMap<String, CellValue>,
}

impl Row {
    /// Fresh row with an empty string for every current column.
    pub fn empty(id: i64, columns: &[Column]) -> Self {
        let cells = columns
            .iter()
            .map(|c| (c.id.clone(), CellValue::empty()))
            .collect();
        Self { id, cells }
    }

    pub fn get(&self, column_id: &str) -> Option<&CellValue> {
        self.cells.get(column_id)
    }

    pub fn set(&mut self, column_id: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column_id.into(), value.into());
    }

    pub fn remove(&mut self, column_id: &str) {
        self.cells.remove(column_id);
    }

    /// Display value for a column; empty string when the key is absent.
    pub fn display(&self, column_id: &str) -> String {
        self.cells
            .get(column_id)
            .map(|v| v.display())
            .unwrap_or_default()
    }

    /// True when every listed column is blank (or missing) in this row.
    pub fn is_blank_in(&self, column_ids: &[String]) -> bool {
        column_ids
            .iter()
            .all(|id| self.cells.get(id).map_or(true, |v| v.is_blank()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name", ColumnType::Text),
            Column::new("done", "Done", ColumnType::Checkbox),
        ]
    }

    #[test]
    fn test_empty_row_has_all_keys() {
        let row = Row::empty(7, &columns());
        assert_eq!(row.id, 7);
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.get("name"), Some(&CellValue::empty()));
        assert_eq!(row.get("done"), Some(&CellValue::empty()));
    }

    #[test]
    fn test_serde_flat_shape() {
        let mut row = Row::empty(1, &columns());
        row.set("name", "Alice");
        row.set("done", true);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["done"], true);

        let back: Row = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_blank_in() {
        let mut row = Row::empty(1, &columns());
        assert!(row.is_blank_in(&["name".to_string()]));
        row.set("name", "  ");
        assert!(row.is_blank_in(&["name".to_string()]));
        row.set("name", "x");
        assert!(!row.is_blank_in(&["name".to_string()]));
        // Missing keys are blank
        assert!(row.is_blank_in(&["ghost".to_string()]));
    }
}
