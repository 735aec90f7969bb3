// A worksheet: one named table of typed columns and ordered rows.
//
// Invariants maintained by the store:
// - column ids are unique within a worksheet
// - every row holds a key for every current column id
// - row order is insertion order, column order is display order

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::column::{Column, ColumnType};
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub id: i64,
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Worksheet {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// New worksheet with the default three-column template and no rows.
    pub fn with_template(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            columns: template_columns(),
            rows: Vec::new(),
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub fn row(&self, row_id: i64) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn row_mut(&mut self, row_id: i64) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == row_id)
    }

    /// Largest row id present, used to keep id generation ahead of
    /// bulk-replaced content.
    pub fn max_row_id(&self) -> i64 {
        self.rows.iter().map(|r| r.id).max().unwrap_or(0)
    }
}

/// The default column template for fresh worksheets.
pub fn template_columns() -> Vec<Column> {
    vec![
        Column::new("first_name", "First Name", ColumnType::Text),
        Column::new("last_name", "Last Name", ColumnType::Text),
        Column::new("major", "Major", ColumnType::Text),
    ]
}

/// The built-in starter worksheet: template columns plus two seed rows.
pub fn starter_worksheet() -> Worksheet {
    let columns = template_columns();
    let mut first = Row::empty(1, &columns);
    first.set("first_name", "Alice");
    first.set("last_name", "Smith");
    first.set("major", "Physics");
    let mut second = Row::empty(2, &columns);
    second.set("first_name", "Bob");
    second.set("last_name", "Johnson");
    second.set("major", "Mathematics");

    Worksheet {
        id: 1,
        name: "Sheet 1".to_string(),
        columns,
        rows: vec![first, second],
    }
}

impl Worksheet {
    /// Check the structural invariants. Used by tests; mutation paths are
    /// expected to keep these true at all times.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.id.as_str()) {
                return Err(format!("duplicate column id: {}", col.id));
            }
        }
        for row in &self.rows {
            if row.cells.len() != self.columns.len() {
                return Err(format!(
                    "row {} has {} keys, worksheet has {} columns",
                    row.id,
                    row.cells.len(),
                    self.columns.len()
                ));
            }
            for col in &self.columns {
                if !row.cells.contains_key(&col.id) {
                    return Err(format!("row {} missing key {}", row.id, col.id));
                }
            }
        }
        Ok(())
    }

    /// Cell value at a row/column intersection, empty when absent.
    pub fn cell(&self, row_id: i64, column_id: &str) -> CellValue {
        self.row(row_id)
            .and_then(|r| r.get(column_id).cloned())
            .unwrap_or_default()
    }
}
