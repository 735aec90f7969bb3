// The worksheet mutation store.
//
// All operations are synchronous and whole: each one computes its complete
// result before the single change notification fires, so no partial state is
// ever observable. Operations that would break an invariant (duplicate
// column id, stray row key) are silent no-ops instead.

use crate::cell::CellValue;
use crate::column::{Column, ColumnType};
use crate::events::ChangeCallback;
use crate::ids::{sanitize_column_id, unique_copy_id, RowIdGenerator};
use crate::row::Row;
use crate::worksheet::Worksheet;

/// Where a new column lands relative to its base column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPosition {
    #[default]
    End,
    Left,
    Right,
}

impl std::str::FromStr for ColumnPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end" => Ok(ColumnPosition::End),
            "left" => Ok(ColumnPosition::Left),
            "right" => Ok(ColumnPosition::Right),
            other => Err(format!("unknown position: {other}")),
        }
    }
}

pub struct WorksheetStore {
    sheet: Worksheet,
    ids: RowIdGenerator,
    on_change: Option<ChangeCallback>,
}

impl WorksheetStore {
    pub fn new(sheet: Worksheet) -> Self {
        let mut ids = RowIdGenerator::new();
        ids.advance_past(sheet.max_row_id());
        Self {
            sheet,
            ids,
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn sheet(&self) -> &Worksheet {
        &self.sheet
    }

    pub fn into_sheet(self) -> Worksheet {
        self.sheet
    }

    fn notify(&mut self) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(&self.sheet);
        }
    }

    /// Add a column.
    ///
    /// With a `base_column_id` that resolves, duplicates that column: id via
    /// the `_copy` probe, label suffixed " (Copy)", same type, every row's
    /// new cell seeded from the base column. Otherwise creates a column from
    /// `new_label`/`new_type` with a derived id. `Left`/`Right` insert
    /// adjacent to the base column; without a resolvable base they append.
    ///
    /// Silent no-op when there is neither a base column nor a non-blank
    /// label, and when the derived id already exists.
    pub fn add_column(
        &mut self,
        position: ColumnPosition,
        base_column_id: Option<&str>,
        new_label: &str,
        new_type: ColumnType,
    ) {
        let base = base_column_id.and_then(|id| self.sheet.column(id).cloned());
        if base.is_none() && new_label.trim().is_empty() {
            return;
        }

        let column = match &base {
            Some(b) => {
                let existing: Vec<&str> =
                    self.sheet.columns.iter().map(|c| c.id.as_str()).collect();
                Column::new(
                    unique_copy_id(&b.id, &existing),
                    format!("{} (Copy)", b.label),
                    b.column_type,
                )
            }
            None => Column::new(sanitize_column_id(new_label), new_label, new_type),
        };
        if self.sheet.column(&column.id).is_some() {
            return;
        }

        let insert_at = match position {
            ColumnPosition::End => self.sheet.columns.len(),
            ColumnPosition::Left => base
                .as_ref()
                .and_then(|b| self.sheet.column_index(&b.id))
                .unwrap_or(self.sheet.columns.len()),
            ColumnPosition::Right => base
                .as_ref()
                .and_then(|b| self.sheet.column_index(&b.id))
                .map(|i| i + 1)
                .unwrap_or(self.sheet.columns.len()),
        };

        for row in &mut self.sheet.rows {
            let seed = match &base {
                Some(b) => row.get(&b.id).cloned().unwrap_or_default(),
                None => CellValue::empty(),
            };
            row.set(column.id.clone(), seed);
        }
        self.sheet.columns.insert(insert_at, column);
        self.notify();
    }

    /// Drop a column and its key from every row.
    pub fn remove_column(&mut self, column_id: &str) {
        self.sheet.columns.retain(|c| c.id != column_id);
        for row in &mut self.sheet.rows {
            row.remove(column_id);
        }
        self.notify();
    }

    /// Retag a column. Existing cell values are neither converted nor
    /// validated against the new type.
    pub fn change_column_type(&mut self, column_id: &str, new_type: ColumnType) {
        for col in &mut self.sheet.columns {
            if col.id == column_id {
                col.column_type = new_type;
            }
        }
        self.notify();
    }

    /// Set a column's label to the trimmed value; a blank value keeps the
    /// old label.
    pub fn rename_column(&mut self, column_id: &str, new_label: &str) {
        let trimmed = new_label.trim();
        for col in &mut self.sheet.columns {
            if col.id == column_id && !trimmed.is_empty() {
                col.label = trimmed.to_string();
            }
        }
        self.notify();
    }

    /// Append a row with a fresh id and an empty cell per current column.
    /// Returns the new row's id.
    pub fn add_row(&mut self) -> i64 {
        let id = self.ids.next_id();
        let row = Row::empty(id, &self.sheet.columns);
        self.sheet.rows.push(row);
        self.notify();
        id
    }

    pub fn remove_row(&mut self, row_id: i64) {
        self.sheet.rows.retain(|r| r.id != row_id);
        self.notify();
    }

    /// Replace the value at a row/column intersection. Unknown row or
    /// column ids are ignored, since a stray key would break the row-shape
    /// invariant.
    pub fn update_cell(&mut self, row_id: i64, column_id: &str, value: impl Into<CellValue>) {
        if self.sheet.column(column_id).is_none() {
            return;
        }
        let Some(row) = self.sheet.row_mut(row_id) else {
            return;
        };
        row.set(column_id, value.into());
        self.notify();
    }

    /// Bulk replace, used by import and enrichment result application.
    pub fn update_worksheet(&mut self, columns: Vec<Column>, rows: Vec<Row>) {
        self.sheet.columns = columns;
        self.sheet.rows = rows;
        self.ids.advance_past(self.sheet.max_row_id());
        self.notify();
    }
}
