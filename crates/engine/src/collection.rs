// The owning collection of worksheets: ordered sheets plus the active
// selection. At least one worksheet always exists.

use crate::ids::RowIdGenerator;
use crate::worksheet::{starter_worksheet, Worksheet};

pub struct WorksheetCollection {
    sheets: Vec<Worksheet>,
    active: usize,
    ids: RowIdGenerator,
}

impl WorksheetCollection {
    /// The built-in default: a single starter worksheet.
    pub fn new() -> Self {
        Self::from_sheets(vec![starter_worksheet()])
    }

    /// Build from loaded state. An empty list falls back to the default.
    pub fn from_sheets(sheets: Vec<Worksheet>) -> Self {
        let sheets = if sheets.is_empty() {
            vec![starter_worksheet()]
        } else {
            sheets
        };
        let mut ids = RowIdGenerator::new();
        let max_sheet_id = sheets.iter().map(|s| s.id).max().unwrap_or(0);
        ids.advance_past(max_sheet_id);
        Self {
            sheets,
            active: 0,
            ids,
        }
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        // Invariant: never empty
        self.sheets.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Worksheet {
        &self.sheets[self.active]
    }

    pub fn get(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), String> {
        if index >= self.sheets.len() {
            return Err(format!(
                "no worksheet at index {index} ({} sheets)",
                self.sheets.len()
            ));
        }
        self.active = index;
        Ok(())
    }

    /// Append a fresh template worksheet named `Sheet N` and make it active.
    pub fn add_worksheet(&mut self) -> &Worksheet {
        let id = self.ids.next_id();
        let name = format!("Sheet {}", self.sheets.len() + 1);
        self.sheets.push(Worksheet::with_template(id, name));
        self.active = self.sheets.len() - 1;
        self.active()
    }

    /// Remove the worksheet at `index`. Refused when it is the last one.
    pub fn remove_worksheet(&mut self, index: usize) -> Result<(), String> {
        if index >= self.sheets.len() {
            return Err(format!(
                "no worksheet at index {index} ({} sheets)",
                self.sheets.len()
            ));
        }
        if self.sheets.len() == 1 {
            return Err("cannot remove the last worksheet".to_string());
        }
        self.sheets.remove(index);
        // Keep the selection on a neighbor: index 0 stays, otherwise step left.
        self.active = if index == 0 { 0 } else { index - 1 };
        Ok(())
    }

    /// Rename the worksheet at `index` to the trimmed value; a blank value
    /// keeps the old name.
    pub fn rename_worksheet(&mut self, index: usize, name: &str) -> Result<(), String> {
        let sheet = self
            .sheets
            .get_mut(index)
            .ok_or_else(|| format!("no worksheet at index {index}"))?;
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            sheet.name = trimmed.to_string();
        }
        Ok(())
    }

    /// Replace the worksheet at `index` wholesale (store hand-back).
    pub fn replace_worksheet(&mut self, index: usize, sheet: Worksheet) -> Result<(), String> {
        let slot = self
            .sheets
            .get_mut(index)
            .ok_or_else(|| format!("no worksheet at index {index}"))?;
        *slot = sheet;
        Ok(())
    }

    pub fn into_sheets(self) -> Vec<Worksheet> {
        self.sheets
    }
}

impl Default for WorksheetCollection {
    fn default() -> Self {
        Self::new()
    }
}
