// Cell values: a string, a boolean (checkbox), or empty.
//
// The column type tags how a cell is rendered, never how it is stored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// True when the cell carries no usable data: a text value that is
    /// blank after trimming. A checkbox counts as data either way.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Bool(_) => false,
            CellValue::Text(t) => t.trim().is_empty(),
        }
    }

    /// Display form: the text itself, or "true"/"false" for checkboxes.
    pub fn display(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Text(t) => t.clone(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
