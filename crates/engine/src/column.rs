// Column definitions. The type is a display/edit tag only; changing it
// never converts or validates the stored cell values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Url,
    Email,
    Image,
    Checkbox,
    Select,
    Assigned,
}

impl ColumnType {
    pub const ALL: [ColumnType; 10] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Currency,
        ColumnType::Date,
        ColumnType::Url,
        ColumnType::Email,
        ColumnType::Image,
        ColumnType::Checkbox,
        ColumnType::Select,
        ColumnType::Assigned,
    ];

    /// Serialized tag, also the CLI spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Currency => "currency",
            ColumnType::Date => "date",
            ColumnType::Url => "url",
            ColumnType::Email => "email",
            ColumnType::Image => "image",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Select => "select",
            ColumnType::Assigned => "assigned",
        }
    }

    /// Human-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Number => "Number",
            ColumnType::Currency => "Currency",
            ColumnType::Date => "Date",
            ColumnType::Url => "URL",
            ColumnType::Email => "Email",
            ColumnType::Image => "Image from URL",
            ColumnType::Checkbox => "Checkbox",
            ColumnType::Select => "Select",
            ColumnType::Assigned => "Assigned to",
        }
    }
}

impl std::str::FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown column type: {s}"))
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(id: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            column_type,
        }
    }

    /// Text column whose id is derived from the label.
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: crate::ids::sanitize_column_id(&label),
            label,
            column_type: ColumnType::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip_tags() {
        for t in ColumnType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            let back: ColumnType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
            assert_eq!(t.as_str().parse::<ColumnType>().unwrap(), t);
        }
    }

    #[test]
    fn test_column_serializes_type_field() {
        let col = Column::new("age", "Age", ColumnType::Number);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["id"], "age");
        assert_eq!(json["label"], "Age");
    }

    #[test]
    fn test_from_label() {
        let col = Column::from_label("First Name");
        assert_eq!(col.id, "first_name");
        assert_eq!(col.label, "First Name");
        assert_eq!(col.column_type, ColumnType::Text);
    }
}
