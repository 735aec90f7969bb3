// Context extraction for enrichment prompts.
//
// The context document is one JSON object per row, keyed by column *label*
// (what the model should reason about), with the target column left out.

use serde_json::{Map, Value};

use tabula_engine::cell::CellValue;
use tabula_engine::column::Column;
use tabula_engine::row::Row;

/// Rows worth sending: those with data in at least one of the selected
/// context columns. Rows that are blank across all of them stay behind and
/// are never touched by result application.
pub fn enrichable_rows(rows: &[Row], context_column_ids: &[String]) -> Vec<Row> {
    rows.iter()
        .filter(|row| !row.is_blank_in(context_column_ids))
        .cloned()
        .collect()
}

/// Per-row label→value objects, excluding the target column.
pub fn build_context(
    rows: &[Row],
    columns: &[Column],
    target_column_id: &str,
) -> Vec<Map<String, Value>> {
    rows.iter()
        .map(|row| {
            let mut obj = Map::new();
            for col in columns {
                if col.id == target_column_id {
                    continue;
                }
                let value = match row.get(&col.id) {
                    Some(CellValue::Bool(b)) => Value::Bool(*b),
                    Some(CellValue::Text(t)) => Value::String(t.clone()),
                    None => Value::String(String::new()),
                };
                obj.insert(col.label.clone(), value);
            }
            obj
        })
        .collect()
}

/// The instruction and data strings sent to a provider. Single-message
/// providers receive the two concatenated.
pub fn compose_prompts(
    prompt: &str,
    rows: &[Row],
    columns: &[Column],
    target_column_id: &str,
) -> (String, String) {
    // The request carries only the selected context columns, so the target
    // may not be among them; fall back to its id as the display name.
    let target_label = columns
        .iter()
        .find(|c| c.id == target_column_id)
        .map(|c| c.label.as_str())
        .unwrap_or(target_column_id);

    let system_prompt = format!(
        "You are a helpful assistant. For each row, generate a value for the column \
         '{target_label}' based on the following prompt: \"{prompt}\". Return ONLY a JSON \
         array of values, in the same order as the input. Be concise with your response."
    );

    let context = build_context(rows, columns, target_column_id);
    let context_json =
        serde_json::to_string_pretty(&context).unwrap_or_else(|_| "[]".to_string());
    let user_prompt = format!(
        "Input data (array of objects):\n{context_json}\n\nRespond with a JSON array of \
         values for the new column."
    );

    (system_prompt, user_prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_engine::column::ColumnType;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name", ColumnType::Text),
            Column::new("city", "City", ColumnType::Text),
            Column::new("motto", "Motto", ColumnType::Text),
        ]
    }

    fn row(id: i64, name: &str, city: &str) -> Row {
        let mut r = Row::empty(id, &columns());
        r.set("name", name);
        r.set("city", city);
        r
    }

    #[test]
    fn test_enrichable_rows_filters_blank() {
        let rows = vec![row(1, "Alice", "Paris"), row(2, "", ""), row(3, "  ", "Rome")];
        let ctx = vec!["name".to_string(), "city".to_string()];
        let kept = enrichable_rows(&rows, &ctx);
        let ids: Vec<i64> = kept.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn test_enrichable_rows_empty_when_all_blank() {
        let rows = vec![row(1, "", ""), row(2, "", "")];
        let ctx = vec!["name".to_string()];
        assert!(enrichable_rows(&rows, &ctx).is_empty());
    }

    #[test]
    fn test_context_excludes_target_and_keys_by_label() {
        let rows = vec![row(1, "Alice", "Paris")];
        let ctx = build_context(&rows, &columns(), "motto");
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx[0].get("Name"), Some(&Value::String("Alice".into())));
        assert_eq!(ctx[0].get("City"), Some(&Value::String("Paris".into())));
        assert!(!ctx[0].contains_key("Motto"));
    }

    #[test]
    fn test_prompts_name_target_and_embed_user_prompt() {
        let rows = vec![row(1, "Alice", "Paris")];
        let (system, user) =
            compose_prompts("best local dish", &rows, &columns(), "motto");
        assert!(system.contains("'Motto'"));
        assert!(system.contains("\"best local dish\""));
        assert!(system.contains("ONLY a JSON array"));
        assert!(user.contains("\"Name\": \"Alice\""));
        assert!(user.starts_with("Input data (array of objects):"));
    }

    #[test]
    fn test_prompts_fall_back_to_target_id() {
        let rows = vec![row(1, "Alice", "Paris")];
        // Target column not among the selected context columns
        let cols = columns();
        let (system, _) = compose_prompts("p", &rows, &cols[..2], "motto");
        assert!(system.contains("'motto'"));
    }
}
