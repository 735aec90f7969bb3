// Plain-text table rendering for `show` and friends.

use tabula_engine::worksheet::Worksheet;

/// Render the worksheet as an aligned text table, row ids in the first
/// column.
pub fn render_table(sheet: &Worksheet) -> String {
    let mut headers = vec!["id".to_string()];
    headers.extend(sheet.columns.iter().map(|c| c.label.clone()));

    let mut body: Vec<Vec<String>> = Vec::with_capacity(sheet.rows.len());
    for row in &sheet.rows {
        let mut record = vec![row.id.to_string()];
        record.extend(sheet.columns.iter().map(|c| row.display(&c.id)));
        body.push(record);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for record in &body {
        for (i, cell) in record.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_record(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_record(&mut out, &rule, &widths);
    for record in &body {
        push_record(&mut out, record, &widths);
    }
    out
}

fn push_record(out: &mut String, record: &[String], widths: &[usize]) {
    for (i, cell) in record.iter().enumerate() {
        if i > 0 {
            out.push_str(" | ");
        }
        out.push_str(cell);
        let pad = widths[i].saturating_sub(cell.chars().count());
        if i + 1 < record.len() {
            out.push_str(&" ".repeat(pad));
        }
    }
    out.push('\n');
}
