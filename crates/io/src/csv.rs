// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use tabula_engine::ids::RowIdGenerator;
use tabula_engine::worksheet::Worksheet;

use crate::table::{build_table, export_header, export_records, ImportedTable};

pub fn import(path: &Path, ids: &mut RowIdGenerator) -> Result<ImportedTable, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter, ids)
}

pub fn import_tsv(path: &Path, ids: &mut RowIdGenerator) -> Result<ImportedTable, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t', ids)
}

pub fn import_with_delimiter(
    path: &Path,
    delimiter: u8,
    ids: &mut RowIdGenerator,
) -> Result<ImportedTable, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter, ids)
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter that produces the most consistent field count (>1 field)
/// wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn import_from_string(
    content: &str,
    delimiter: u8,
    ids: &mut RowIdGenerator,
) -> Result<ImportedTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|f| f.to_string())
        .collect();
    if header.is_empty() || header.iter().all(|f| f.is_empty()) {
        return Err("CSV has no header row".to_string());
    }

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        records.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(build_table(&header, &records, ids))
}

pub fn export(sheet: &Worksheet, path: &Path) -> Result<(), String> {
    export_with_delimiter(sheet, path, b',')
}

pub fn export_tsv(sheet: &Worksheet, path: &Path) -> Result<(), String> {
    export_with_delimiter(sheet, path, b'\t')
}

pub fn export_with_delimiter(sheet: &Worksheet, path: &Path, delimiter: u8) -> Result<(), String> {
    let content = export_to_string(sheet, delimiter)?;
    std::fs::write(path, content).map_err(|e| e.to_string())
}

/// Header row of column labels, then one record per row in column order.
pub fn export_to_string(sheet: &Worksheet, delimiter: u8) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(export_header(&sheet.columns))
        .map_err(|e| e.to_string())?;
    for record in export_records(sheet) {
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
