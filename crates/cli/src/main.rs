// Tabula CLI - headless worksheet operations
//
// State model: the full worksheet collection is loaded at startup and
// written back after every mutating command. A command that fails leaves
// the saved state untouched.

mod exit_codes;
mod render;
mod session;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tabula_config::ai::EnrichDiagnostics;
use tabula_config::Settings;
use tabula_engine::cell::CellValue;
use tabula_engine::collection::WorksheetCollection;
use tabula_engine::column::ColumnType;
use tabula_engine::ids::{sanitize_column_id, RowIdGenerator};
use tabula_engine::store::{ColumnPosition, WorksheetStore};
use tabula_enrich::{apply_enrichment, enrichable_rows, EnrichClient, EnrichRequest};

use exit_codes::{
    EXIT_ENRICH, EXIT_ERROR, EXIT_FORMAT, EXIT_IO, EXIT_MISSING_KEY, EXIT_SUCCESS, EXIT_USAGE,
};
use session::{load_collection, JsonFileStorage, WorksheetStorage};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Worksheets: typed columns, CSV/XLSX import/export, LLM column enrichment")]
#[command(version)]
struct Cli {
    /// Worksheet state file (default: per-user data directory)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Worksheet index to operate on (default: 0)
    #[arg(long, global = true)]
    sheet: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List worksheets
    List,

    /// Add a worksheet from the default template
    New,

    /// Remove the worksheet at an index (the last one cannot be removed)
    Remove { index: usize },

    /// Rename the worksheet at an index
    Rename { index: usize, name: String },

    /// Print a worksheet as a table
    Show,

    /// Import a CSV/TSV/XLSX file, replacing the worksheet's table
    #[command(after_help = "\
Examples:
  tabula import people.csv
  tabula import people.tsv --sheet 1
  tabula import survey.xlsx
  tabula import exported.txt --delimiter ';'")]
    Import {
        file: PathBuf,

        /// Delimiter for delimited text (sniffed when omitted)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Export a worksheet to CSV/TSV/XLSX (format from the extension)
    #[command(after_help = "\
Examples:
  tabula export people.csv
  tabula export people.xlsx --sheet 2")]
    Export {
        file: PathBuf,

        /// Delimiter for delimited text (default: comma)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Column operations
    #[command(subcommand)]
    Col(ColCommands),

    /// Row operations
    #[command(subcommand)]
    Row(RowCommands),

    /// Set one cell: row id, column id, value
    Set {
        row: i64,
        column: String,
        value: String,
    },

    /// Fill a column from a prompt using the configured provider chain
    #[command(after_help = "\
Examples:
  tabula enrich --column motto --prompt 'a short motto for each person'
  tabula enrich --column price --prompt 'typical price in EUR' --context name,city

Rows with no data in any context column are skipped and left unchanged.")]
    Enrich {
        /// Target column id
        #[arg(long)]
        column: String,

        /// What the model should produce for each row
        #[arg(long)]
        prompt: String,

        /// Context column ids (comma separated; default: all other columns)
        #[arg(long, value_delimiter = ',')]
        context: Vec<String>,
    },

    /// Check enrichment configuration
    Doctor,
}

#[derive(Subcommand)]
enum ColCommands {
    /// List column ids, labels and types
    Ls,

    /// Add a column (id derived from the label)
    Add {
        label: String,

        #[arg(long, default_value = "text")]
        r#type: ColumnType,

        /// end, left or right (left/right relative to --anchor)
        #[arg(long, default_value = "end")]
        position: ColumnPosition,

        /// Column id to insert next to
        #[arg(long)]
        anchor: Option<String>,
    },

    /// Duplicate a column, values included
    Dup { column: String },

    /// Remove a column and its cells
    Rm { column: String },

    /// Rename a column (id stays)
    Rename { column: String, label: String },

    /// Change a column's display type (cell values are left as-is)
    Retype { column: String, r#type: ColumnType },
}

#[derive(Subcommand)]
enum RowCommands {
    /// Append an empty row
    Add,

    /// Remove a row by id
    Rm { id: i64 },
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
}

fn fail(code: u8, message: impl Into<String>) -> CliError {
    CliError {
        code,
        message: message.into(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Catch anything unexpected at the boundary; a panic must not take the
    // saved state down with it (writes are whole-file and happen last).
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(cli)));
    match outcome {
        Ok(Ok(())) => ExitCode::from(EXIT_SUCCESS),
        Ok(Err(e)) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(e.code)
        }
        Err(_) => {
            eprintln!("error: internal error");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let storage = match cli.state {
        Some(path) => JsonFileStorage::new(path),
        None => JsonFileStorage::at_default_path(),
    };
    let mut collection = load_collection(&storage);
    let sheet_idx = cli.sheet.unwrap_or(collection.active_index());

    match cli.command {
        Commands::List => {
            for (i, ws) in collection.sheets().iter().enumerate() {
                println!(
                    "{i}: {}  ({} columns, {} rows)",
                    ws.name,
                    ws.columns.len(),
                    ws.rows.len()
                );
            }
            Ok(())
        }

        Commands::New => {
            let name = collection.add_worksheet().name.clone();
            save(&storage, &collection)?;
            println!("Added worksheet '{name}'");
            Ok(())
        }

        Commands::Remove { index } => {
            collection
                .remove_worksheet(index)
                .map_err(|e| fail(EXIT_USAGE, e))?;
            save(&storage, &collection)?;
            println!("Removed worksheet {index}");
            Ok(())
        }

        Commands::Rename { index, name } => {
            collection
                .rename_worksheet(index, &name)
                .map_err(|e| fail(EXIT_USAGE, e))?;
            save(&storage, &collection)?;
            println!("Renamed worksheet {index} to '{}'", name.trim());
            Ok(())
        }

        Commands::Show => {
            let sheet = checked_sheet(&collection, sheet_idx)?;
            println!("{} (sheet {})", sheet.name, sheet_idx);
            print!("{}", render::render_table(sheet));
            Ok(())
        }

        Commands::Import { file, delimiter } => {
            checked_sheet(&collection, sheet_idx)?;
            if !file.exists() {
                return Err(fail(EXIT_IO, format!("no such file: {}", file.display())));
            }
            let mut ids = RowIdGenerator::new();
            let table = match detect_format(&file)? {
                FileFormat::Csv => match delimiter {
                    Some(d) => tabula_io::csv::import_with_delimiter(&file, d as u8, &mut ids),
                    None => tabula_io::csv::import(&file, &mut ids),
                },
                FileFormat::Tsv => tabula_io::csv::import_tsv(&file, &mut ids),
                FileFormat::Xlsx => tabula_io::xlsx::import(&file, &mut ids),
            }
            .map_err(|e| fail(EXIT_FORMAT, e))?;

            let (cols, rows) = (table.columns.len(), table.rows.len());
            edit_sheet(&mut collection, sheet_idx, |store| {
                store.update_worksheet(table.columns, table.rows)
            })?;
            save(&storage, &collection)?;
            println!("Imported {cols} columns, {rows} rows from {}", file.display());
            Ok(())
        }

        Commands::Export { file, delimiter } => {
            let sheet = checked_sheet(&collection, sheet_idx)?;
            match detect_format(&file)? {
                FileFormat::Csv => match delimiter {
                    Some(d) => tabula_io::csv::export_with_delimiter(sheet, &file, d as u8),
                    None => tabula_io::csv::export(sheet, &file),
                },
                FileFormat::Tsv => tabula_io::csv::export_tsv(sheet, &file),
                FileFormat::Xlsx => tabula_io::xlsx::export(sheet, &file),
            }
            .map_err(|e| fail(EXIT_IO, e))?;
            println!(
                "Exported {} rows to {}",
                sheet.rows.len(),
                file.display()
            );
            Ok(())
        }

        Commands::Col(cmd) => run_col(cmd, &storage, &mut collection, sheet_idx),
        Commands::Row(cmd) => run_row(cmd, &storage, &mut collection, sheet_idx),

        Commands::Set { row, column, value } => {
            let sheet = checked_sheet(&collection, sheet_idx)?;
            let col = sheet
                .column(&column)
                .ok_or_else(|| fail(EXIT_USAGE, format!("no column '{column}'")))?;
            if sheet.row(row).is_none() {
                return Err(fail(EXIT_USAGE, format!("no row {row}")));
            }
            let cell = parse_cell_value(&value, col.column_type);
            edit_sheet(&mut collection, sheet_idx, |store| {
                store.update_cell(row, &column, cell)
            })?;
            save(&storage, &collection)?;
            println!("Set {row}.{column}");
            Ok(())
        }

        Commands::Enrich {
            column,
            prompt,
            context,
        } => run_enrich(&storage, &mut collection, sheet_idx, column, prompt, context),

        Commands::Doctor => {
            let settings = Settings::load();
            let diagnostics = EnrichDiagnostics::from_settings(&settings.enrich);
            print!("{diagnostics}");
            println!("Settings file:      {}", Settings::path().display());
            println!("Worksheet state:    {}", storage.path().display());
            if !diagnostics.any_ready() {
                println!();
                println!("No provider is ready; `tabula enrich` will refuse to run.");
            }
            Ok(())
        }
    }
}

fn run_col(
    cmd: ColCommands,
    storage: &JsonFileStorage,
    collection: &mut WorksheetCollection,
    sheet_idx: usize,
) -> Result<(), CliError> {
    match cmd {
        ColCommands::Ls => {
            let sheet = checked_sheet(collection, sheet_idx)?;
            for col in &sheet.columns {
                println!("{}  {}  ({})", col.id, col.label, col.column_type);
            }
            Ok(())
        }

        ColCommands::Add {
            label,
            r#type,
            position,
            anchor,
        } => {
            let sheet = checked_sheet(collection, sheet_idx)?;
            if label.trim().is_empty() {
                return Err(fail(EXIT_USAGE, "column label must not be blank"));
            }
            let id = sanitize_column_id(&label);
            if sheet.column(&id).is_some() {
                return Err(fail(EXIT_USAGE, format!("column id '{id}' already exists")));
            }
            if let Some(anchor) = &anchor {
                if sheet.column(anchor).is_none() {
                    return Err(fail(EXIT_USAGE, format!("no column '{anchor}'")));
                }
            }
            edit_sheet(collection, sheet_idx, |store| {
                store.add_column(position, anchor.as_deref(), &label, r#type)
            })?;
            save(storage, collection)?;
            println!("Added column '{label}' (id {id})");
            Ok(())
        }

        ColCommands::Dup { column } => {
            require_column(collection, sheet_idx, &column)?;
            edit_sheet(collection, sheet_idx, |store| {
                store.add_column(ColumnPosition::Right, Some(&column), "", ColumnType::Text)
            })?;
            save(storage, collection)?;
            println!("Duplicated column '{column}'");
            Ok(())
        }

        ColCommands::Rm { column } => {
            require_column(collection, sheet_idx, &column)?;
            edit_sheet(collection, sheet_idx, |store| store.remove_column(&column))?;
            save(storage, collection)?;
            println!("Removed column '{column}'");
            Ok(())
        }

        ColCommands::Rename { column, label } => {
            require_column(collection, sheet_idx, &column)?;
            edit_sheet(collection, sheet_idx, |store| {
                store.rename_column(&column, &label)
            })?;
            save(storage, collection)?;
            println!("Renamed column '{column}'");
            Ok(())
        }

        ColCommands::Retype { column, r#type } => {
            require_column(collection, sheet_idx, &column)?;
            edit_sheet(collection, sheet_idx, |store| {
                store.change_column_type(&column, r#type)
            })?;
            save(storage, collection)?;
            println!("Column '{column}' is now {}", r#type);
            Ok(())
        }
    }
}

fn run_row(
    cmd: RowCommands,
    storage: &JsonFileStorage,
    collection: &mut WorksheetCollection,
    sheet_idx: usize,
) -> Result<(), CliError> {
    match cmd {
        RowCommands::Add => {
            checked_sheet(collection, sheet_idx)?;
            let id = edit_sheet(collection, sheet_idx, |store| store.add_row())?;
            save(storage, collection)?;
            println!("Added row {id}");
            Ok(())
        }

        RowCommands::Rm { id } => {
            let sheet = checked_sheet(collection, sheet_idx)?;
            if sheet.row(id).is_none() {
                return Err(fail(EXIT_USAGE, format!("no row {id}")));
            }
            edit_sheet(collection, sheet_idx, |store| store.remove_row(id))?;
            save(storage, collection)?;
            println!("Removed row {id}");
            Ok(())
        }
    }
}

fn run_enrich(
    storage: &JsonFileStorage,
    collection: &mut WorksheetCollection,
    sheet_idx: usize,
    column: String,
    prompt: String,
    context: Vec<String>,
) -> Result<(), CliError> {
    let sheet = checked_sheet(collection, sheet_idx)?;
    if sheet.column(&column).is_none() {
        return Err(fail(EXIT_USAGE, format!("no column '{column}'")));
    }

    // Default context: every column except the target
    let context_ids: Vec<String> = if context.is_empty() {
        sheet
            .columns
            .iter()
            .filter(|c| c.id != column)
            .map(|c| c.id.clone())
            .collect()
    } else {
        for id in &context {
            if sheet.column(id).is_none() {
                return Err(fail(EXIT_USAGE, format!("no context column '{id}'")));
            }
        }
        context
    };
    if context_ids.is_empty() {
        return Err(fail(EXIT_ENRICH, "no context columns to enrich from"));
    }

    let filtered = enrichable_rows(&sheet.rows, &context_ids);
    let filtered_ids: Vec<i64> = filtered.iter().map(|r| r.id).collect();

    let selected_columns = sheet
        .columns
        .iter()
        .filter(|c| context_ids.contains(&c.id))
        .cloned()
        .collect();

    let request = EnrichRequest {
        prompt,
        rows: filtered,
        columns: selected_columns,
        target_column_id: column.clone(),
    };

    let settings = Settings::load();
    let client = EnrichClient::from_settings(&settings.enrich)
        .map_err(|e| fail(EXIT_MISSING_KEY, e))?;

    let values = client
        .enrich(&request)
        .map_err(|e| fail(EXIT_ENRICH, e.to_string()))?;

    let rows = apply_enrichment(sheet, &column, &filtered_ids, &values);
    let columns = sheet.columns.clone();
    edit_sheet(collection, sheet_idx, |store| {
        store.update_worksheet(columns, rows)
    })?;
    save(storage, collection)?;
    println!(
        "Enriched {} rows into column '{column}'",
        filtered_ids.len()
    );
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Tsv,
    Xlsx,
}

fn detect_format(path: &Path) -> Result<FileFormat, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => Ok(FileFormat::Csv),
        "tsv" => Ok(FileFormat::Tsv),
        "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
        other => Err(fail(
            EXIT_USAGE,
            format!("unsupported file type '.{other}' (use .csv, .tsv or .xlsx)"),
        )),
    }
}

fn checked_sheet<'a>(
    collection: &'a WorksheetCollection,
    index: usize,
) -> Result<&'a tabula_engine::worksheet::Worksheet, CliError> {
    collection.get(index).ok_or_else(|| {
        fail(
            EXIT_USAGE,
            format!("no worksheet at index {index} ({} sheets)", collection.len()),
        )
    })
}

fn require_column(
    collection: &WorksheetCollection,
    sheet_idx: usize,
    column: &str,
) -> Result<(), CliError> {
    let sheet = checked_sheet(collection, sheet_idx)?;
    if sheet.column(column).is_none() {
        return Err(fail(EXIT_USAGE, format!("no column '{column}'")));
    }
    Ok(())
}

/// Run one store operation against a cloned sheet, then swap the result
/// back into the collection.
fn edit_sheet<F, R>(
    collection: &mut WorksheetCollection,
    index: usize,
    op: F,
) -> Result<R, CliError>
where
    F: FnOnce(&mut WorksheetStore) -> R,
{
    let sheet = checked_sheet(collection, index)?.clone();
    let mut store = WorksheetStore::new(sheet);
    let result = op(&mut store);
    collection
        .replace_worksheet(index, store.into_sheet())
        .map_err(|e| fail(EXIT_USAGE, e))?;
    Ok(result)
}

fn save(storage: &JsonFileStorage, collection: &WorksheetCollection) -> Result<(), CliError> {
    storage
        .save(collection.sheets())
        .map_err(|e| fail(EXIT_IO, e))
}

/// Checkbox columns take true/false as booleans; everything else is text.
fn parse_cell_value(value: &str, column_type: ColumnType) -> CellValue {
    if column_type == ColumnType::Checkbox {
        match value {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }
    }
    CellValue::Text(value.to_string())
}
