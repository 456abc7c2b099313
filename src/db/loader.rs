//! Nutrition reference loader
//!
//! Reads the reference file into a `NutritionTable`. Three on-disk formats are
//! understood: an Excel workbook (first sheet, header in the first row), a
//! SQLite database holding one table of rows, and a JSON array of row
//! objects. All are reduced to a `RawSheet` and normalized the same way:
//! column names are trimmed, the food-name column is required, nutrient cells
//! are coerced to numbers with anything unusable stored as 0.
//!
//! Exported workbooks carry a units row right under the header, so one
//! leading data row is skipped for them unless told otherwise.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::connection;
use super::NutritionTable;
use crate::models::{Nutrient, NutrientValues, NutritionRecord};

/// Accepted headers for the food-name column
pub const FOOD_NAME_COLUMNS: &[&str] = &["식품명", "food_name", "name"];

/// Accepted headers for the food-code column
pub const FOOD_CODE_COLUMNS: &[&str] = &["식품코드", "food_code"];

/// Reference loading error types
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Nutrition reference file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid JSON reference data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported reference file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Table '{0}' not found in reference database")]
    MissingTable(String),

    #[error("Required column '{0}' not found in reference data")]
    MissingColumn(&'static str),
}

/// Where to find rows inside the reference file
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Table name for SQLite sources
    pub table: String,
    /// Leading data rows to drop; `None` uses the format default
    pub skip_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            table: "nutrition".to_string(),
            skip_rows: None,
        }
    }
}

/// Units rows skipped by default in spreadsheet sources
pub const SPREADSHEET_UNIT_ROWS: usize = 1;

/// One untyped cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

/// Rows as read from the source, before normalization
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Load the reference table from `path`
pub fn load_table<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<NutritionTable, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let (sheet, default_skip) = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xls") => (read_workbook(path)?, SPREADSHEET_UNIT_ROWS),
        Some("db") | Some("sqlite") | Some("sqlite3") => {
            let conn = connection::open_read_only(path)?;
            (connection::read_sheet(&conn, &options.table)?, 0)
        }
        Some("json") => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            (sheet_from_json(&text)?, 0)
        }
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    let skip_rows = options.skip_rows.unwrap_or(default_skip);
    let table = build_table(sheet, skip_rows)?.with_source(path);
    info!(
        path = %path.display(),
        records = table.len(),
        "Loaded nutrition reference"
    );
    Ok(table)
}

/// Read the first worksheet; its first row is the header
pub fn read_workbook(path: &Path) -> Result<RawSheet, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| match Cell::from(cell) {
                Cell::Empty => String::new(),
                Cell::Number(n) => n.to_string(),
                Cell::Text(s) => s,
            })
            .collect(),
        None => Vec::new(),
    };
    let rows = rows.map(|row| row.iter().map(Cell::from).collect()).collect();

    Ok(RawSheet { columns, rows })
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Parse a JSON array of row objects into a sheet
///
/// Columns are the union of keys across all rows.
pub fn sheet_from_json(text: &str) -> Result<RawSheet, LoadError> {
    let objects: Vec<serde_json::Map<String, Value>> = serde_json::from_str(text)?;

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|c| object.get(c).map(Cell::from).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(RawSheet { columns, rows })
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            _ => Cell::Empty,
        }
    }
}

/// Normalize a raw sheet into a table
pub fn build_table(sheet: RawSheet, skip_rows: usize) -> Result<NutritionTable, LoadError> {
    let columns: Vec<String> = sheet.columns.iter().map(|c| c.trim().to_string()).collect();
    let position = |names: &[&str]| columns.iter().position(|c| names.contains(&c.as_str()));

    let name_col =
        position(FOOD_NAME_COLUMNS).ok_or(LoadError::MissingColumn(FOOD_NAME_COLUMNS[0]))?;
    let code_col = position(FOOD_CODE_COLUMNS);

    let mut nutrient_cols = Vec::with_capacity(Nutrient::COUNT);
    for nutrient in Nutrient::ALL {
        match columns.iter().position(|c| Nutrient::from_column(c) == Some(nutrient)) {
            Some(col) => nutrient_cols.push((nutrient, col)),
            None => warn!(
                column = nutrient.column_header(),
                "Nutrient column missing from reference data; loading as zeros"
            ),
        }
    }

    let mut records = Vec::with_capacity(sheet.rows.len().saturating_sub(skip_rows));
    let mut unnamed = 0usize;

    for row in sheet.rows.into_iter().skip(skip_rows) {
        let Some(food_name) = row.get(name_col).and_then(cell_text) else {
            unnamed += 1;
            continue;
        };

        let food_code = code_col.and_then(|col| row.get(col)).and_then(cell_text);

        let mut nutrients = NutrientValues::default();
        for &(nutrient, col) in &nutrient_cols {
            nutrients.set(nutrient, row.get(col).map(cell_number).unwrap_or(0.0));
        }

        records.push(NutritionRecord::new(food_name, food_code, nutrients));
    }

    if unnamed > 0 {
        warn!(rows = unnamed, "Skipped reference rows without a food name");
    }
    if records.is_empty() {
        warn!("Nutrition reference contains no usable rows");
    }

    Ok(NutritionTable::new(records))
}

/// Trimmed, non-empty text form of a cell
fn cell_text(cell: &Cell) -> Option<String> {
    let text = match cell {
        Cell::Empty => return None,
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => s.trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Numeric value of a cell; unparseable text counts as 0
fn cell_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
    }
}
