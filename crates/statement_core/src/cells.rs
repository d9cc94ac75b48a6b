use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// One sheet's cell values, row by row.
pub type Grid = Vec<Vec<Data>>;

/// Stringify a cell the way the statement exports do: empty cells become `""`,
/// integral floats print without a fraction (`5000.0` -> `"5000"`).
pub fn cell_str(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string(),
    }
}

pub fn cell_is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Cells of one row as strings. This is the `raw_data` kept on every
/// transaction and the input to row-id hashing.
pub fn row_strings(row: &[Data]) -> Vec<String> {
    row.iter().map(cell_str).collect()
}

/// Open an xlsx statement and return the first sheet as a grid.
/// Only the first sheet ever carries transaction data in the supported banks.
pub fn first_sheet_grid(path: &Path) -> Result<Grid> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("Cannot open {}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .context("Workbook contains no sheets")?;

    let range = workbook
        .worksheet_range(first)
        .with_context(|| format!("Cannot read sheet '{}'", first))?;

    Ok(range.rows().map(|row| row.to_vec()).collect())
}
