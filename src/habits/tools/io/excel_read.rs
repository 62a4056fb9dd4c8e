use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::model::{Cell, SheetTable, WorkbookData};

/// Reads every sheet of an `.xlsx` workbook as plain cell values, keeping the
/// tab order.
pub fn read_workbook(path: &Path) -> Result<WorkbookData> {
    let label = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|error| SyncError::publish(&label, error))?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names().to_owned() {
        let range = read_sheet(&mut workbook, &sheet_name, &label)?;
        tables.push(SheetTable {
            rows: range_to_rows(&range),
            sheet_name,
        });
    }

    Ok(WorkbookData { tables })
}

fn read_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
    label: &str,
) -> Result<Range<DataType>> {
    workbook
        .worksheet_range(name)
        .ok_or_else(|| SyncError::publish(label, format!("missing sheet '{name}'")))?
        .map_err(|error| SyncError::publish(label, error))
}

/// Expands a range into rows anchored at `A1`. Calamine ranges start at the
/// first used cell, so leading empty rows and columns are padded back in.
fn range_to_rows(range: &Range<DataType>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells: Vec<Cell> = (0..start_col).map(|_| Cell::Empty).collect();
        cells.extend(row.iter().map(cell_value));
        while matches!(cells.last(), Some(Cell::Empty)) {
            cells.pop();
        }
        rows.push(cells);
    }
    while matches!(rows.last(), Some(last) if last.is_empty()) {
        rows.pop();
    }
    rows
}

fn cell_value(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}
