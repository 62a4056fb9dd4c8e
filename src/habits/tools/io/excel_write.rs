use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::io::{discard_partial, partial_path};
use crate::habits::tools::model::{Cell, WorkbookData};

/// Writes the provided workbook data to the given path, replacing any existing
/// file once the new one is complete.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let label = path.display().to_string();
    let publish_error = |error: rust_xlsxwriter::XlsxError| SyncError::publish(&label, error);

    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name).map_err(publish_error)?;

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_idx = row_idx as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_idx = col_idx as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(value) => {
                        worksheet
                            .write_string(row_idx, col_idx, value)
                            .map_err(publish_error)?;
                    }
                    Cell::Number(value) => {
                        worksheet
                            .write_number(row_idx, col_idx, *value)
                            .map_err(publish_error)?;
                    }
                    Cell::Bool(value) => {
                        worksheet
                            .write_boolean(row_idx, col_idx, *value)
                            .map_err(publish_error)?;
                    }
                }
            }
        }
    }

    let partial = partial_path(path);
    let written = workbook_writer
        .save(&partial)
        .map_err(publish_error)
        .and_then(|()| fs::rename(&partial, path).map_err(|source| SyncError::io_at(path, source)));
    if written.is_err() {
        discard_partial(&partial);
    }
    written
}
