use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, LoadFailure, Result};
use crate::reference::ReferenceTable;
use crate::schema;
use crate::state::GridRow;

/// Read a delimited reference file. Every field is text; header cells lose
/// their quote characters and surrounding whitespace.
pub fn read_reference_csv(path: &Path, delimiter: u8) -> Result<ReferenceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::load(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::load(path, e))?
        .iter()
        .map(clean_header)
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(Error::load(path, LoadFailure::NoHeaders));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::load(path, e))?;
        if record.len() > columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(Error::load(
                path,
                LoadFailure::TooManyFields {
                    line,
                    found: record.len(),
                    expected: columns.len(),
                },
            ));
        }
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(ReferenceTable::new(columns, records))
}

fn clean_header(raw: &str) -> String {
    raw.replace('"', "")
        .trim_start_matches('\u{feff}')
        .trim()
        .to_string()
}

/// Write the grid with the display labels as header row. The data goes to a
/// sibling temp file first so a failed write never truncates `path`.
pub fn write_grid_csv(path: &Path, rows: &[GridRow], delimiter: u8) -> Result<()> {
    let tmp_path = temp_sibling(path);

    let written = write_rows(&tmp_path, rows, delimiter).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::write(path, e));
    }
    Ok(())
}

fn write_rows(path: &Path, rows: &[GridRow], delimiter: u8) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(schema::labels())?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("export.csv");
    path.with_file_name(format!(".{}.tmp", file_name))
}
