use std::path::{Path, PathBuf};

use crate::delete_query;
use crate::error::{Error, Result};
use crate::file_io;
use crate::file_state::FileState;
use crate::fill::{self, FillReport};
use crate::reference::ReferenceTable;
use crate::schema::Column;
use crate::settings::Settings;
use crate::state::GridState;

/// Everything one window works on: the grid, the loaded database and the
/// settings that shape loading, matching and export.
#[derive(Debug)]
pub struct DeviceSheet {
    grid: GridState,
    database: Option<ReferenceTable>,
    settings: Settings,
    files: FileState,
}

impl DeviceSheet {
    pub fn new(settings: Settings) -> Self {
        Self {
            grid: GridState::new(settings.initial_rows),
            database: None,
            settings,
            files: FileState::new(),
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn database(&self) -> Option<&ReferenceTable> {
        self.database.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn files(&self) -> &FileState {
        &self.files
    }

    /// Replace the database with the contents of `path`. On failure the
    /// previously loaded database stays in place.
    pub fn load_csv(&mut self, path: &Path) -> Result<&[String]> {
        let table = file_io::read_reference_csv(path, self.settings.reference_delimiter_byte())
            .inspect_err(|e| log::error!("{}", e))?;

        log::info!(
            "Loaded {} records from {}",
            table.len(),
            path.display()
        );
        log::info!("Columns in the database: {:?}", table.columns());

        self.files.set_database(path.to_path_buf());
        let table = self.database.insert(table);
        Ok(table.columns())
    }

    pub fn export_csv(&mut self, path: &Path) -> Result<()> {
        file_io::write_grid_csv(
            path,
            self.grid.export_rows(),
            self.settings.export_delimiter_byte(),
        )
        .inspect_err(|e| log::error!("{}", e))?;

        log::info!("Saved {} rows to {}", self.grid.row_count(), path.display());
        self.files.set_exported(PathBuf::from(path));
        Ok(())
    }

    pub fn fill_column(&mut self, label: &str) -> Result<FillReport> {
        let report = fill::fill_column(
            &mut self.grid,
            self.database.as_ref(),
            label,
            self.settings.match_strategy,
        )
        .inspect_err(|e| log::warn!("Fill '{}' failed: {}", label, e))?;

        if report.filled > 0 {
            self.files.mark_dirty();
        }
        log::info!("{}", report.summary(label));
        Ok(report)
    }

    /// Fill by schema position, as bound to the per-column buttons
    pub fn fill_column_at(&mut self, index: usize) -> Result<FillReport> {
        let column = Column::from_index(index).ok_or(Error::ColumnOutOfRange(index))?;
        self.fill_column(column.label())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if self.grid.cell(row, col) == value {
            return Ok(());
        }
        self.grid.set_cell(row, col, value)?;
        self.files.mark_dirty();
        Ok(())
    }

    pub fn paste_at(&mut self, row: usize, col: usize, text: &str) -> Result<usize> {
        let written = self.grid.paste_at(row, col, text)?;
        if written > 0 {
            self.files.mark_dirty();
        }
        log::debug!("Pasted {} values at row {}, column {}", written, row, col);
        Ok(written)
    }

    /// Reset the grid to the configured number of empty rows
    pub fn clear(&mut self) {
        self.grid.load(self.settings.initial_rows);
        self.files.mark_clean();
    }

    pub fn generate_delete_query(&self) -> Result<String> {
        delete_query::generate_delete_query(self.database.as_ref())
            .inspect_err(|e| log::warn!("Delete query failed: {}", e))
    }

    /// Unsaved edits that a clear would discard
    pub fn has_unsaved_edits(&self) -> bool {
        self.files.is_dirty && !self.grid.is_blank()
    }
}

impl Default for DeviceSheet {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::COLUMN_COUNT;
    use crate::settings::MatchStrategy;
    use std::fs;

    const DB: &str = "\"id_device_clients_devices\";\"sn_clients_devices\";\"mac_addr_clients_devices\"\n\
                      7;SN1;aa:bb\n\
                      8;SN2;cc:dd\n";

    fn sheet_with_db(dir: &tempfile::TempDir) -> DeviceSheet {
        let path = dir.path().join("db.csv");
        fs::write(&path, DB).unwrap();
        let mut sheet = DeviceSheet::default();
        sheet.load_csv(&path).unwrap();
        sheet
    }

    #[test]
    fn starts_with_configured_blank_rows() {
        let sheet = DeviceSheet::new(Settings {
            initial_rows: 4,
            ..Settings::default()
        });
        assert_eq!(sheet.grid().row_count(), 4);
        assert!(sheet.database().is_none());
        assert_eq!(sheet.files().database_name(), "[No Database]");
    }

    #[test]
    fn load_reports_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        fs::write(&path, DB).unwrap();
        let mut sheet = DeviceSheet::default();

        let columns = sheet.load_csv(&path).unwrap().to_vec();

        assert_eq!(
            columns,
            ["id_device_clients_devices", "sn_clients_devices", "mac_addr_clients_devices"]
        );
        assert_eq!(sheet.files().database_name(), "db.csv");
    }

    #[test]
    fn failed_load_keeps_previous_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = sheet_with_db(&dir);
        let before = sheet.database().cloned();

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "").unwrap();
        assert!(matches!(sheet.load_csv(&bad), Err(Error::Load { .. })));
        assert!(sheet.load_csv(&dir.path().join("missing.csv")).is_err());

        assert_eq!(sheet.database().cloned(), before);
        assert_eq!(sheet.files().database_name(), "db.csv");
    }

    #[test]
    fn reload_replaces_instead_of_merging() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = sheet_with_db(&dir);
        let other = dir.path().join("other.csv");
        fs::write(&other, "id_device_clients_devices\n42\n").unwrap();

        sheet.load_csv(&other).unwrap();

        assert_eq!(sheet.database().map(ReferenceTable::len), Some(1));
        assert_eq!(
            sheet.generate_delete_query().unwrap(),
            "DELETE FROM clients_devices\nWHERE id_device_clients_devices IN (\n42\n);"
        );
    }

    #[test]
    fn fill_buttons_bind_to_their_own_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = sheet_with_db(&dir);
        sheet.set_cell(0, 0, "7").unwrap();
        sheet.set_cell(1, 4, "cc:dd").unwrap();

        sheet.fill_column_at(6).unwrap();
        sheet.fill_column_at(0).unwrap();

        assert_eq!(sheet.grid().cell(0, 6), "SN1");
        assert_eq!(sheet.grid().cell(1, 6), "SN2");
        assert_eq!(sheet.grid().cell(1, 0), "8");
        assert!(matches!(
            sheet.fill_column_at(COLUMN_COUNT),
            Err(Error::ColumnOutOfRange(8))
        ));
    }

    #[test]
    fn fill_requires_database() {
        let mut sheet = DeviceSheet::default();
        sheet.set_cell(0, 0, "7").unwrap();
        assert!(matches!(
            sheet.fill_column("Serial Number (*)"),
            Err(Error::NoDatabaseLoaded)
        ));
        assert!(matches!(sheet.generate_delete_query(), Err(Error::NoDatabaseLoaded)));
    }

    #[test]
    fn export_then_load_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = sheet_with_db(&dir);
        sheet.paste_at(0, 0, "7\n8\n").unwrap();
        sheet.fill_column("Serial Number (*)").unwrap();
        sheet.fill_column("MAC Address (*)").unwrap();
        sheet.set_cell(2, 5, "10.0.0.3").unwrap();
        assert!(sheet.files().is_dirty);

        let out = dir.path().join("out.csv");
        sheet.export_csv(&out).unwrap();
        assert!(!sheet.files().is_dirty);
        assert_eq!(sheet.files().export_name().as_deref(), Some("out.csv"));

        let table = file_io::read_reference_csv(&out, b',').unwrap();
        assert_eq!(table.columns(), crate::schema::labels());
        assert_eq!(table.len(), sheet.grid().row_count());
        for (record, row) in table.records().zip(sheet.grid().export_rows()) {
            for col in 0..COLUMN_COUNT {
                assert_eq!(record.get(col), row[col]);
            }
        }
    }

    #[test]
    fn failed_export_keeps_dirty_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = DeviceSheet::default();
        sheet.set_cell(0, 0, "1").unwrap();

        let err = sheet
            .export_csv(&dir.path().join("no").join("such.csv"))
            .unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert!(sheet.files().is_dirty);
        assert!(sheet.files().export_name().is_none());
    }

    #[test]
    fn clear_resets_rows_but_keeps_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = sheet_with_db(&dir);
        sheet.paste_at(8, 1, "a\nb\nc\nd").unwrap();
        assert_eq!(sheet.grid().row_count(), 12);
        assert!(sheet.has_unsaved_edits());

        sheet.clear();

        assert_eq!(sheet.grid().row_count(), 10);
        assert!(sheet.grid().is_blank());
        assert!(!sheet.has_unsaved_edits());
        assert!(sheet.database().is_some());
    }

    #[test]
    fn device_id_strategy_comes_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        fs::write(&path, DB).unwrap();
        let mut sheet = DeviceSheet::new(Settings {
            match_strategy: MatchStrategy::DeviceId,
            ..Settings::default()
        });
        sheet.load_csv(&path).unwrap();
        sheet.set_cell(0, 0, "0008").unwrap();
        sheet.set_cell(0, 4, "wrong").unwrap();

        sheet.fill_column("Serial Number (*)").unwrap();

        assert_eq!(sheet.grid().cell(0, 6), "SN2");
    }

    #[test]
    fn configured_delimiters_drive_load_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db.tsv");
        fs::write(
            &db,
            "\"id_device_clients_devices\"\tsn_clients_devices\n7\tSN;1\n8\tSN2\n",
        )
        .unwrap();
        let mut sheet = DeviceSheet::new(Settings {
            initial_rows: 2,
            reference_delimiter: '\t',
            export_delimiter: ';',
            ..Settings::default()
        });

        let columns = sheet.load_csv(&db).unwrap().to_vec();
        assert_eq!(columns, ["id_device_clients_devices", "sn_clients_devices"]);

        sheet.set_cell(0, 0, "7").unwrap();
        sheet.fill_column("Serial Number (*)").unwrap();
        let out = dir.path().join("out.csv");
        sheet.export_csv(&out).unwrap();

        let expected = format!(
            "{}\n7;;;;;;\"SN;1\";\n;;;;;;;\n",
            crate::schema::labels().join(";")
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), expected);
    }
}
