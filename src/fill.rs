//! Lookup of grid rows against the reference table.
//!
//! Each grid row is turned into a set of equality predicates over the
//! reference columns its filled cells map to. The first reference record
//! satisfying every predicate supplies the value for the target column.

use crate::error::{Error, Result};
use crate::reference::{Record, ReferenceTable};
use crate::schema::{self, Column};
use crate::settings::MatchStrategy;
use crate::state::{GridRow, GridState};

/// Outcome counts of one fill pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

impl FillReport {
    pub fn summary(&self, label: &str) -> String {
        format!(
            "{}: {} filled, {} without match, {} empty rows skipped",
            label, self.filled, self.unmatched, self.skipped
        )
    }
}

/// One predicate of a row's key set: reference column index (if the column
/// exists in the table) and the trimmed cell value.
struct Key<'a> {
    column: Option<usize>,
    value: &'a str,
}

/// Fill the grid column labelled `label` from `table`.
///
/// Rows without any filled cell are skipped; rows without a matching record
/// keep their current value. The table is only read.
pub fn fill_column(
    grid: &mut GridState,
    table: Option<&ReferenceTable>,
    label: &str,
    strategy: MatchStrategy,
) -> Result<FillReport> {
    let table = table
        .filter(|t| !t.is_empty())
        .ok_or(Error::NoDatabaseLoaded)?;
    let target = Column::from_label(label).ok_or_else(|| Error::UnmappedColumn(label.to_string()))?;
    let target_name = target.reference_name();
    let target_index = table
        .column_index(target_name)
        .ok_or_else(|| Error::MissingReferenceColumn(target_name.to_string()))?;

    log::debug!("Filling '{}' from column '{}'", label, target_name);

    let mut report = FillReport::default();
    for (row_index, row) in grid.rows_mut().iter_mut().enumerate() {
        let found = match strategy {
            MatchStrategy::AllKeys => {
                let keys = key_set(row, table);
                if keys.is_empty() {
                    report.skipped += 1;
                    continue;
                }
                log::debug!("Row {} keys: {}", row_index, describe(&keys, table));
                find_all_keys(table, &keys)
            }
            MatchStrategy::DeviceId => match device_id_key(row) {
                Some(id) => find_device_id(table, id),
                None => {
                    report.skipped += 1;
                    continue;
                }
            },
        };

        match found {
            Some(record) => {
                let value = record.trimmed(target_index);
                log::debug!("Row {} filled with {}: {}", row_index, target_name, value);
                row[target.index()] = value.to_string();
                report.filled += 1;
            }
            None => {
                log::debug!("Row {} no matching data found", row_index);
                report.unmatched += 1;
            }
        }
    }

    Ok(report)
}

/// Non-empty cells of `row`, mapped to reference columns
fn key_set<'a>(row: &'a GridRow, table: &ReferenceTable) -> Vec<Key<'a>> {
    Column::ALL
        .iter()
        .zip(row.iter())
        .filter(|(_, cell)| !cell.is_empty())
        .filter_map(|(column, cell)| {
            let name = schema::reference_column(column.label())?;
            Some(Key {
                column: table.column_index(name),
                value: cell.trim(),
            })
        })
        .collect()
}

fn find_all_keys<'t>(table: &'t ReferenceTable, keys: &[Key<'_>]) -> Option<Record<'t>> {
    table.records().find(|record| {
        keys.iter().all(|key| match key.column {
            Some(index) => record.trimmed(index) == key.value,
            None => false,
        })
    })
}

fn device_id_key(row: &GridRow) -> Option<i64> {
    row[Column::DeviceId.index()].trim().parse().ok()
}

fn find_device_id(table: &ReferenceTable, id: i64) -> Option<Record<'_>> {
    let index = table.column_index(Column::DeviceId.reference_name())?;
    table
        .records()
        .find(|record| record.trimmed(index).parse::<i64>().ok() == Some(id))
}

fn describe(keys: &[Key<'_>], table: &ReferenceTable) -> String {
    keys.iter()
        .map(|key| {
            let name = key
                .column
                .and_then(|i| table.columns().get(i))
                .map(String::as_str)
                .unwrap_or("<missing>");
            format!("{}={:?}", name, key.value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIAL: &str = "Serial Number (*)";

    fn table(columns: &[&str], records: &[&[&str]]) -> ReferenceTable {
        ReferenceTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            records
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    fn devices() -> ReferenceTable {
        table(
            &[
                "id_device_clients_devices",
                "mac_addr_clients_devices",
                "sn_clients_devices",
                "extra",
            ],
            &[
                &["7", "aa:bb", "SN1", "x"],
                &["8", "cc:dd", " SN2 ", "y"],
                &["9", "aa:bb", "SN3", "z"],
                &["007", "ee:ff", "SN4", ""],
            ],
        )
    }

    #[test]
    fn exact_match_fills_target() {
        let table = devices();
        let mut grid = GridState::new(10);
        grid.set_cell(0, 0, "7").unwrap();

        let report = fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(0, 6), "SN1");
        assert_eq!(report, FillReport { filled: 1, unmatched: 0, skipped: 9 });
    }

    #[test]
    fn no_match_leaves_cell_unchanged() {
        let table = devices();
        let mut grid = GridState::new(2);
        grid.set_cell(1, 0, "99").unwrap();
        grid.set_cell(1, 6, "keep").unwrap();

        let report = fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(1, 6), "keep");
        assert_eq!(report.unmatched, 1);
    }

    #[test]
    fn all_filled_cells_must_match() {
        let table = devices();
        let mut grid = GridState::new(3);
        // MAC alone matches rows 7 and 9; first in file order wins
        grid.set_cell(0, 4, "aa:bb").unwrap();
        // MAC plus id narrows to the third record
        grid.set_cell(1, 4, " aa:bb ").unwrap();
        grid.set_cell(1, 0, "9").unwrap();
        // contradictory keys
        grid.set_cell(2, 4, "cc:dd").unwrap();
        grid.set_cell(2, 0, "7").unwrap();

        fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(0, 6), "SN1");
        assert_eq!(grid.cell(1, 6), "SN3");
        assert_eq!(grid.cell(2, 6), "");
    }

    #[test]
    fn comparison_is_exact_after_trimming() {
        let table = devices();
        let mut grid = GridState::new(2);
        grid.set_cell(0, 0, "07").unwrap();
        grid.set_cell(1, 4, "AA:BB").unwrap();

        fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(0, 6), "");
        assert_eq!(grid.cell(1, 6), "");
    }

    #[test]
    fn filled_value_is_trimmed() {
        let table = devices();
        let mut grid = GridState::new(1);
        grid.set_cell(0, 0, "8").unwrap();

        fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(0, 6), "SN2");
    }

    #[test]
    fn key_column_absent_from_table_prevents_match() {
        let table = devices();
        let mut grid = GridState::new(1);
        grid.set_cell(0, 0, "7").unwrap();
        grid.set_cell(0, 5, "10.0.0.1").unwrap();

        let report = fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid.cell(0, 6), "");
        assert_eq!(report.unmatched, 1);
    }

    #[test]
    fn fill_never_touches_table_or_row_count() {
        let table = devices();
        let before = table.clone();
        let mut grid = GridState::new(4);
        grid.set_cell(0, 0, "7").unwrap();
        grid.set_cell(2, 6, "SN3").unwrap();

        fill_column(&mut grid, Some(&table), "MAC Address (*)", MatchStrategy::AllKeys).unwrap();

        assert_eq!(table, before);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.cell(0, 4), "aa:bb");
        assert_eq!(grid.cell(2, 4), "aa:bb");
        assert_eq!(grid.cell(1, 4), "");
        assert_eq!(grid.cell(3, 4), "");
    }

    #[test]
    fn refilling_is_idempotent() {
        let table = devices();
        let mut grid = GridState::new(3);
        grid.set_cell(0, 0, "7").unwrap();
        grid.set_cell(1, 0, "9").unwrap();
        grid.set_cell(2, 0, "404").unwrap();

        fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();
        let first = grid.clone();
        fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::AllKeys).unwrap();

        assert_eq!(grid, first);
    }

    #[test]
    fn preconditions_are_reported() {
        let mut grid = GridState::new(1);
        grid.set_cell(0, 0, "7").unwrap();

        assert!(matches!(
            fill_column(&mut grid, None, SERIAL, MatchStrategy::AllKeys),
            Err(Error::NoDatabaseLoaded)
        ));

        let empty = table(&["id_device_clients_devices"], &[]);
        assert!(matches!(
            fill_column(&mut grid, Some(&empty), SERIAL, MatchStrategy::AllKeys),
            Err(Error::NoDatabaseLoaded)
        ));

        let table = devices();
        assert!(matches!(
            fill_column(&mut grid, Some(&table), "Serial", MatchStrategy::AllKeys),
            Err(Error::UnmappedColumn(l)) if l == "Serial"
        ));
        assert!(matches!(
            fill_column(&mut grid, Some(&table), "IP Address", MatchStrategy::AllKeys),
            Err(Error::MissingReferenceColumn(c)) if c == "ip_addr_clients_devices"
        ));
        assert_eq!(grid.cell(0, 5), "");
    }

    #[test]
    fn device_id_strategy_compares_integers() {
        let table = devices();
        let mut grid = GridState::new(3);
        grid.set_cell(0, 0, " 007 ").unwrap();
        // ignored by this strategy
        grid.set_cell(0, 4, "zz:zz").unwrap();
        grid.set_cell(1, 0, "abc").unwrap();
        grid.set_cell(2, 4, "aa:bb").unwrap();

        let report = fill_column(&mut grid, Some(&table), SERIAL, MatchStrategy::DeviceId).unwrap();

        assert_eq!(grid.cell(0, 6), "SN1");
        assert_eq!(grid.cell(1, 6), "");
        assert_eq!(grid.cell(2, 6), "");
        assert_eq!(report, FillReport { filled: 1, unmatched: 0, skipped: 2 });
    }
}
