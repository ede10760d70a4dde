use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::reference::ReferenceTable;
use crate::schema::{Column, DEVICES_TABLE};

/// Render a `DELETE` statement removing every device id in `table`.
///
/// Ids are trimmed, de-duplicated in first-occurrence order and empty
/// values are dropped. The statement is only text; nothing is executed.
pub fn generate_delete_query(table: Option<&ReferenceTable>) -> Result<String> {
    let table = table
        .filter(|t| !t.is_empty())
        .ok_or(Error::NoDatabaseLoaded)?;
    let id_column = Column::DeviceId.reference_name();
    let index = table
        .column_index(id_column)
        .ok_or_else(|| Error::MissingReferenceColumn(id_column.to_string()))?;

    let mut seen = HashSet::new();
    let ids: Vec<&str> = table
        .column_values(index)
        .map(str::trim)
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect();

    Ok(format!(
        "DELETE FROM {}\nWHERE {} IN (\n{}\n);",
        DEVICES_TABLE,
        id_column,
        ids.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> ReferenceTable {
        ReferenceTable::new(
            vec!["sn_clients_devices".into(), "id_device_clients_devices".into()],
            values
                .iter()
                .map(|v| vec!["sn".to_string(), v.to_string()])
                .collect(),
        )
    }

    #[test]
    fn distinct_ids_in_first_occurrence_order() {
        let query = generate_delete_query(Some(&ids(&["3", "3", "5"]))).unwrap();
        assert_eq!(
            query,
            "DELETE FROM clients_devices\nWHERE id_device_clients_devices IN (\n3, 5\n);"
        );
    }

    #[test]
    fn blank_ids_are_dropped_and_values_trimmed() {
        let query = generate_delete_query(Some(&ids(&["12", "", " 4 ", "  ", "12 "]))).unwrap();
        assert!(query.contains("\n12, 4\n"));
    }

    #[test]
    fn requires_loaded_table_with_id_column() {
        assert!(matches!(generate_delete_query(None), Err(Error::NoDatabaseLoaded)));
        assert!(matches!(
            generate_delete_query(Some(&ids(&[]))),
            Err(Error::NoDatabaseLoaded)
        ));

        let no_ids = ReferenceTable::new(vec!["sn_clients_devices".into()], vec![vec!["a".into()]]);
        assert!(matches!(
            generate_delete_query(Some(&no_ids)),
            Err(Error::MissingReferenceColumn(_))
        ));
    }
}
