/// Number of columns in the device grid
pub const COLUMN_COUNT: usize = 8;

/// Reference table and column targeted by the generated delete query
pub const DEVICES_TABLE: &str = "clients_devices";

/// One column of the device grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    DeviceId,
    DeviceModelId,
    ContainerId,
    PlaceInContainer,
    MacAddress,
    IpAddress,
    SerialNumber,
    PoolProfileId,
}

impl Column {
    /// All columns in display order
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::DeviceId,
        Column::DeviceModelId,
        Column::ContainerId,
        Column::PlaceInContainer,
        Column::MacAddress,
        Column::IpAddress,
        Column::SerialNumber,
        Column::PoolProfileId,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Header shown in the grid and written to exported files
    pub fn label(self) -> &'static str {
        COLUMN_MAPPING[self.index()].0
    }

    /// Column name in the reference database
    pub fn reference_name(self) -> &'static str {
        COLUMN_MAPPING[self.index()].1
    }

    pub fn from_label(label: &str) -> Option<Self> {
        COLUMN_MAPPING
            .iter()
            .position(|(l, _)| *l == label)
            .and_then(Self::from_index)
    }
}

/// Display label -> reference column, indexed by `Column`
const COLUMN_MAPPING: [(&str, &str); COLUMN_COUNT] = [
    ("Device ID", "id_device_clients_devices"),
    ("Device Model ID (*)", "id_directory_miners_clients_devices"),
    ("Container ID", "id_containers_clients_devices"),
    ("Place in Container", "id_place_clients_devices"),
    ("MAC Address (*)", "mac_addr_clients_devices"),
    ("IP Address", "ip_addr_clients_devices"),
    ("Serial Number (*)", "sn_clients_devices"),
    ("Pool Profile ID", "id_clients_pool_profile_clients_devices"),
];

/// Map a grid header label to its reference column name.
pub fn reference_column(label: &str) -> Option<&'static str> {
    Column::from_label(label).map(Column::reference_name)
}

/// Display labels in schema order
pub fn labels() -> [&'static str; COLUMN_COUNT] {
    Column::ALL.map(Column::label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_column_has_a_distinct_reference_name() {
        let mut names: Vec<_> = Column::ALL.iter().map(|c| c.reference_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), COLUMN_COUNT);
    }

    #[test]
    fn labels_round_trip_through_lookup() {
        for column in Column::ALL {
            assert_eq!(Column::from_label(column.label()), Some(column));
            assert_eq!(Column::from_index(column.index()), Some(column));
        }
        assert_eq!(reference_column("Device ID"), Some("id_device_clients_devices"));
        assert_eq!(reference_column("Serial Number (*)"), Some("sn_clients_devices"));
    }

    #[test]
    fn unknown_labels_are_unmapped() {
        assert_eq!(reference_column("Serial Number"), None);
        assert_eq!(reference_column(""), None);
        assert_eq!(Column::from_index(COLUMN_COUNT), None);
    }
}
