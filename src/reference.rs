/// A read-only table loaded from the reference CSV.
///
/// Values are kept exactly as read; callers trim when comparing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl ReferenceTable {
    /// Build a table from headers and records. Records shorter than the
    /// header are padded with empty values.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let records = records
            .into_iter()
            .map(|mut record| {
                record.resize(width.max(record.len()), String::new());
                record
            })
            .collect();
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the first column named `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.records.iter().map(|values| Record { values })
    }

    /// Values of one column in file order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .map(move |r| r.get(index).map(String::as_str).unwrap_or(""))
    }
}

/// Borrowed view of one reference row
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    values: &'a [String],
}

impl<'a> Record<'a> {
    pub fn get(&self, index: usize) -> &'a str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn trimmed(&self, index: usize) -> &'a str {
        self.get(index).trim()
    }
}
