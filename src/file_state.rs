use std::path::{Path, PathBuf};

/// Files the session has touched and whether the grid has unsaved edits.
#[derive(Clone, Debug, Default)]
pub struct FileState {
    pub database_path: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub is_dirty: bool,
}

impl FileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database_name(&self) -> String {
        file_name(self.database_path.as_deref()).unwrap_or_else(|| "[No Database]".to_string())
    }

    pub fn export_name(&self) -> Option<String> {
        file_name(self.export_path.as_deref())
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn set_database(&mut self, path: PathBuf) {
        self.database_path = Some(path);
    }

    /// Record a successful export; the grid now matches the file
    pub fn set_exported(&mut self, path: PathBuf) {
        self.export_path = Some(path);
        self.is_dirty = false;
    }
}

fn file_name(path: Option<&Path>) -> Option<String> {
    path.and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}
