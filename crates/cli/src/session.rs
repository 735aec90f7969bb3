// Worksheet persistence port.
//
// The collection is read at startup and written after every mutating
// command. Missing or malformed state falls back to the built-in default
// collection; a load never fails the process.

use std::fs;
use std::path::PathBuf;

use tabula_engine::collection::WorksheetCollection;
use tabula_engine::worksheet::Worksheet;

pub trait WorksheetStorage {
    /// Load the saved worksheets. None on missing or malformed state.
    fn load(&self) -> Option<Vec<Worksheet>>;

    /// Persist the full collection.
    fn save(&self, sheets: &[Worksheet]) -> Result<(), String>;
}

/// JSON file in the per-user data directory.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabula")
            .join("worksheets.json")
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl WorksheetStorage for JsonFileStorage {
    fn load(&self) -> Option<Vec<Worksheet>> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save(&self, sheets: &[Worksheet]) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(sheets).map_err(|e| e.to_string())?;
        fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

/// Load the collection through a storage port, falling back to the
/// default single-worksheet template.
pub fn load_collection(storage: &dyn WorksheetStorage) -> WorksheetCollection {
    match storage.load() {
        Some(sheets) => WorksheetCollection::from_sheets(sheets),
        None => WorksheetCollection::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("state").join("worksheets.json"));

        let mut collection = WorksheetCollection::new();
        collection.add_worksheet();
        storage.save(collection.sheets()).unwrap();

        let loaded = load_collection(&storage);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.sheets()[0].name, "Sheet 1");
        assert_eq!(loaded.sheets()[0].rows.len(), 2);
        assert_eq!(loaded.sheets()[1].name, "Sheet 2");
    }

    #[test]
    fn test_missing_state_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nope.json"));
        let collection = load_collection(&storage);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.active().name, "Sheet 1");
    }

    #[test]
    fn test_malformed_state_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("worksheets.json");
        fs::write(&path, "{ not json").unwrap();
        let storage = JsonFileStorage::new(path);
        assert!(storage.load().is_none());
        let collection = load_collection(&storage);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_empty_array_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("worksheets.json");
        fs::write(&path, "[]").unwrap();
        let storage = JsonFileStorage::new(path);
        let collection = load_collection(&storage);
        assert_eq!(collection.len(), 1);
    }
}
