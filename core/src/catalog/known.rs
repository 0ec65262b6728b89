use crate::catalog::object::{ObjectKind, Origin};
use crate::prelude::{CatalogError, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Raw metadata for one previously known object, keyed by its feed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub index: usize,
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub country: String,
}

/// The previously known object set that live samples are reconciled against.
///
/// Supplies kind and origin for ids the feed itself does not describe. Unknown ids
/// default to `Junk` / `Other`.
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    entries: HashMap<ObjectId, (ObjectKind, Origin)>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for entry in entries {
            let classification = (
                ObjectKind::normalize(&entry.object_type),
                Origin::normalize(&entry.country),
            );
            if catalog
                .entries
                .insert(ObjectId(entry.index), classification)
                .is_some()
            {
                return Err(CatalogError::DuplicateIndex(entry.index));
            }
        }
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Reads a JSON catalog file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| CatalogError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn classify(&self, id: ObjectId) -> (ObjectKind, Origin) {
        self.entries
            .get(&id)
            .copied()
            .unwrap_or((ObjectKind::Junk, Origin::Other))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_and_normalizes_entries() {
        let catalog = ObjectCatalog::from_json_str(
            r#"[{"index":0,"object_type":"PAYLOAD","country":"US"},
                {"index":1,"object_type":"DEBRIS","country":"PRC"},
                {"index":2}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.classify(ObjectId(0)),
            (ObjectKind::Active, Origin::UnitedStates)
        );
        assert_eq!(catalog.classify(ObjectId(1)), (ObjectKind::Junk, Origin::China));
        assert_eq!(catalog.classify(ObjectId(2)), (ObjectKind::Junk, Origin::Other));
        assert_eq!(catalog.classify(ObjectId(99)), (ObjectKind::Junk, Origin::Other));
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let result = ObjectCatalog::from_json_str(r#"[{"index":4},{"index":4}]"#);
        assert!(matches!(result, Err(CatalogError::DuplicateIndex(4))));
    }

    #[test]
    fn loads_catalog_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(br#"[{"index":7,"object_type":"payload","country":"JPN"}]"#)
            .unwrap();
        let catalog = ObjectCatalog::load(temp.path()).unwrap();
        assert_eq!(catalog.classify(ObjectId(7)), (ObjectKind::Active, Origin::Japan));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = ObjectCatalog::load("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}
