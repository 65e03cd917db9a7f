use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::level::{LevelDescriptor, LevelId};
use super::loader::{load_level_file, LevelLoadError};

/// Every level descriptor known to the game, keyed by level id.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: BTreeMap<LevelId, LevelDescriptor>,
}

impl LevelCatalog {
    pub fn from_levels(levels: impl IntoIterator<Item = LevelDescriptor>) -> Self {
        let mut catalog = Self::default();
        for level in levels {
            catalog.insert(level);
        }
        catalog
    }

    /// Loads every `*.xml` file in `dir` (sorted by file name). A file that
    /// fails to load is logged and left out; only an unreadable directory is
    /// an error.
    pub fn load_dir(dir: &Path) -> Result<Self, LevelLoadError> {
        let files = collect_xml_files_sorted(dir)?;
        let mut catalog = Self::default();
        for file in files {
            match load_level_file(&file) {
                Ok(level) => {
                    if catalog.contains(level.id()) {
                        warn!(
                            file = %file.display(),
                            level = %level.id(),
                            "duplicate_level_id_overrides_previous"
                        );
                    }
                    catalog.insert(level);
                }
                Err(error) => {
                    warn!(file = %file.display(), error = %error, "level_file_skipped");
                }
            }
        }
        info!(
            dir = %dir.display(),
            level_count = catalog.len(),
            "level_catalog_loaded"
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, level: LevelDescriptor) {
        self.levels.insert(level.id().clone(), level);
    }

    pub fn get(&self, id: &LevelId) -> Option<&LevelDescriptor> {
        self.levels.get(id)
    }

    pub fn contains(&self, id: &LevelId) -> bool {
        self.levels.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &LevelId> {
        self.levels.keys()
    }
}

fn collect_xml_files_sorted(dir: &Path) -> Result<Vec<PathBuf>, LevelLoadError> {
    let read_dir_error = |source| LevelLoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if path.is_file() && is_xml {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_dir_skips_broken_files_and_ignores_other_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("a_start.xml"),
            r#"<Level name="start" width="3" height="3"/>"#,
        )
        .expect("write start");
        fs::write(dir.path().join("b_broken.xml"), "<Level name=").expect("write broken");
        fs::write(dir.path().join("notes.txt"), "not a level").expect("write notes");

        let catalog = LevelCatalog::load_dir(dir.path()).expect("catalog");

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(&LevelId::new("start")));
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = LevelCatalog::load_dir(&dir.path().join("missing"));
        assert!(matches!(result, Err(LevelLoadError::ReadDir { .. })));
    }
}
