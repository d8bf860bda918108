pub mod info;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::info::DbInfo;
use crate::error::{Error, Result};
use crate::storage::file::{FileStore, TABLE_EXTENSION};

pub const INFO_FILE: &str = "info.json";
pub const TABLES_DIR: &str = "tables";
pub const ARCHIVE_DIR: &str = "archive";

/// Directory layout of one database:
///
/// ```text
/// <base>/<db_name>/info.json
/// <base>/<db_name>/tables/<table>.tff
/// <base>/<db_name>/archive/
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    pub info: DbInfo,
    root: PathBuf,
}

impl Catalog {
    /// Opens a database rooted at `<base>/<info.db_name>`, creating the
    /// tables directory if needed.
    pub fn open(base: impl AsRef<Path>, info: DbInfo) -> Result<Self> {
        let root = base.as_ref().join(&info.db_name);
        let catalog = Self { info, root };
        fs::create_dir_all(catalog.tables_dir())?;
        Ok(catalog)
    }

    /// Opens the database directory that holds `info.json`.
    pub fn open_dir(db_dir: impl AsRef<Path>) -> Result<Self> {
        let root = db_dir.as_ref().to_path_buf();
        let info = DbInfo::load(root.join(INFO_FILE))?;
        let catalog = Self { info, root };
        fs::create_dir_all(catalog.tables_dir())?;
        Ok(catalog)
    }

    /// Creates the directory layout and writes `info.json`.
    pub fn create_database(base: impl AsRef<Path>, info: DbInfo) -> Result<Self> {
        let root = base.as_ref().join(&info.db_name);
        let info_path = root.join(INFO_FILE);
        if info_path.exists() {
            return Err(Error::Config(format!(
                "database '{}' already exists",
                info.db_name
            )));
        }
        fs::create_dir_all(root.join(TABLES_DIR))?;
        fs::create_dir_all(root.join(ARCHIVE_DIR))?;
        fs::write(&info_path, info.to_json()?)?;
        tracing::info!(db = %info.db_name, path = %root.display(), "created database");
        Ok(Self { info, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join(TABLES_DIR)
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.tables_dir())
    }

    /// Names of all tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.tables_dir())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TABLE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
