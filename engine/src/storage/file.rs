use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::Table;
use crate::storage::codec::{decode, encode};

pub const TABLE_EXTENSION: &str = "tff";

/// Persistence for whole tables. The executor only talks to this trait,
/// so the full-rewrite strategy below can be swapped out.
pub trait TableStore {
    fn exists(&self, name: &str) -> bool;
    fn load(&self, name: &str) -> Result<Table>;
    fn save(&self, table: &Table) -> Result<()>;
}

/// One `<name>.tff` file per table, rewritten in full on every save.
///
/// There is no locking: two processes writing the same table can lose
/// each other's updates.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, TABLE_EXTENSION))
    }
}

impl TableStore for FileStore {
    fn exists(&self, name: &str) -> bool {
        self.table_path(name).is_file()
    }

    fn load(&self, name: &str) -> Result<Table> {
        let path = self.table_path(name);
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::TableNotFound(name.to_string()),
            _ => Error::Io(e),
        })?;
        let mut table = decode(&raw)?;
        // The file name is the table's identity; the title is informational.
        table.schema.table_name = name.to_string();
        debug!(table = name, rows = table.rows().len(), "loaded table");
        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<()> {
        let path = self.table_path(table.name());
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(encode(table).as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!(table = table.name(), path = %path.display(), "saved table");
        Ok(())
    }
}
