pub mod codec;
pub mod file;
pub mod lexer;
pub mod record;

use crate::catalog::schema::Schema;
use crate::error::{Error, Result};
use crate::index::PrimaryIndex;
use crate::storage::record::Row;

pub use file::{FileStore, TableStore};

/// A table held in memory for the length of one statement.
#[derive(Debug, Clone)]
pub struct Table {
    pub schema: Schema,
    rows: Vec<Row>,
    index: PrimaryIndex,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        Self::with_rows(schema, Vec::new())
    }

    pub fn with_rows(schema: Schema, rows: Vec<Row>) -> Self {
        let index = PrimaryIndex::build(rows.iter().map(|r| r.key.as_str()));
        Self {
            schema,
            rows,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn find_row(&self, key: &str) -> Option<&Row> {
        self.index.get(key).map(|pos| &self.rows[pos])
    }

    pub fn insert_row(&mut self, row: Row) -> Result<()> {
        self.index.insert(row.key.clone(), self.rows.len())?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces every value of the row found by `key`.
    pub fn update_row(&mut self, key: &str, values: &[String]) -> Result<()> {
        let pos = self
            .index
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        self.rows[pos].set_values(&self.schema, values);
        Ok(())
    }

    /// Removes the row found by `key`, keeping the others in order.
    pub fn delete_row(&mut self, key: &str) -> Result<Row> {
        let pos = self
            .index
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let row = self.rows.remove(pos);
        self.index = PrimaryIndex::build(self.rows.iter().map(|r| r.key.as_str()));
        Ok(row)
    }
}
