use tracing::{info, instrument};

use crate::catalog::Catalog;
use crate::catalog::schema::Schema;
use crate::error::{Error, Result};
use crate::script::{ColumnDef, Command, QueryResult, RowView, parse};
use crate::storage::record::Row;
use crate::storage::{FileStore, Table, TableStore};

/// Executes statements against one database. Every statement loads the
/// table fresh from the store and, if it mutates, writes it back in full.
pub struct Database<S: TableStore = FileStore> {
    pub catalog: Catalog,
    store: S,
}

impl Database<FileStore> {
    pub fn open(catalog: Catalog) -> Self {
        let store = catalog.store();
        Self { catalog, store }
    }
}

impl<S: TableStore> Database<S> {
    pub fn with_store(catalog: Catalog, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tokenizes, checks and executes one statement.
    pub fn run(&mut self, statement: &str) -> Result<QueryResult> {
        let command = parse(statement)?;
        self.execute(command)
    }

    #[instrument(skip(self))]
    pub fn execute(&mut self, command: Command) -> Result<QueryResult> {
        match command {
            Command::CreateTable { name, columns } => self.create_table(&name, columns),
            Command::Add { table_name, values } => self.add(&table_name, values),
            Command::Update {
                table_name,
                key,
                values,
            } => self.update(&table_name, &key, values),
            Command::Get { table_name, key } => self.get(&table_name, &key),
            Command::Delete { table_name, key } => self.delete(&table_name, &key),
        }
    }

    fn create_table(&mut self, name: &str, columns: Vec<ColumnDef>) -> Result<QueryResult> {
        if self.store.exists(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        let schema = Schema::from_defs(name, columns)?;
        self.store.save(&Table::new(schema))?;

        info!(table = name, "table created");
        Ok(QueryResult::Message(format!(
            "Table '{}' created successfully",
            name
        )))
    }

    fn add(&mut self, name: &str, values: Vec<String>) -> Result<QueryResult> {
        let mut table = self.load_existing(name)?;
        if values.is_empty() {
            return Err(Error::Validation("no data provided".to_string()));
        }
        table.schema.validate_values(&values)?;

        let row = Row::from_values(&table.schema, &values);
        if row.key.is_empty() {
            return Err(Error::Validation("key value cannot be empty".to_string()));
        }
        let key = row.key.clone();
        table.insert_row(row)?;
        self.store.save(&table)?;

        info!(table = name, key = %key, "row added");
        Ok(QueryResult::Message(format!(
            "Data successfully added to table '{}'",
            name
        )))
    }

    fn update(&mut self, name: &str, key: &str, values: Vec<String>) -> Result<QueryResult> {
        let mut table = self.load_existing(name)?;
        if table.find_row(key).is_none() {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        if values.is_empty() {
            return Err(Error::Validation("no update data provided".to_string()));
        }
        table.schema.validate_values(&values)?;

        // The row keeps its lookup key even if the key column changes.
        table.update_row(key, &values)?;
        self.store.save(&table)?;

        info!(table = name, key, "row updated");
        Ok(QueryResult::Message(format!(
            "Table '{}' updated successfully",
            name
        )))
    }

    fn get(&self, name: &str, key: &str) -> Result<QueryResult> {
        let table = self.load_existing(name)?;
        let row = table
            .find_row(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;

        let fields = table
            .schema
            .columns
            .iter()
            .map(|c| {
                let value = row.value(&c.name).unwrap_or_default();
                (c.name.clone(), value.to_string())
            })
            .collect();

        Ok(QueryResult::Row(RowView {
            table_name: name.to_string(),
            key: key.to_string(),
            fields,
        }))
    }

    fn delete(&mut self, name: &str, key: &str) -> Result<QueryResult> {
        let mut table = self.load_existing(name)?;
        table.delete_row(key)?;
        self.store.save(&table)?;

        info!(table = name, key, "row deleted");
        Ok(QueryResult::Message(format!(
            "Row with key '{}' successfully deleted from table '{}'",
            key, name
        )))
    }

    fn load_existing(&self, name: &str) -> Result<Table> {
        if !self.store.exists(name) {
            return Err(Error::TableNotFound(name.to_string()));
        }
        self.store.load(name)
    }
}
