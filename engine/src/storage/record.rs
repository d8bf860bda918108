use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::schema::{Column, ColumnType, Schema};
use crate::error::{Error, Result};

/// One table row. Values are kept as text whatever the column type;
/// `key` mirrors the key column's value from when the row was added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    pub data: HashMap<String, String>,
}

impl Row {
    /// Builds a row from values in column order. Missing trailing values
    /// become empty text and surplus values are ignored.
    pub fn from_values(schema: &Schema, values: &[String]) -> Self {
        let data = schema
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name.clone(), values.get(i).cloned().unwrap_or_default()))
            .collect();

        let key = schema
            .key_index()
            .and_then(|i| values.get(i))
            .cloned()
            .unwrap_or_default();

        Row { key, data }
    }

    /// Overwrites every column from values in column order. The lookup
    /// key is left as it was.
    pub fn set_values(&mut self, schema: &Schema, values: &[String]) {
        for (column, value) in schema.columns.iter().zip(values) {
            self.data.insert(column.name.clone(), value.clone());
        }
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(String::as_str)
    }

    /// Values in the schema's column order.
    pub fn values<'a>(&'a self, schema: &Schema) -> Vec<&'a str> {
        schema
            .columns
            .iter()
            .map(|c| self.value(&c.name).unwrap_or_default())
            .collect()
    }

    /// The value of a NUMBER column. Empty values read as `None`.
    pub fn as_number(&self, column: &Column) -> Result<Option<f64>> {
        if column.column_type != ColumnType::Number {
            return Err(Error::Validation(format!(
                "column '{}' is not a NUMBER column",
                column.name
            )));
        }
        let value = self.checked_value(column)?;
        if value.is_empty() {
            return Ok(None);
        }
        // checked_value already proved the value parses.
        Ok(value.parse::<f64>().ok())
    }

    /// The value of a TEXT column.
    pub fn as_text(&self, column: &Column) -> Result<&str> {
        if column.column_type != ColumnType::Text {
            return Err(Error::Validation(format!(
                "column '{}' is not a TEXT column",
                column.name
            )));
        }
        self.checked_value(column)
    }

    fn checked_value(&self, column: &Column) -> Result<&str> {
        let value = self.value(&column.name).ok_or_else(|| {
            Error::Validation(format!("row has no value for column '{}'", column.name))
        })?;
        column.validate(value)?;
        Ok(value)
    }
}
