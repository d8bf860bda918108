pub mod lexer;
pub mod parser;
pub mod token;

use std::fmt;

use serde::Serialize;

use crate::catalog::schema::ColumnType;

pub use lexer::tokenize;
pub use parser::parse;
pub use token::Token;

/// A checked statement, ready for the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    Add {
        table_name: String,
        values: Vec<String>,
    },
    Update {
        table_name: String,
        key: String,
        values: Vec<String>,
    },
    Get {
        table_name: String,
        key: String,
    },
    Delete {
        table_name: String,
        key: String,
    },
}

/// Column declaration as written in CREATE_TABLE. Key rules are enforced
/// by the executor, so every KEY mark is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub key_marks: usize,
    pub not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryResult {
    Message(String),
    Row(RowView),
}

impl QueryResult {
    pub const STATUS_OK: i32 = 0;
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Message(msg) => write!(f, "{}", msg),
            QueryResult::Row(row) => write!(f, "{}", row),
        }
    }
}

/// The outcome of GET: every column of one row, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub table_name: String,
    pub key: String,
    pub fields: Vec<(String, String)>,
}

impl RowView {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for RowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data for key '{}' in table '{}':",
            self.key, self.table_name
        )?;
        for (name, value) in &self.fields {
            write!(f, "\n  {}: {}", name, value)?;
        }
        Ok(())
    }
}
