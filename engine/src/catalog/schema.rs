use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::script::ColumnDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Number,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Number => write!(f, "NUMBER"),
            ColumnType::Text => write!(f, "TEXT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub is_key: bool,
    pub not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub table_name: String,
    pub columns: Vec<Column>,
}

impl Column {
    /// Checks one raw value against this column's constraints.
    pub fn validate(&self, value: &str) -> Result<()> {
        if self.not_null && value.is_empty() {
            return Err(Error::Validation(format!(
                "column '{}' cannot be NULL",
                self.name
            )));
        }
        if !value.is_empty() && self.column_type == ColumnType::Number && value.parse::<f64>().is_err()
        {
            return Err(Error::Validation(format!(
                "invalid number format for column '{}': {}",
                self.name, value
            )));
        }
        Ok(())
    }
}

impl Schema {
    /// Builds a schema from CREATE_TABLE declarations. The key checks run
    /// in a fixed order: key count, key nullability, column count.
    pub fn from_defs(table_name: &str, defs: Vec<ColumnDef>) -> Result<Self> {
        let key_count: usize = defs.iter().map(|d| d.key_marks).sum();
        match key_count {
            1 => {}
            0 => {
                return Err(Error::Schema(
                    "exactly one KEY column is required".to_string(),
                ));
            }
            _ => {
                return Err(Error::Schema(
                    "only one KEY column is allowed per table".to_string(),
                ));
            }
        }

        if defs.iter().any(|d| d.key_marks > 0 && !d.not_null) {
            return Err(Error::Schema(
                "KEY column cannot allow NULL values".to_string(),
            ));
        }

        if defs.is_empty() {
            return Err(Error::Schema(
                "table must have at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for def in &defs {
            if !seen.insert(def.name.as_str()) {
                return Err(Error::Schema(format!(
                    "duplicate column name '{}'",
                    def.name
                )));
            }
        }

        let columns = defs
            .into_iter()
            .map(|d| Column {
                name: d.name,
                column_type: d.column_type,
                is_key: d.key_marks > 0,
                not_null: d.not_null,
            })
            .collect();

        Ok(Self {
            table_name: table_name.to_string(),
            columns,
        })
    }

    pub fn key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_key)
    }

    pub fn key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_key)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Write-path validation: count first, then every value in column order.
    pub fn validate_values(&self, values: &[String]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::ValueCount {
                expected: self.columns.len(),
                received: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(values) {
            column.validate(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, column_type: ColumnType, key_marks: usize, not_null: bool) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            column_type,
            key_marks,
            not_null,
        }
    }

    fn users() -> Schema {
        Schema::from_defs(
            "users",
            vec![
                def("id", ColumnType::Number, 1, true),
                def("name", ColumnType::Text, 0, true),
                def("note", ColumnType::Text, 0, false),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_defs() {
        let schema = users();
        assert_eq!(schema.key_index(), Some(0));
        assert_eq!(schema.key_column().map(|c| c.name.as_str()), Some("id"));
        assert!(schema.column("note").is_some_and(|c| !c.not_null));
    }

    #[test]
    fn test_key_rules_order() {
        // Two keys, one of them nullable: the key count is reported first.
        let err = Schema::from_defs(
            "t",
            vec![
                def("a", ColumnType::Number, 1, false),
                def("b", ColumnType::Number, 1, true),
            ],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "only one KEY column is allowed per table");

        let err = Schema::from_defs("t", vec![def("a", ColumnType::Text, 0, true)]).unwrap_err();
        assert_eq!(err.to_string(), "exactly one KEY column is required");

        let err = Schema::from_defs("t", vec![def("a", ColumnType::Text, 1, false)]).unwrap_err();
        assert_eq!(err.to_string(), "KEY column cannot allow NULL values");

        let err = Schema::from_defs("t", Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "exactly one KEY column is required");
    }

    #[test]
    fn test_duplicate_column_name() {
        let err = Schema::from_defs(
            "t",
            vec![
                def("a", ColumnType::Number, 1, true),
                def("a", ColumnType::Text, 0, false),
            ],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "duplicate column name 'a'");
    }

    #[test]
    fn test_validate_values() {
        let schema = users();
        let values = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(schema.validate_values(&values(&["1", "Alice", ""])).is_ok());
        assert!(schema.validate_values(&values(&["-2.5", "Bob", "x"])).is_ok());

        // Count is checked before the per-value rules.
        assert!(matches!(
            schema.validate_values(&values(&["abc", ""])),
            Err(Error::ValueCount {
                expected: 3,
                received: 2
            })
        ));
        assert_eq!(
            schema
                .validate_values(&values(&["1", "", ""]))
                .unwrap_err()
                .to_string(),
            "column 'name' cannot be NULL"
        );
        assert_eq!(
            schema
                .validate_values(&values(&["one", "Alice", ""]))
                .unwrap_err()
                .to_string(),
            "invalid number format for column 'id': one"
        );
    }
}
