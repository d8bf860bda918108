//! Text encoding of a table file (`.tff`).
//!
//! ```text
//! Title : "users"
//!
//! TABLE_S BEGIN
//!     NUMBER id NOTNULL KEY,
//!     TEXT name NOTNULL
//! END
//!
//! DATA_SECTION :
//! Data-> [1, Alice] ->End
//! ```

use std::fmt::Write;

use tracing::{debug, warn};

use crate::catalog::schema::{Column, ColumnType, Schema};
use crate::error::{Error, Result};
use crate::storage::Table;
use crate::storage::lexer::{
    DATA_SECTION, ROW_PREFIX, ROW_SUFFIX, TffToken, is_row_line, lex_header, lex_row, quote_value,
};
use crate::storage::record::Row;

pub fn encode(table: &Table) -> String {
    let schema = &table.schema;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write!(out, "Title : \"{}\"\n\n", schema.table_name);
    out.push_str("TABLE_S BEGIN\n");
    for (i, column) in schema.columns.iter().enumerate() {
        let _ = write!(out, "    {} {}", column.column_type, column.name);
        if column.not_null {
            out.push_str(" NOTNULL");
        }
        if column.is_key {
            out.push_str(" KEY");
        }
        if i + 1 < schema.columns.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("END\n\n");

    let _ = writeln!(out, "{} :", DATA_SECTION);
    for row in table.rows() {
        let values: Vec<String> = row
            .values(schema)
            .into_iter()
            .map(encode_value)
            .collect();
        let _ = writeln!(out, "{} [{}] {}", ROW_PREFIX, values.join(", "), ROW_SUFFIX);
    }
    out
}

/// Values are written bare unless they would not read back unchanged:
/// quotes, backslashes, separators, line breaks and edge whitespace force
/// the quoted form.
fn encode_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| matches!(c, '"' | '\\' | ',' | '[' | ']' | '\n' | '\r'))
        || value.trim() != value;
    if needs_quotes {
        quote_value(value)
    } else {
        value.to_string()
    }
}

pub fn decode(raw: &str) -> Result<Table> {
    let header = lex_header(raw)?;
    let (table_name, columns) = decode_header(&header)?;
    let schema = Schema {
        table_name,
        columns,
    };
    debug!(table = %schema.table_name, columns = schema.columns.len(), "decoded table header");

    let mut rows = Vec::new();
    let mut in_data = false;
    for line in raw.lines().map(str::trim) {
        if line.starts_with(DATA_SECTION) {
            in_data = true;
            continue;
        }
        if !in_data || !is_row_line(line) {
            continue;
        }
        let Some(tokens) = lex_row(line) else {
            warn!(line, "skipping row without brackets");
            continue;
        };
        let values: Vec<String> = tokens.iter().filter_map(TffToken::value_text).collect();
        if values.is_empty() {
            warn!(line, "skipping row without values");
            continue;
        }
        if values.len() != schema.columns.len() {
            warn!(
                line,
                expected = schema.columns.len(),
                found = values.len(),
                "row width differs from schema"
            );
        }
        rows.push(Row::from_values(&schema, &values));
    }

    Ok(Table::with_rows(schema, rows))
}

fn decode_header(tokens: &[TffToken]) -> Result<(String, Vec<Column>)> {
    let mut iter = tokens.iter().peekable();

    if iter.next() != Some(&TffToken::Title) {
        return Err(Error::Decode("missing title".to_string()));
    }
    let table_name = match iter.peek() {
        Some(TffToken::TableName(name)) => {
            let name = name.clone();
            iter.next();
            name
        }
        _ => String::new(),
    };

    if iter.next() != Some(&TffToken::TableSection) || iter.next() != Some(&TffToken::SectionBegin)
    {
        return Err(Error::Decode("missing 'TABLE_S BEGIN'".to_string()));
    }

    let mut columns = Vec::new();
    loop {
        let column_type = match iter.next() {
            Some(TffToken::SectionEnd) if columns.is_empty() => break,
            Some(TffToken::NumberType) => ColumnType::Number,
            Some(TffToken::TextType) => ColumnType::Text,
            other => {
                return Err(Error::Decode(format!(
                    "expected column type, found {:?}",
                    other
                )));
            }
        };
        let name = match iter.next() {
            Some(TffToken::ColumnName(name)) => name.clone(),
            other => {
                return Err(Error::Decode(format!(
                    "expected column name, found {:?}",
                    other
                )));
            }
        };

        let mut column = Column {
            name,
            column_type,
            is_key: false,
            not_null: false,
        };
        while let Some(token) = iter.peek() {
            match token {
                TffToken::Key => column.is_key = true,
                TffToken::NotNull => column.not_null = true,
                _ => break,
            }
            iter.next();
        }
        columns.push(column);

        match iter.next() {
            Some(TffToken::Comma) => continue,
            Some(TffToken::SectionEnd) => break,
            other => {
                return Err(Error::Decode(format!(
                    "expected ',' or 'END', found {:?}",
                    other
                )));
            }
        }
    }

    if let Some(extra) = iter.next() {
        return Err(Error::Decode(format!(
            "unexpected {:?} after table section",
            extra
        )));
    }
    Ok((table_name, columns))
}
