use anyhow::Result;
use cli_table::{Cell, Style, Table, print_stdout};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use sedb_engine::engine::Database;
use sedb_engine::script::{QueryResult, RowView};
use tracing::debug;

const PROMPT: &str = "sedb> ";
const CONTINUE_PROMPT: &str = "  ..> ";

/// Collects input lines until one of them ends a statement.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    buf: String,
}

impl StatementBuffer {
    /// Adds a line; returns the whole statement once it ends with `;`.
    pub fn push(&mut self, line: &str) -> Option<String> {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(line.trim());
        if self.buf.ends_with(';') {
            Some(std::mem::take(&mut self.buf))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

pub struct Repl {
    db: Database,
    editor: DefaultEditor,
    buffer: StatementBuffer,
}

impl Repl {
    pub fn new(db: Database) -> Result<Self> {
        Ok(Self {
            db,
            editor: DefaultEditor::new()?,
            buffer: StatementBuffer::default(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!(
            "Connected to '{}'. End statements with ';', '.exit' to leave.",
            self.db.catalog.info.db_name
        );

        loop {
            let prompt = if self.buffer.is_empty() {
                PROMPT
            } else {
                CONTINUE_PROMPT
            };
            match self.editor.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if self.buffer.is_empty() && trimmed.starts_with('.') {
                        if !self.meta_command(trimmed) {
                            break;
                        }
                        continue;
                    }
                    if let Some(statement) = self.buffer.push(trimmed) {
                        if let Err(e) = self.editor.add_history_entry(statement.as_str()) {
                            debug!(error = %e, "failed to record history");
                        }
                        execute_and_print(&mut self.db, &statement);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    self.buffer.clear();
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Returns false when the session should end.
    fn meta_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ".exit" | ".quit" => return false,
            ".tables" => match self.db.catalog.table_names() {
                Ok(names) if names.is_empty() => println!("(no tables)"),
                Ok(names) => names.iter().for_each(|n| println!("{}", n)),
                Err(e) => eprintln!("{} {}", "Error:".red(), e),
            },
            _ => eprintln!("{} unknown command '{}'", "Error:".red(), cmd),
        }
        true
    }
}

/// Runs one statement, prints its outcome and returns the status code.
pub fn execute_and_print(db: &mut Database, statement: &str) -> i32 {
    match db.run(statement) {
        Ok(QueryResult::Message(msg)) => {
            println!("{}", msg.green());
            QueryResult::STATUS_OK
        }
        Ok(QueryResult::Row(row)) => {
            print_row(&row);
            QueryResult::STATUS_OK
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            e.status_code()
        }
    }
}

fn print_row(row: &RowView) {
    println!("Data for key '{}' in table '{}':", row.key, row.table_name);
    let table = row
        .fields
        .iter()
        .map(|(column, value)| vec![column.cell(), value.cell()])
        .collect::<Vec<_>>()
        .table()
        .title(vec!["column".cell().bold(true), "value".cell().bold(true)]);

    if let Err(e) = print_stdout(table) {
        eprintln!("Failed to print table: {}", e);
    }
}
