use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sedb_engine::catalog::Catalog;
use sedb_engine::catalog::info::DbInfo;
use sedb_engine::engine::Database;
use sedb_engine::script::QueryResult;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod repl;

/// Command-line front-end for sedb databases.
#[derive(Parser, Debug)]
#[command(name = "sedb", version, about = "File-backed record store")]
struct Args {
    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a new database directory with its info.json
    Create {
        #[arg(short, long)]
        name: String,

        /// Port the HTTP front-end listens on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Directory the database is created in
        #[arg(long, default_value = ".", env = "SEDB_BASE_DIR")]
        base_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Start an interactive session
    Repl {
        /// Database directory (the one holding info.json)
        #[arg(short, long, env = "SEDB_DB")]
        db: PathBuf,
    },
    /// Execute one statement and exit with its status code
    Exec {
        #[arg(short, long, env = "SEDB_DB")]
        db: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        statement: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Cmd::Create {
            name,
            port,
            base_dir,
            yes,
        } => {
            create_database(&base_dir, DbInfo::new(name, port), yes)?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Repl { db } => {
            let db = open(&db)?;
            repl::Repl::new(db)?.run()?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Exec {
            db,
            json,
            statement,
        } => {
            let mut db = open(&db)?;
            let status = if json {
                execute_as_json(&mut db, &statement)?
            } else {
                repl::execute_and_print(&mut db, &statement)
            };
            Ok(ExitCode::from(status as u8))
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sedb_cli=debug,sedb_engine=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn open(dir: &Path) -> Result<Database> {
    let catalog = Catalog::open_dir(dir)
        .with_context(|| format!("cannot open database at {}", dir.display()))?;
    debug!(db = %catalog.info.db_name, root = %dir.display(), "opened database");
    Ok(Database::open(catalog))
}

fn execute_as_json(db: &mut Database, statement: &str) -> Result<i32> {
    let (status, body) = match db.run(statement) {
        Ok(result) => (
            QueryResult::STATUS_OK,
            json!({ "status": QueryResult::STATUS_OK, "result": result }),
        ),
        Err(e) => (
            e.status_code(),
            json!({ "status": e.status_code(), "error": e.to_string() }),
        ),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(status)
}

fn create_database(base_dir: &Path, info: DbInfo, yes: bool) -> Result<()> {
    println!("{}", info.to_json()?);
    if !yes && !confirm("Create this database?")? {
        println!("Aborted.");
        return Ok(());
    }

    let catalog = Catalog::create_database(base_dir, info)?;
    println!(
        "{}",
        format!("Database created at {}", catalog.root().display()).green()
    );
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    loop {
        print!("{} (y/n): ", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer 'y' or 'n'."),
        }
    }
}
