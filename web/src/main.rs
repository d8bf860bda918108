use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use clap::Parser;
use sedb_engine::catalog::Catalog;
use sedb_engine::engine::Database;
use sedb_engine::error::{Error, ErrorKind};
use sedb_engine::script::QueryResult;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// HTTP front-end: `POST /query` runs one statement.
#[derive(Parser, Debug)]
#[command(name = "sedb-web", version)]
struct Args {
    /// Database directory (the one holding info.json)
    #[arg(short, long, env = "SEDB_DB")]
    db: PathBuf,

    /// Overrides server_port from info.json
    #[arg(short, long, env = "SEDB_PORT")]
    port: Option<u16>,
}

// Statements run one at a time against the shared database.
struct AppState {
    db: Mutex<Database>,
}

#[derive(Debug, Serialize, PartialEq)]
struct QueryResponse {
    status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl QueryResponse {
    fn ok(result: QueryResult) -> Self {
        let (message, row) = match result {
            QueryResult::Message(msg) => (Some(msg), None),
            QueryResult::Row(row) => (None, Some(row.fields)),
        };
        Self {
            status: QueryResult::STATUS_OK,
            message,
            row,
            error: None,
        }
    }

    fn error(err: &Error) -> Self {
        Self {
            status: err.status_code(),
            message: None,
            row: None,
            error: Some(err.to_string()),
        }
    }
}

fn http_status(err: &Error) -> StatusCode {
    match err.kind() {
        ErrorKind::Decode | ErrorKind::Config | ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let catalog = Catalog::open_dir(&args.db)
        .with_context(|| format!("cannot open database at {}", args.db.display()))?;
    let port = args.port.unwrap_or(catalog.info.server_port);
    let db_name = catalog.info.db_name.clone();

    let shared_state = Arc::new(AppState {
        db: Mutex::new(Database::open(catalog)),
    });
    let app = Router::new()
        .route("/query", post(handle_query))
        .with_state(shared_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    info!(db = %db_name, "listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(statement): Json<String>,
) -> (StatusCode, Json<QueryResponse>) {
    let mut db = state.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    match db.run(&statement) {
        Ok(result) => (StatusCode::OK, Json(QueryResponse::ok(result))),
        Err(e) => {
            warn!(error = %e, "statement failed");
            (http_status(&e), Json(QueryResponse::error(&e)))
        }
    }
}
