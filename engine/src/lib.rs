//! A small file-backed record store driven by a line-oriented command
//! language (`CREATE_TABLE`, `ADD`, `UPDATE`, `GET`, `DELETE`).

pub mod catalog;
pub mod engine;
pub mod error;
pub mod index;
pub mod script;
pub mod storage;

#[cfg(test)]
mod tests;

pub use engine::Database;
pub use error::{Error, ErrorKind, Result};
pub use script::{Command, QueryResult, RowView};
