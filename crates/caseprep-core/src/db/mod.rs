//! Database layer for caseprep

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{CaseRepository, LibSqlCaseRepository};
