//! caseprep-core - Core library for caseprep
//!
//! This crate contains the case model, the persistence clients, the session
//! provider and the field synchronizer used by caseprep front ends.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notice;
pub mod services;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Case, CaseField, CaseId, FieldUpdate, Side};
pub use notice::Notice;
pub use sync::Synchronizer;
