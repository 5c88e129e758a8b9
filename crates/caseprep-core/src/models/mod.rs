//! Data models for caseprep

mod case;
mod side;

pub use case::{
    Case, CaseField, CaseId, Contention, Definition, FieldUpdate, Round, PLACEHOLDER_TITLE,
};
pub use side::{Side, Sided};
