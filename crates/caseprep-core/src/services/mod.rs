//! Shared services used by front ends.

mod cases;

pub use cases::CaseService;
