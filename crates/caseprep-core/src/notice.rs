//! Transient user notifications.
//!
//! A notice is shown once and dismisses itself after `duration`. Nothing
//! else about a failure is tracked.

use std::time::Duration;

use crate::models::CaseField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub duration: Duration,
    /// Underlying error text, for logs and verbose output
    pub detail: Option<String>,
}

impl Notice {
    fn error(title: &str, millis: u64, detail: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            duration: Duration::from_millis(millis),
            detail: Some(detail.into()),
        }
    }

    /// A flush of `field` was rejected or never reached the store
    pub fn flush_failed(field: CaseField, detail: impl Into<String>) -> Self {
        match field {
            CaseField::Resolved => Self::error("Error updating resolved.", 5000, detail),
            CaseField::Framework => Self::error("Error updating framework.", 5000, detail),
            CaseField::Definitions | CaseField::Contentions | CaseField::Rounds => {
                Self::error("Error updating case.", 3000, detail)
            }
        }
    }

    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        Self::error("Error fetching cases.", 5000, detail)
    }

    pub fn create_failed(detail: impl Into<String>) -> Self {
        Self::error("Error creating case.", 5000, detail)
    }

    pub fn sign_in_failed(detail: impl Into<String>) -> Self {
        Self::error("Error signing in.", 2000, detail)
    }

    pub fn signed_in() -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Signed in!".to_string(),
            duration: Duration::from_millis(2000),
            detail: None,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}
