//! Edits a user can make to a case.
//!
//! [`Edit`] covers keystroke-level changes that stay local until blur;
//! [`Structural`] covers list operations that are flushed immediately.

use crate::models::{CaseField, Side};

/// Where a two-sided panel points: one side of the case itself, or the
/// opponent slot of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Case(Side),
    Round(usize),
}

impl Scope {
    /// The top-level field an edit in this scope belongs to
    const fn field_or(self, case_field: CaseField) -> CaseField {
        match self {
            Self::Case(_) => case_field,
            Self::Round(_) => CaseField::Rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionPart {
    Term,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentionPart {
    Contention,
    Warrant,
    Impact,
}

/// A leaf edit; applied locally, persisted on the next blur of its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Resolved(String),
    Framework {
        scope: Scope,
        text: String,
    },
    Definition {
        scope: Scope,
        index: usize,
        part: DefinitionPart,
        text: String,
    },
    Contention {
        scope: Scope,
        index: usize,
        part: ContentionPart,
        text: String,
    },
    RoundNotes {
        round: usize,
        text: String,
    },
}

impl Edit {
    #[must_use]
    pub const fn field(&self) -> CaseField {
        match self {
            Self::Resolved(_) => CaseField::Resolved,
            Self::Framework { scope, .. } => scope.field_or(CaseField::Framework),
            Self::Definition { scope, .. } => scope.field_or(CaseField::Definitions),
            Self::Contention { scope, .. } => scope.field_or(CaseField::Contentions),
            Self::RoundNotes { .. } => CaseField::Rounds,
        }
    }
}

/// A list operation; persisted as soon as it is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structural {
    AppendDefinition(Scope),
    RemoveDefinition { scope: Scope, index: usize },
    AppendContention(Scope),
    RemoveContention { scope: Scope, index: usize },
    AppendRound,
    RemoveRound(usize),
    SetRoundSide { round: usize, side: Side },
}

impl Structural {
    #[must_use]
    pub const fn field(&self) -> CaseField {
        match self {
            Self::AppendDefinition(scope) | Self::RemoveDefinition { scope, .. } => {
                scope.field_or(CaseField::Definitions)
            }
            Self::AppendContention(scope) | Self::RemoveContention { scope, .. } => {
                scope.field_or(CaseField::Contentions)
            }
            Self::AppendRound | Self::RemoveRound(_) | Self::SetRoundSide { .. } => {
                CaseField::Rounds
            }
        }
    }
}
