//! Which half of a two-sided structure is on screen.

use super::draft::Draft;
use super::edit::{ContentionPart, DefinitionPart, Edit, Scope, Structural};
use crate::error::{Error, Result};
use crate::models::{Contention, Definition, Side};

/// Direction the content moves when the visible side changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    /// Towards gov
    Backward,
    #[default]
    Still,
    /// Towards opp
    Forward,
}

impl SlideDirection {
    #[must_use]
    pub const fn between(from: Side, to: Side) -> Self {
        match (from, to) {
            (Side::Gov, Side::Opp) => Self::Forward,
            (Side::Opp, Side::Gov) => Self::Backward,
            _ => Self::Still,
        }
    }

    #[must_use]
    pub const fn offset(self) -> i8 {
        match self {
            Self::Backward => -1,
            Self::Still => 0,
            Self::Forward => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Toggle,
    Fixed,
}

/// View state for one panel's gov/opp switch.
///
/// A toggleable selector is driven by the user. A fixed selector shows the
/// side its owner supplied and refuses user toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideSelector {
    side: Side,
    mode: Mode,
}

impl SideSelector {
    #[must_use]
    pub const fn toggleable(side: Side) -> Self {
        Self {
            side,
            mode: Mode::Toggle,
        }
    }

    #[must_use]
    pub const fn fixed(side: Side) -> Self {
        Self {
            side,
            mode: Mode::Fixed,
        }
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        matches!(self.mode, Mode::Fixed)
    }

    /// User picks a side
    pub fn select(&mut self, side: Side) -> Result<SlideDirection> {
        if self.is_fixed() {
            return Err(Error::SideLocked);
        }
        let direction = SlideDirection::between(self.side, side);
        self.side = side;
        Ok(direction)
    }

    /// User flips to the other side
    pub fn toggle(&mut self) -> Result<SlideDirection> {
        self.select(self.side.opposite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Case,
    Round(usize),
}

/// A definitions / contentions / framework panel bound to one location.
///
/// Case panels toggle between both halves of the case. Round panels are
/// one-sided: they show the round's opponent material, labelled with the
/// side the round had when the panel was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    target: Target,
    selector: SideSelector,
}

impl Panel {
    #[must_use]
    pub const fn for_case(side: Side) -> Self {
        Self {
            target: Target::Case,
            selector: SideSelector::toggleable(side),
        }
    }

    pub fn for_round(draft: &Draft, index: usize) -> Result<Self> {
        let round = draft.round(index)?;
        Ok(Self {
            target: Target::Round(index),
            selector: SideSelector::fixed(round.side),
        })
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.selector.side()
    }

    /// Location edits made through this panel apply to
    #[must_use]
    pub const fn scope(&self) -> Scope {
        match self.target {
            Target::Case => Scope::Case(self.selector.side()),
            Target::Round(index) => Scope::Round(index),
        }
    }

    pub fn toggle(&mut self) -> Result<SlideDirection> {
        self.selector.toggle()
    }

    pub fn select(&mut self, side: Side) -> Result<SlideDirection> {
        self.selector.select(side)
    }

    pub fn definitions<'a>(&self, draft: &'a Draft) -> Result<&'a [Definition]> {
        draft.definitions_in(self.scope())
    }

    pub fn contentions<'a>(&self, draft: &'a Draft) -> Result<&'a [Contention]> {
        draft.contentions_in(self.scope())
    }

    pub fn framework<'a>(&self, draft: &'a Draft) -> Result<&'a str> {
        draft.framework_in(self.scope())
    }

    #[must_use]
    pub fn edit_definition(&self, index: usize, part: DefinitionPart, text: impl Into<String>) -> Edit {
        Edit::Definition {
            scope: self.scope(),
            index,
            part,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn edit_contention(&self, index: usize, part: ContentionPart, text: impl Into<String>) -> Edit {
        Edit::Contention {
            scope: self.scope(),
            index,
            part,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn edit_framework(&self, text: impl Into<String>) -> Edit {
        Edit::Framework {
            scope: self.scope(),
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn add_definition(&self) -> Structural {
        Structural::AppendDefinition(self.scope())
    }

    #[must_use]
    pub const fn remove_definition(&self, index: usize) -> Structural {
        Structural::RemoveDefinition {
            scope: self.scope(),
            index,
        }
    }

    #[must_use]
    pub const fn add_contention(&self) -> Structural {
        Structural::AppendContention(self.scope())
    }

    #[must_use]
    pub const fn remove_contention(&self, index: usize) -> Structural {
        Structural::RemoveContention {
            scope: self.scope(),
            index,
        }
    }
}
