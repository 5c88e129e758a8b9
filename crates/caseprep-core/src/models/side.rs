//! Debate sides and side-keyed structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two fixed roles in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Proposing side
    #[default]
    Gov,
    /// Opposing side
    Opp,
}

impl Side {
    /// Both sides, in display order
    pub const ALL: [Self; 2] = [Self::Gov, Self::Opp];

    /// The other side
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Gov => Self::Opp,
            Self::Opp => Self::Gov,
        }
    }

    /// Wire name (`gov` / `opp`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gov => "gov",
            Self::Opp => "opp",
        }
    }

    /// Human label (`Gov` / `Opp`)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gov => "Gov",
            Self::Opp => "Opp",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gov" => Ok(Self::Gov),
            "opp" => Ok(Self::Opp),
            other => Err(format!("unknown side '{other}' (expected gov or opp)")),
        }
    }
}

/// A value kept once per side.
///
/// Both keys always exist; a row missing one deserializes it as the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Default + Deserialize<'de>"))]
pub struct Sided<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gov: T,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opp: T,
}

impl<T> Sided<T> {
    pub const fn new(gov: T, opp: T) -> Self {
        Self { gov, opp }
    }

    #[must_use]
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Gov => &self.gov,
            Side::Opp => &self.opp,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Gov => &mut self.gov,
            Side::Opp => &mut self.opp,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
