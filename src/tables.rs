//! Enumeration tables for question settings
//!
//! The editor offers a fixed set of choices for a question's type, time limit
//! and points. Each set is a [`Table`]: an ordered list of display labels and
//! the values stored for them, queried in both directions.
//!
//! Tables never reject a stored value. A document may carry values that no
//! table lists (a `timeLimit` of 7, say); those show up as
//! [`Selection::Unset`] and are written back exactly as they were loaded.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use derive_where::derive_where;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A fixed ordered mapping from display labels to stored values
#[derive_where(Clone, Copy)]
pub struct Table<V: 'static> {
    entries: &'static [(&'static str, V)],
}

/// How a stored value appears in a picker built from a [`Table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The value is listed in the table under this label
    Resolved(&'static str),
    /// The value is not listed; the picker shows nothing selected
    Unset,
}

impl<V: PartialEq + Clone> Table<V> {
    /// Creates a table from its entries in display order
    pub const fn new(entries: &'static [(&'static str, V)]) -> Self {
        Self { entries }
    }

    /// Returns the label of a value, or `None` if the table does not list it
    pub fn label_for(&self, value: &V) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, v)| v == value)
            .map(|(label, _)| *label)
    }

    /// Returns the value stored for a label, or `None` for an unknown label
    pub fn value_for(&self, label: &str) -> Option<V> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, value)| value.clone())
    }

    /// Returns how a stored value should be shown in a picker
    pub fn selection(&self, value: &V) -> Selection {
        self.label_for(value)
            .map_or(Selection::Unset, Selection::Resolved)
    }

    /// Iterates the labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    /// Returns the entries in display order
    pub fn entries(&self) -> &'static [(&'static str, V)] {
        self.entries
    }
}

/// Question type choices
pub static TYPES: Table<&'static str> = Table::new(&[
    ("Single-Select", QuestionKind::SINGLE),
    ("Multi-Select", QuestionKind::MULTI),
]);

/// Time limit choices, in seconds
pub static TIME_LIMITS: Table<u32> = Table::new(&[
    ("5 seconds", 5),
    ("10 seconds", 10),
    ("20 seconds", 20),
    ("30 seconds", 30),
    ("1 minute", 60),
]);

/// Point value choices
pub static POINTS: Table<u32> = Table::new(&[
    ("100 points", 100),
    ("200 points", 200),
    ("500 points", 500),
]);

/// The answer-correctness semantics of a question
///
/// Anything other than `single` or `multi` found in a stored document is
/// kept in [`QuestionKind::Other`] and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub enum QuestionKind {
    /// Players pick one answer
    #[default]
    Single,
    /// Players may pick several answers
    Multi,
    /// A stored type this editor does not recognize
    Other(String),
}

impl QuestionKind {
    const SINGLE: &'static str = "single";
    const MULTI: &'static str = "multi";

    /// Returns the stored form of this type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Single => Self::SINGLE,
            Self::Multi => Self::MULTI,
            Self::Other(raw) => raw,
        }
    }

    /// Returns how this type should be shown in the type picker
    pub fn selection(&self) -> Selection {
        match self {
            Self::Single => TYPES.selection(&Self::SINGLE),
            Self::Multi => TYPES.selection(&Self::MULTI),
            Self::Other(_) => Selection::Unset,
        }
    }

    /// Returns the type stored for a picker label
    pub fn from_label(label: &str) -> Option<Self> {
        TYPES.value_for(label).map(|value| match value {
            Self::SINGLE => Self::Single,
            _ => Self::Multi,
        })
    }
}

impl Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            Self::SINGLE => Self::Single,
            Self::MULTI => Self::Multi,
            other => Self::Other(other.to_owned()),
        })
    }
}
