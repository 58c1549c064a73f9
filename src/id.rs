//! Identifier generation and management
//!
//! Two kinds of identifiers exist in an editing session. A [`GameId`] is
//! assigned by the remote store and only ever parsed and displayed. An
//! [`ItemId`] names a question or an answer inside one game; new ones are
//! generated on the client as `question-<token>` or `answer-<token>`.
//!
//! The token is [`TOKEN_LENGTH`](crate::constants::id::TOKEN_LENGTH)
//! characters drawn uniformly from `[0-9a-z]`, giving 36^16 (about 2^82)
//! possible values. Generating one million ids in a process collides with
//! probability below 10^-13, so no server-side check is relied upon.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Characters a generated token is drawn from
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The identifier of a game in the remote store
///
/// Game IDs are opaque numbers chosen by the store. They are displayed in
/// decimal, which is also the form used in store paths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct GameId(u64);

impl GameId {
    /// Wraps a raw store identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw store identifier
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = ParseIntError;

    /// Parses a game ID from its decimal representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string is not a decimal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// The kind of item an [`ItemId`] is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A question within a game
    Question,
    /// An answer within a question
    Answer,
}

impl Scope {
    /// The prefix generated ids of this scope start with
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

/// The identifier of a question or an answer
///
/// Persisted ids are kept exactly as loaded; only ids produced by
/// [`ItemId::generate`] are guaranteed to follow the `<scope>-<token>` shape.
/// The default id is empty and stands for an id missing from a payload.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh identifier for the given scope
    ///
    /// The result is never empty and, with overwhelming probability,
    /// distinct from every other id generated in this process.
    pub fn generate(scope: Scope) -> Self {
        let token: String = std::iter::repeat_with(|| {
            char::from(ALPHABET[fastrand::usize(..ALPHABET.len())])
        })
        .take(crate::constants::id::TOKEN_LENGTH)
        .collect();

        Self(format!("{}-{token}", scope.prefix()))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is missing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the scope encoded in the id prefix, if it has one
    pub fn scope(&self) -> Option<Scope> {
        let (prefix, _) = self.0.split_once('-')?;
        [Scope::Question, Scope::Answer]
            .into_iter()
            .find(|scope| scope.prefix() == prefix)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_has_scope_prefix() {
        let question = ItemId::generate(Scope::Question);
        let answer = ItemId::generate(Scope::Answer);

        assert!(question.as_str().starts_with("question-"));
        assert!(answer.as_str().starts_with("answer-"));
        assert_eq!(question.scope(), Some(Scope::Question));
        assert_eq!(answer.scope(), Some(Scope::Answer));
    }

    #[test]
    fn test_generate_token_shape() {
        let id = ItemId::generate(Scope::Answer);
        let token = id.as_str().strip_prefix("answer-").unwrap();

        assert_eq!(token.len(), crate::constants::id::TOKEN_LENGTH);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generate_distinct() {
        let ids: HashSet<ItemId> = (0..10_000)
            .map(|_| ItemId::generate(Scope::Question))
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_loaded_id_kept_verbatim() {
        let id = ItemId::from("q1");
        assert_eq!(id, "q1");
        assert_eq!(id.scope(), None);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"q1\"");
    }

    #[test]
    fn test_game_id_display_and_parse() {
        let id = GameId::from_str("123456789").unwrap();
        assert_eq!(id.get(), 123_456_789);
        assert_eq!(id.to_string(), "123456789");
    }

    #[test]
    fn test_game_id_from_str_invalid() {
        assert!(GameId::from_str("abc").is_err());
        assert!(GameId::from_str("").is_err());
        assert!(GameId::from_str("-5").is_err());
    }

    #[test]
    fn test_game_id_serialization() {
        let id = GameId::new(42);
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"42\"");

        let deserialized: GameId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, id);
    }
}
