//! The remote store seam
//!
//! The editor reads and writes whole games through a [`RemoteStore`]. The
//! contract mirrors the two endpoints the store offers:
//!
//! * `GET /admin/quiz/{gameId}` returns the game, or a payload with an
//!   `error` field when there is no such game;
//! * `PUT /admin/quiz/{gameId}` replaces the stored game with the body.
//!
//! There is no per-question endpoint and no version token, so every write is
//! a full replacement and the last writer wins.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use serde_json::{Value, json};
use thiserror::Error;

use crate::id::GameId;

/// Errors reported by a remote store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request did not complete
    #[error("transport failure: {0}")]
    Transport(String),
    /// The store answered with a failure status
    #[error("store rejected the request with status {status}")]
    Rejected {
        /// The status code returned by the store
        status: u16,
    },
    /// The payload could not be encoded or decoded
    #[error("malformed payload: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Codec(error.to_string())
    }
}

/// Request/response access to stored games
///
/// Implementations own the transport; the editor only sees JSON values.
pub trait RemoteStore {
    /// Reads a game
    ///
    /// A payload that carries an `error` field means the game does not
    /// exist, whatever status the transport reported.
    fn fetch(&self, id: GameId) -> impl Future<Output = Result<Value, StoreError>>;

    /// Replaces a game with the given document
    fn replace(&self, id: GameId, game: &Value) -> impl Future<Output = Result<(), StoreError>>;
}

impl<T: RemoteStore> RemoteStore for &T {
    fn fetch(&self, id: GameId) -> impl Future<Output = Result<Value, StoreError>> {
        (**self).fetch(id)
    }

    fn replace(&self, id: GameId, game: &Value) -> impl Future<Output = Result<(), StoreError>> {
        (**self).replace(id, game)
    }
}

/// A store that keeps games in memory
///
/// Unknown ids are answered with an error payload, like the real store.
/// Writes can be made to fail to exercise error handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<GameId, Value>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a game and returns the store
    #[must_use]
    pub fn with_game(self, id: GameId, game: Value) -> Self {
        self.insert(id, game);
        self
    }

    /// Adds or replaces a game
    pub fn insert(&self, id: GameId, game: Value) {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, game);
    }

    /// Returns the stored document of a game
    pub fn get(&self, id: GameId) -> Option<Value> {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Makes every following write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl RemoteStore for MemoryStore {
    async fn fetch(&self, id: GameId) -> Result<Value, StoreError> {
        Ok(self
            .get(id)
            .unwrap_or_else(|| json!({ "error": "Invalid quiz id" })))
    }

    async fn replace(&self, id: GameId, game: &Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Rejected { status: 503 });
        }

        self.insert(id, game.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
