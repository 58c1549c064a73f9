//! # Quiz Editor Library
//!
//! This library provides the authoring core of a quiz game: loading a game
//! from a remote store, editing its questions and answers, and writing it
//! back. It keeps the stored document shape intact, including values and
//! fields the editor does not understand.
//!
//! The pieces, from the bottom up:
//!
//! * [`id`]: game ids and generated question/answer ids
//! * [`tables`]: the fixed choices offered for question type, time limit
//!   and points
//! * [`media`]: placeholder resolution and embedding of uploaded images
//! * [`document`]: the game document and every editing operation on it
//! * [`edit`]: editing operations as values
//! * [`store`]: the remote store seam and an in-memory store
//! * [`sync`]: the controller that loads, edits and persists one game
//! * [`options`]: configuration of an editing session

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod constants;

pub mod document;
pub mod edit;
pub mod id;
pub mod media;
pub mod options;
pub mod store;
pub mod sync;
pub mod tables;

pub use document::{Answer, Document, Game, Issue, Question, QuestionEditor, QuestionPatch};
pub use edit::{Applied, Edit};
pub use id::{GameId, ItemId};
pub use media::{MediaResolver, MediaSource};
pub use options::{EditorOptions, PersistPolicy};
pub use store::{MemoryStore, RemoteStore, StoreError};
pub use sync::{Controller, SyncState};
