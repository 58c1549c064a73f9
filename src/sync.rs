//! Loading, editing and persisting a game against the remote store
//!
//! A [`Controller`] drives one editing session for one game:
//!
//! ```text
//! Unloaded --load--> Loading --ok--> Ready --persist--> Saving --> Ready
//!                       |              |                      \--> ReadyWithError
//!                       \--error--> NotFound (terminal)
//!                                      \--enter_question--> QuestionReady
//! ```
//!
//! Edits apply synchronously to the loaded [`Document`] and never change the
//! state, whether they succeed or not. Persisting writes the whole game; a
//! failed write keeps every local edit and is not retried. Because `load` and
//! `persist` take `&mut self`, no two of them can be in flight for the same
//! controller, and no edit can interleave with them.

use thiserror::Error;
use tracing::{info, warn};
use web_time::SystemTime;

use crate::{
    document::{self, Document, Game, Question, QuestionEditor},
    edit::{Applied, Edit},
    id::{GameId, ItemId},
    options::{EditorOptions, PersistPolicy},
    store::{RemoteStore, StoreError},
};

/// Errors that can occur in an editing session
#[derive(Error, Debug)]
pub enum Error {
    /// The store has no such game; the session cannot continue
    #[error("game {0} not found")]
    NotFound(GameId),
    /// The operation is not valid in the current state
    #[error("operation not valid while the editor is {0:?}")]
    InvalidState(SyncState),
    /// Writing the game failed; local edits are kept
    #[error("failed to persist game: {0}")]
    Persist(#[from] StoreError),
    /// A document operation failed; the document is unchanged
    #[error(transparent)]
    Edit(#[from] document::Error),
}

/// The observable state of an editing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing has been loaded yet
    Unloaded,
    /// A load is in progress (or was abandoned)
    Loading,
    /// The game is loaded and editable
    Ready,
    /// The game is editable and the last persist failed
    ReadyWithError,
    /// The game is editable with one question in focus
    QuestionReady {
        /// The focused question
        question: ItemId,
        /// Whether the last persist failed
        persist_failed: bool,
    },
    /// A persist is in progress (or was abandoned)
    Saving,
    /// The game does not exist; terminal for this session
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unloaded,
    Loading,
    Ready,
    Saving,
    NotFound,
}

/// The game details as last loaded or persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDetails {
    name: String,
    thumbnail: Option<String>,
}

impl SavedDetails {
    fn of(game: &Game) -> Self {
        Self {
            name: game.name().to_owned(),
            thumbnail: game.thumbnail().map(str::to_owned),
        }
    }

    /// The saved game name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The saved thumbnail reference
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

/// One editing session of one game
#[derive(Debug)]
pub struct Controller<S> {
    store: S,
    options: EditorOptions,
    phase: Phase,
    document: Option<Document>,
    focus: Option<ItemId>,
    saved: Option<SavedDetails>,
    last_error: Option<StoreError>,
    last_saved_at: Option<SystemTime>,
}

impl<S: RemoteStore> Controller<S> {
    /// Creates an unloaded session with default options
    pub fn new(store: S) -> Self {
        Self::with_options(store, EditorOptions::default())
    }

    /// Creates an unloaded session
    pub fn with_options(store: S, options: EditorOptions) -> Self {
        Self {
            store,
            options,
            phase: Phase::Unloaded,
            document: None,
            focus: None,
            saved: None,
            last_error: None,
            last_saved_at: None,
        }
    }

    /// The store this session reads from and writes to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The options of this session
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The current state
    pub fn state(&self) -> SyncState {
        match self.phase {
            Phase::Unloaded => SyncState::Unloaded,
            Phase::Loading => SyncState::Loading,
            Phase::Saving => SyncState::Saving,
            Phase::NotFound => SyncState::NotFound,
            Phase::Ready => match self.focused() {
                Some(id) => SyncState::QuestionReady {
                    question: id.clone(),
                    persist_failed: self.last_error.is_some(),
                },
                None if self.last_error.is_some() => SyncState::ReadyWithError,
                None => SyncState::Ready,
            },
        }
    }

    /// Loads the game to edit
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the store reports an error, cannot be
    /// reached, or returns something that is not a game; the session is then
    /// over. Returns [`Error::InvalidState`] if a game was already loaded.
    pub async fn load(&mut self, id: GameId) -> Result<(), Error> {
        if !matches!(self.phase, Phase::Unloaded | Phase::Loading) {
            return Err(Error::InvalidState(self.state()));
        }

        self.phase = Phase::Loading;
        info!(game = %id, "loading game");

        let game = match self.store.fetch(id).await {
            Ok(payload) if payload.get("error").is_some_and(|error| !error.is_null()) => {
                warn!(game = %id, error = %payload["error"], "store reported an error");
                None
            }
            Ok(payload) => serde_json::from_value::<Game>(payload)
                .inspect_err(|error| warn!(game = %id, %error, "store returned a malformed game"))
                .ok(),
            Err(error) => {
                warn!(game = %id, %error, "failed to fetch game");
                None
            }
        };

        let Some(game) = game else {
            self.phase = Phase::NotFound;
            return Err(Error::NotFound(id));
        };

        let document = Document::new(id, game, &self.options);
        self.saved = Some(SavedDetails::of(document.game()));
        self.document = Some(document);
        self.phase = Phase::Ready;
        info!(game = %id, "game ready");
        Ok(())
    }

    /// The loaded document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before a game is loaded or after it
    /// was not found.
    pub fn document(&self) -> Result<&Document, Error> {
        match (self.phase, &self.document) {
            (Phase::Ready | Phase::Saving, Some(document)) => Ok(document),
            _ => Err(Error::InvalidState(self.state())),
        }
    }

    /// The loaded document, for edits that stay local
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before a game is loaded or after it
    /// was not found.
    pub fn document_mut(&mut self) -> Result<&mut Document, Error> {
        let state = self.state();
        match (self.phase, &mut self.document) {
            (Phase::Ready | Phase::Saving, Some(document)) => Ok(document),
            _ => Err(Error::InvalidState(state)),
        }
    }

    /// The game as currently edited
    pub fn current_game(&self) -> Option<&Game> {
        self.document().ok().map(Document::game)
    }

    /// A question of the game as currently edited
    pub fn current_question(&self, id: &ItemId) -> Option<&Question> {
        self.document().ok()?.question(id)
    }

    /// Whether there are edits that have not been persisted
    pub fn is_dirty(&self) -> bool {
        self.document().is_ok_and(Document::is_dirty)
    }

    /// The name and thumbnail as last loaded or persisted
    pub fn saved(&self) -> Option<&SavedDetails> {
        self.saved.as_ref()
    }

    /// Whether the name or thumbnail differ from the saved ones
    pub fn has_unsaved_details(&self) -> bool {
        match (self.current_game(), &self.saved) {
            (Some(game), Some(saved)) => SavedDetails::of(game) != *saved,
            _ => false,
        }
    }

    /// The error of the last persist, if it failed
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// When the game was last persisted by this session
    pub fn last_saved_at(&self) -> Option<SystemTime> {
        self.last_saved_at
    }

    /// Applies an edit, persisting afterwards when the policy asks for it
    ///
    /// With [`PersistPolicy::OnStructuralChange`], adding or deleting a
    /// question writes the whole game right away. A failure of that write is
    /// recorded in [`Controller::last_error`] and does not fail the edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no game is loaded, or
    /// [`Error::Edit`] if the document operation fails.
    pub async fn apply(&mut self, edit: Edit) -> Result<Applied, Error> {
        let write_through =
            edit.is_structural() && self.options.persist_policy == PersistPolicy::OnStructuralChange;

        let applied = edit.apply(self.document_mut()?)?;

        if write_through {
            if let Err(error) = self.persist().await {
                warn!(%error, "write-through after structural edit failed");
            }
        }

        Ok(applied)
    }

    /// Writes the whole game to the store
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no game is loaded, or
    /// [`Error::Persist`] if the store rejects the write. Local edits are
    /// kept either way.
    pub async fn persist(&mut self) -> Result<(), Error> {
        let document = self.document()?;
        let id = document.id();
        let body = document.to_value().map_err(StoreError::from)?;

        self.phase = Phase::Saving;
        info!(game = %id, "persisting game");
        let result = self.store.replace(id, &body).await;
        self.phase = Phase::Ready;

        match result {
            Ok(()) => {
                if let Some(document) = self.document.as_mut() {
                    document.mark_clean();
                    self.saved = Some(SavedDetails::of(document.game()));
                }
                self.last_error = None;
                self.last_saved_at = Some(SystemTime::now());
                info!(game = %id, "game persisted");
                Ok(())
            }
            Err(error) => {
                warn!(game = %id, %error, "failed to persist game");
                self.last_error = Some(error.clone());
                Err(Error::Persist(error))
            }
        }
    }

    /// Focuses one question for editing
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no game is loaded, or
    /// [`Error::Edit`] if the question does not exist.
    pub fn enter_question(&mut self, id: &ItemId) -> Result<(), Error> {
        if self.document()?.question(id).is_none() {
            return Err(document::Error::QuestionNotFound(id.clone()).into());
        }

        self.focus = Some(id.clone());
        Ok(())
    }

    /// Leaves the focused question
    pub fn leave_question(&mut self) {
        self.focus = None;
    }

    /// An editor for the focused question
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no question is focused, or
    /// [`Error::Edit`] if the focused question was deleted.
    pub fn question_editor(&mut self) -> Result<QuestionEditor<'_>, Error> {
        let Some(id) = self.focus.clone() else {
            return Err(Error::InvalidState(self.state()));
        };

        Ok(self.document_mut()?.question_mut(&id)?)
    }

    fn focused(&self) -> Option<&ItemId> {
        let id = self.focus.as_ref()?;
        self.document.as_ref()?.question(id).map(Question::id)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        document::QuestionPatch,
        media::MediaSource,
        store::MemoryStore,
    };

    const G1: GameId = GameId::new(1);

    fn g1_json() -> Value {
        json!({
            "name": "Science",
            "thumbnail": "https://example.com/atom.png",
            "owner": "sam@example.com",
            "active": false,
            "oldSessions": [4417, 9021],
            "questions": [
                {
                    "question": {
                        "id": "q1",
                        "title": "Symbol for water?",
                        "media": null,
                        "type": "single",
                        "timeLimit": 7,
                        "point": 200,
                        "answers": [
                            { "answer": { "id": "a1", "content": "H2O", "isCorrect": true } },
                            { "answer": { "id": "a2", "content": "CO2", "isCorrect": false } }
                        ]
                    }
                }
            ]
        })
    }

    fn q1() -> ItemId {
        ItemId::from("q1")
    }

    async fn ready(store: &MemoryStore, options: EditorOptions) -> Controller<&MemoryStore> {
        let mut controller = Controller::with_options(store, options);
        controller.load(G1).await.unwrap();
        controller
    }

    fn manual() -> EditorOptions {
        EditorOptions {
            persist_policy: PersistPolicy::Manual,
            ..EditorOptions::default()
        }
    }

    #[tokio::test]
    async fn test_load_populates_document() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let controller = ready(&store, EditorOptions::default()).await;

        assert_eq!(controller.state(), SyncState::Ready);
        assert_eq!(controller.current_game().unwrap().name(), "Science");
        assert_eq!(
            controller.current_question(&q1()).unwrap().time_limit(),
            7
        );
        assert!(!controller.is_dirty());
        assert_eq!(controller.saved().unwrap().name(), "Science");
        assert_eq!(
            controller.saved().unwrap().thumbnail(),
            Some("https://example.com/atom.png")
        );
    }

    #[tokio::test]
    async fn test_missing_game_is_terminal() {
        let store = MemoryStore::new();
        let mut controller = Controller::new(&store);

        let result = controller.load(G1).await;
        assert!(matches!(result, Err(Error::NotFound(id)) if id == G1));
        assert_eq!(controller.state(), SyncState::NotFound);

        assert!(matches!(controller.document_mut(), Err(Error::InvalidState(SyncState::NotFound))));
        assert!(matches!(controller.persist().await, Err(Error::InvalidState(_))));
        assert!(matches!(controller.load(G1).await, Err(Error::InvalidState(_))));
        assert!(controller.current_game().is_none());
    }

    #[tokio::test]
    async fn test_error_payload_is_not_found() {
        let store = MemoryStore::new().with_game(G1, json!({ "error": "Invalid token" }));
        let mut controller = Controller::new(&store);

        assert!(matches!(controller.load(G1).await, Err(Error::NotFound(_))));
        assert_eq!(controller.state(), SyncState::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_not_found() {
        let store = MemoryStore::new().with_game(G1, json!({ "name": "Broken", "questions": 3 }));
        let mut controller = Controller::new(&store);

        assert!(matches!(controller.load(G1).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_edits_before_load_are_invalid() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = Controller::new(&store);

        assert!(matches!(
            controller.apply(Edit::AddQuestion).await,
            Err(Error::InvalidState(SyncState::Unloaded))
        ));
        assert!(matches!(controller.enter_question(&q1()), Err(Error::InvalidState(_))));
        assert!(!controller.is_dirty());
    }

    #[tokio::test]
    async fn test_persist_without_edits_round_trips() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, EditorOptions::default()).await;

        controller.persist().await.unwrap();

        assert_eq!(store.get(G1), Some(g1_json()));
        assert_eq!(store.write_count(), 1);
        assert!(controller.last_saved_at().is_some());
    }

    #[tokio::test]
    async fn test_out_of_table_time_limit_persists_unchanged() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        controller
            .apply(Edit::UpdateQuestionFields {
                question: q1(),
                patch: QuestionPatch::default().time_limit(999),
            })
            .await
            .unwrap();
        controller.persist().await.unwrap();

        let stored = store.get(G1).unwrap();
        assert_eq!(stored["questions"][0]["question"]["timeLimit"], 999);
        assert_eq!(stored["questions"][0]["question"]["point"], 200);
    }

    #[tokio::test]
    async fn test_capacity_scenario() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        for _ in 0..4 {
            let applied = controller
                .apply(Edit::AddAnswer { question: q1() })
                .await
                .unwrap();
            assert!(matches!(applied, Applied::Created(_)));
        }

        let result = controller.apply(Edit::AddAnswer { question: q1() }).await;
        assert!(matches!(
            result,
            Err(Error::Edit(document::Error::Capacity { .. }))
        ));
        assert_eq!(controller.current_question(&q1()).unwrap().answers().len(), 6);
        assert_eq!(controller.state(), SyncState::Ready);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_edits() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        controller
            .apply(Edit::RenameGame {
                name: "Chemistry".to_string(),
            })
            .await
            .unwrap();
        assert!(controller.has_unsaved_details());

        store.set_fail_writes(true);
        let result = controller.persist().await;
        assert!(matches!(result, Err(Error::Persist(StoreError::Rejected { status: 503 }))));
        assert_eq!(controller.state(), SyncState::ReadyWithError);
        assert_eq!(controller.current_game().unwrap().name(), "Chemistry");
        assert!(controller.is_dirty());
        assert_eq!(store.get(G1), Some(g1_json()));

        store.set_fail_writes(false);
        controller.persist().await.unwrap();
        assert_eq!(controller.state(), SyncState::Ready);
        assert!(controller.last_error().is_none());
        assert!(!controller.is_dirty());
        assert!(!controller.has_unsaved_details());
        assert_eq!(controller.saved().unwrap().name(), "Chemistry");
        assert_eq!(store.get(G1).unwrap()["name"], "Chemistry");
    }

    #[tokio::test]
    async fn test_structural_edits_write_through() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, EditorOptions::default()).await;

        let Applied::Created(added) = controller.apply(Edit::AddQuestion).await.unwrap() else {
            panic!("expected a created question");
        };
        assert_eq!(store.write_count(), 1);
        assert!(!controller.is_dirty());

        controller
            .apply(Edit::AddAnswer {
                question: added.clone(),
            })
            .await
            .unwrap();
        assert_eq!(store.write_count(), 1);
        assert!(controller.is_dirty());

        controller
            .apply(Edit::DeleteQuestion { question: added })
            .await
            .unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get(G1), Some(g1_json()));
    }

    #[tokio::test]
    async fn test_failed_write_through_keeps_edit() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, EditorOptions::default()).await;
        store.set_fail_writes(true);

        controller
            .apply(Edit::DeleteQuestion { question: q1() })
            .await
            .unwrap();

        assert!(controller.current_question(&q1()).is_none());
        assert_eq!(controller.state(), SyncState::ReadyWithError);
        assert!(controller.is_dirty());
    }

    #[tokio::test]
    async fn test_manual_policy_stays_local() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        controller.apply(Edit::AddQuestion).await.unwrap();
        assert_eq!(store.write_count(), 0);
        assert!(controller.is_dirty());
    }

    #[tokio::test]
    async fn test_question_focus() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        assert!(matches!(
            controller.enter_question(&ItemId::from("q404")),
            Err(Error::Edit(document::Error::QuestionNotFound(_)))
        ));
        assert!(matches!(controller.question_editor(), Err(Error::InvalidState(SyncState::Ready))));

        controller.enter_question(&q1()).unwrap();
        assert_eq!(
            controller.state(),
            SyncState::QuestionReady {
                question: q1(),
                persist_failed: false
            }
        );

        {
            let mut editor = controller.question_editor().unwrap();
            let answer = editor.add_answer().unwrap();
            editor.toggle_answer_correct(&answer).unwrap();
            editor
                .update_fields(
                    QuestionPatch::default()
                        .title("Symbol for table salt?")
                        .media(MediaSource::Url("https://example.com/salt.png".to_string())),
                )
                .unwrap();
        }
        let question = controller.current_question(&q1()).unwrap();
        assert_eq!(question.answers().len(), 3);
        assert_eq!(question.title(), "Symbol for table salt?");
        assert!(controller.is_dirty());

        controller.leave_question();
        assert_eq!(controller.state(), SyncState::Ready);
    }

    #[tokio::test]
    async fn test_deleting_focused_question_leaves_focus() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        controller.enter_question(&q1()).unwrap();
        controller
            .document_mut()
            .unwrap()
            .delete_question(&q1())
            .unwrap();

        assert_eq!(controller.state(), SyncState::Ready);
        assert!(matches!(
            controller.question_editor(),
            Err(Error::Edit(document::Error::QuestionNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_thumbnail_edit_is_unsaved_detail() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;

        controller
            .apply(Edit::SetThumbnail {
                source: MediaSource::Clear,
            })
            .await
            .unwrap();
        assert!(controller.has_unsaved_details());
        assert_eq!(controller.current_game().unwrap().thumbnail(), None);

        controller.persist().await.unwrap();
        assert_eq!(store.get(G1).unwrap()["thumbnail"], Value::Null);
        assert_eq!(controller.saved().unwrap().thumbnail(), None);
    }

    #[tokio::test]
    async fn test_focused_state_shows_persist_failure() {
        let store = MemoryStore::new().with_game(G1, g1_json());
        let mut controller = ready(&store, manual()).await;
        controller.enter_question(&q1()).unwrap();

        store.set_fail_writes(true);
        assert!(controller.persist().await.is_err());
        assert_eq!(
            controller.state(),
            SyncState::QuestionReady {
                question: q1(),
                persist_failed: true
            }
        );

        store.set_fail_writes(false);
        controller.persist().await.unwrap();
        assert_eq!(
            controller.state(),
            SyncState::QuestionReady {
                question: q1(),
                persist_failed: false
            }
        );

        store.set_fail_writes(true);
        assert!(controller.persist().await.is_err());
        controller.leave_question();
        assert_eq!(controller.state(), SyncState::ReadyWithError);
    }

    #[tokio::test]
    async fn test_round_trip_of_older_editor_game() {
        let stored = json!({
            "name": "G",
            "questions": [
                {
                    "question": {
                        "id": "question-abc",
                        "title": "New Question",
                        "type": "single",
                        "timeLimit": 10,
                        "points": 10,
                        "answers": []
                    }
                }
            ]
        });
        let store = MemoryStore::new().with_game(G1, stored.clone());
        let mut controller = ready(&store, manual()).await;

        controller.persist().await.unwrap();

        assert_eq!(store.get(G1), Some(stored));
    }

    #[tokio::test]
    async fn test_bare_answer_entries_load_and_repair() {
        let store = MemoryStore::new().with_game(
            G1,
            json!({
                "name": "G",
                "questions": [
                    {
                        "question": {
                            "id": "question-abc",
                            "title": "New Question",
                            "type": "single",
                            "timeLimit": 10,
                            "points": 10,
                            "answers": [{ "answer": "" }, { "answer": "" }]
                        }
                    }
                ]
            }),
        );
        let mut controller = Controller::with_options(&store, manual());

        controller.load(G1).await.unwrap();
        assert_eq!(controller.state(), SyncState::Ready);
        assert!(controller.is_dirty());

        let question = ItemId::from("question-abc");
        assert_eq!(controller.current_question(&question).unwrap().answers().len(), 2);

        controller.persist().await.unwrap();
        let answers = &store.get(G1).unwrap()["questions"][0]["question"]["answers"];
        assert_eq!(answers[0]["answer"]["content"], "");
        assert_eq!(answers[1]["answer"]["isCorrect"], false);
        assert!(answers[0]["answer"]["id"].as_str().unwrap().starts_with("answer-"));
        assert!(!controller.is_dirty());
    }
}
