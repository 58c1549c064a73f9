//! The in-memory game document and its editing operations
//!
//! A [`Document`] owns one [`Game`] loaded from the remote store together with
//! its ordered questions and their ordered answers. All changes go through the
//! operations on [`Document`] (or a [`QuestionEditor`] scoped to one
//! question), which keep these invariants:
//!
//! * question ids are unique within the game, answer ids within a question;
//! * no operation grows a question past
//!   [`MAX_ANSWER_COUNT`](crate::constants::question::MAX_ANSWER_COUNT)
//!   answers;
//! * deletions keep the relative order of what remains;
//! * an operation either applies completely or fails without changing
//!   anything.
//!
//! Any successful operation marks the document dirty until it is persisted.

use std::collections::HashSet;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    constants,
    id::{GameId, ItemId, Scope},
    media::{self, MediaResolver, MediaSource, Purpose},
    options::{EditorOptions, TemplateAnswers},
    tables::{self, QuestionKind, Selection},
};

/// Errors that can occur when editing a document
#[derive(Error, Debug)]
pub enum Error {
    /// The question already holds the maximum number of answers
    #[error("question {question} already has the maximum of {max} answers")]
    Capacity {
        /// The question that is full
        question: ItemId,
        /// The answer limit
        max: usize,
    },
    /// No question with this id exists in the game
    #[error("question {0} not found")]
    QuestionNotFound(ItemId),
    /// No answer with this id exists in the question
    #[error("answer {answer} not found in question {question}")]
    AnswerNotFound {
        /// The question that was searched
        question: ItemId,
        /// The answer that was not found
        answer: ItemId,
    },
    /// Uploaded media could not be embedded; stored media is unchanged
    #[error(transparent)]
    Media(#[from] media::Error),
}

/// A quiz game as stored remotely
///
/// Fields this editor does not know about are kept and written back
/// unchanged. Known fields that were absent from the payload stay absent
/// until they are edited, so a game that is loaded and persisted without
/// edits is written back as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = constants::game::MAX_NAME_LENGTH))]
    name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[garde(skip)]
    thumbnail: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    owner: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[garde(skip)]
    active: Option<Option<bool>>,
    #[serde(default, with = "entries::questions")]
    #[garde(dive)]
    questions: Vec<Question>,
    #[serde(flatten)]
    #[garde(skip)]
    extra: Map<String, Value>,
}

/// One question of a game
///
/// Points are stored under `point`, but games written by older editors use
/// `points`; whichever key was loaded is the one written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    #[garde(skip)]
    id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = constants::question::MAX_TITLE_LENGTH))]
    title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[garde(skip)]
    media: Option<Option<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    kind: Option<QuestionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    time_limit: Option<u32>,
    #[serde(rename = "point", default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    point: Option<u32>,
    #[serde(rename = "points", default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    legacy_points: Option<u32>,
    #[serde(default, with = "entries::answers")]
    #[garde(
        length(
            min = constants::question::MIN_READY_ANSWER_COUNT,
            max = constants::question::MAX_ANSWER_COUNT
        ),
        dive
    )]
    answers: Vec<Answer>,
    #[serde(flatten)]
    #[garde(skip)]
    extra: Map<String, Value>,
}

/// One selectable answer of a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    #[garde(skip)]
    id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = constants::answer::MAX_CONTENT_LENGTH))]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    is_correct: Option<bool>,
    #[serde(flatten)]
    #[garde(skip)]
    extra: Map<String, Value>,
}

static DEFAULT_KIND: QuestionKind = QuestionKind::Single;

/// The persisted shape wraps every question and answer in a single-key
/// object: `[{ "question": { .. } }]` and `[{ "answer": { .. } }]`.
mod entries {
    use itertools::Itertools;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub mod questions {
        use super::*;
        use crate::document::Question;

        #[derive(Serialize)]
        struct Entry<'a> {
            question: &'a Question,
        }

        #[derive(Deserialize)]
        struct OwnedEntry {
            question: Question,
        }

        pub fn serialize<S: Serializer>(value: &[Question], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(value.iter().map(|question| Entry { question }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Question>, D::Error> {
            let entries = Vec::<OwnedEntry>::deserialize(deserializer)?;
            Ok(entries.into_iter().map(|entry| entry.question).collect_vec())
        }
    }

    pub mod answers {
        use super::*;
        use crate::document::Answer;

        #[derive(Serialize)]
        struct Entry<'a> {
            answer: &'a Answer,
        }

        /// Older editors stored new answers as `{ "answer": "" }`
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Slot {
            Answer(Answer),
            Legacy(serde_json::Value),
        }

        #[derive(Deserialize)]
        struct OwnedEntry {
            answer: Slot,
        }

        pub fn serialize<S: Serializer>(value: &[Answer], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(value.iter().map(|answer| Entry { answer }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Answer>, D::Error> {
            let entries = Vec::<OwnedEntry>::deserialize(deserializer)?;
            Ok(entries
                .into_iter()
                .map(|entry| match entry.answer {
                    Slot::Answer(answer) => answer,
                    Slot::Legacy(value) => Answer::from_legacy(value),
                })
                .collect_vec())
        }
    }
}

impl Game {
    /// Creates an empty, never started game
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            thumbnail: None,
            owner: Some(owner.into()),
            active: None,
            questions: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The display name of the game
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The stored thumbnail reference, if any
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(Option::as_deref)
    }

    /// The identity of the owner
    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or_default()
    }

    /// Whether a session is running (`Some(true)`), has ended
    /// (`Some(false)`) or was never started (`None`)
    pub fn active(&self) -> Option<bool> {
        self.active.flatten()
    }

    /// The questions in play order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Finds a question by id
    pub fn question(&self, id: &ItemId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == *id)
    }
}

impl Question {
    fn from_template(template: TemplateAnswers) -> Self {
        let answers = match template {
            TemplateAnswers::Empty => Vec::new(),
            TemplateAnswers::TwoBlank => vec![Answer::blank(), Answer::blank()],
        };

        Self {
            id: ItemId::generate(Scope::Question),
            title: Some(constants::question::DEFAULT_TITLE.to_owned()),
            media: Some(None),
            kind: Some(QuestionKind::Single),
            time_limit: Some(constants::question::DEFAULT_TIME_LIMIT),
            point: Some(constants::question::DEFAULT_POINTS),
            legacy_points: None,
            answers,
            extra: Map::new(),
        }
    }

    /// The question id
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// The question text
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or(constants::question::DEFAULT_TITLE)
    }

    /// The stored media reference, if any
    pub fn media(&self) -> Option<&str> {
        self.media.as_ref().and_then(Option::as_deref)
    }

    /// The question type
    pub fn kind(&self) -> &QuestionKind {
        self.kind.as_ref().unwrap_or(&DEFAULT_KIND)
    }

    /// The answer time limit in seconds
    pub fn time_limit(&self) -> u32 {
        self.time_limit
            .unwrap_or(constants::question::DEFAULT_TIME_LIMIT)
    }

    /// The points awarded for a correct answer
    pub fn points(&self) -> u32 {
        self.point
            .or(self.legacy_points)
            .unwrap_or(constants::question::DEFAULT_POINTS)
    }

    /// How the time limit appears in the time picker
    pub fn time_limit_selection(&self) -> Selection {
        tables::TIME_LIMITS.selection(&self.time_limit())
    }

    /// How the points appear in the points picker
    pub fn points_selection(&self) -> Selection {
        tables::POINTS.selection(&self.points())
    }

    /// The answers in display order
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Finds an answer by id
    pub fn answer(&self, id: &ItemId) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.id == *id)
    }

    /// Whether another answer can be added
    pub fn is_full(&self) -> bool {
        self.answers.len() >= constants::question::MAX_ANSWER_COUNT
    }

    /// Writes the points under every key the question was loaded with
    fn set_points(&mut self, points: u32) {
        if self.legacy_points.is_some() {
            self.legacy_points = Some(points);
        }
        if self.point.is_some() || self.legacy_points.is_none() {
            self.point = Some(points);
        }
    }

    fn answer_mut(&mut self, id: &ItemId) -> Result<&mut Answer, Error> {
        match self.answers.iter_mut().find(|answer| answer.id == *id) {
            Some(answer) => Ok(answer),
            None => Err(Error::AnswerNotFound {
                question: self.id.clone(),
                answer: id.clone(),
            }),
        }
    }
}

impl Answer {
    fn blank() -> Self {
        Self {
            id: ItemId::generate(Scope::Answer),
            content: Some(String::new()),
            is_correct: Some(false),
            extra: Map::new(),
        }
    }

    /// Turns a bare `answer` entry into an answer without an id
    ///
    /// A string becomes the content; anything else becomes a blank answer.
    /// The missing id is assigned when the game is taken into a document.
    fn from_legacy(value: Value) -> Self {
        let content = match value {
            Value::String(content) => content,
            Value::Null => String::new(),
            other => {
                warn!(entry = %other, "replaced malformed answer with a blank one");
                String::new()
            }
        };

        Self {
            id: ItemId::default(),
            content: Some(content),
            is_correct: Some(false),
            extra: Map::new(),
        }
    }

    /// The answer id
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// The answer text
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Whether this answer is marked correct
    pub fn is_correct(&self) -> bool {
        self.is_correct.unwrap_or_default()
    }
}

/// A partial update of a question's fields
///
/// Every field that is `Some` overwrites the stored value; the rest are left
/// alone.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPatch {
    /// New question text
    pub title: Option<String>,
    /// New media
    pub media: Option<MediaSource>,
    /// New question type
    pub kind: Option<QuestionKind>,
    /// New time limit in seconds
    pub time_limit: Option<u32>,
    /// New point value
    pub points: Option<u32>,
}

impl QuestionPatch {
    /// Sets the new title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the new media
    #[must_use]
    pub fn media(mut self, media: MediaSource) -> Self {
        self.media = Some(media);
        self
    }

    /// Sets the new question type
    #[must_use]
    pub fn kind(mut self, kind: QuestionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the new time limit
    #[must_use]
    pub fn time_limit(mut self, seconds: u32) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Sets the new point value
    #[must_use]
    pub fn points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A problem that would make a game awkward to play
///
/// Issues are advisory: they never block an edit or a persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A field breaks a length rule
    Field {
        /// Location of the field, such as `questions[0].answers`
        path: String,
        /// What is wrong with it
        message: String,
    },
    /// A single-select question has more than one answer marked correct
    SeveralCorrect(ItemId),
}

/// The game being edited, with its editing operations
#[derive(Debug, Clone)]
pub struct Document {
    id: GameId,
    game: Game,
    template: TemplateAnswers,
    resolver: MediaResolver,
    dirty: bool,
}

impl Document {
    /// Takes ownership of a loaded game
    ///
    /// Missing or duplicate question ids, and missing or duplicate answer
    /// ids within a question, are replaced with fresh ids; the document is
    /// then dirty.
    pub fn new(id: GameId, mut game: Game, options: &EditorOptions) -> Self {
        let dirty = repair_ids(&mut game);

        Self {
            id,
            game,
            template: options.template_answers,
            resolver: MediaResolver::new(options),
            dirty,
        }
    }

    /// The id of the game in the remote store
    pub fn id(&self) -> GameId {
        self.id
    }

    /// The game as currently edited
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Finds a question by id
    pub fn question(&self, id: &ItemId) -> Option<&Question> {
        self.game.question(id)
    }

    /// The resolver used for this document's media
    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    /// Whether the document changed since it was loaded or last persisted
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Renames the game; an empty name is allowed
    pub fn rename_game(&mut self, name: impl Into<String>) {
        self.game.name = Some(name.into());
        self.dirty = true;
        debug!(game = %self.id, "renamed game");
    }

    /// Replaces the thumbnail
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] if an upload cannot be embedded; the current
    /// thumbnail is kept.
    pub fn set_thumbnail(&mut self, source: MediaSource) -> Result<(), Error> {
        let thumbnail = self.resolver.normalize(source, Purpose::Thumbnail)?;
        self.game.thumbnail = Some(thumbnail);
        self.dirty = true;
        debug!(game = %self.id, "replaced thumbnail");
        Ok(())
    }

    /// Appends a question built from the template and returns its id
    pub fn add_question(&mut self) -> ItemId {
        let question = Question::from_template(self.template);
        let id = question.id.clone();
        self.game.questions.push(question);
        self.dirty = true;
        debug!(game = %self.id, question = %id, "added question");
        id
    }

    /// Removes a question and returns it
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestionNotFound`] if no question has this id.
    pub fn delete_question(&mut self, id: &ItemId) -> Result<Question, Error> {
        let index = self
            .game
            .questions
            .iter()
            .position(|question| question.id == *id)
            .ok_or_else(|| Error::QuestionNotFound(id.clone()))?;

        let question = self.game.questions.remove(index);
        self.dirty = true;
        debug!(game = %self.id, question = %id, "deleted question");
        Ok(question)
    }

    /// Returns an editor scoped to one question
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestionNotFound`] if no question has this id.
    pub fn question_mut(&mut self, id: &ItemId) -> Result<QuestionEditor<'_>, Error> {
        let Self {
            game,
            resolver,
            dirty,
            ..
        } = self;

        let question = game
            .questions
            .iter_mut()
            .find(|question| question.id == *id)
            .ok_or_else(|| Error::QuestionNotFound(id.clone()))?;

        Ok(QuestionEditor {
            question,
            resolver,
            dirty,
        })
    }

    /// Applies a partial update to a question
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestionNotFound`] for an unknown id or
    /// [`Error::Media`] if new media cannot be embedded. In both cases no
    /// field changes.
    pub fn update_question_fields(&mut self, id: &ItemId, patch: QuestionPatch) -> Result<(), Error> {
        self.question_mut(id)?.update_fields(patch)
    }

    /// Appends an empty answer to a question and returns its id
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestionNotFound`] for an unknown question or
    /// [`Error::Capacity`] if the question is full.
    pub fn add_answer(&mut self, question: &ItemId) -> Result<ItemId, Error> {
        self.question_mut(question)?.add_answer()
    }

    /// Replaces the content of an answer
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the question or the answer does not exist.
    pub fn update_answer_content(
        &mut self,
        question: &ItemId,
        answer: &ItemId,
        content: impl Into<String>,
    ) -> Result<(), Error> {
        self.question_mut(question)?
            .update_answer_content(answer, content)
    }

    /// Flips whether an answer is correct and returns the new value
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the question or the answer does not exist.
    pub fn toggle_answer_correct(&mut self, question: &ItemId, answer: &ItemId) -> Result<bool, Error> {
        self.question_mut(question)?.toggle_answer_correct(answer)
    }

    /// Removes an answer and returns it
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the question or the answer does not exist.
    pub fn delete_answer(&mut self, question: &ItemId, answer: &ItemId) -> Result<Answer, Error> {
        self.question_mut(question)?.delete_answer(answer)
    }

    /// Lists what would make the game awkward to play
    pub fn readiness(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = match self.game.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|(path, error)| Issue::Field {
                    path: path.to_string(),
                    message: error.message().to_owned(),
                })
                .collect_vec(),
        };

        issues.extend(
            self.game
                .questions
                .iter()
                .filter(|question| *question.kind() == QuestionKind::Single)
                .filter(|question| question.answers.iter().filter(|a| a.is_correct()).count() > 1)
                .map(|question| Issue::SeveralCorrect(question.id.clone())),
        );

        issues
    }

    /// Serializes the whole game in its persisted shape
    ///
    /// # Errors
    ///
    /// Returns an error only if a retained unknown field cannot be
    /// serialized, which cannot happen for values that were parsed from JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.game)
    }
}

/// Editing operations scoped to a single question
#[derive(Debug)]
pub struct QuestionEditor<'a> {
    question: &'a mut Question,
    resolver: &'a MediaResolver,
    dirty: &'a mut bool,
}

impl QuestionEditor<'_> {
    /// The question being edited
    pub fn question(&self) -> &Question {
        self.question
    }

    /// Applies a partial update to the question
    ///
    /// # Errors
    ///
    /// Returns [`Error::Media`] if new media cannot be embedded; no field
    /// changes in that case.
    pub fn update_fields(&mut self, patch: QuestionPatch) -> Result<(), Error> {
        let QuestionPatch {
            title,
            media,
            kind,
            time_limit,
            points,
        } = patch;

        let media = media
            .map(|source| self.resolver.normalize(source, Purpose::QuestionMedia))
            .transpose()?;

        if let Some(title) = title {
            self.question.title = Some(title);
        }
        if let Some(media) = media {
            self.question.media = Some(media);
        }
        if let Some(kind) = kind {
            self.question.kind = Some(kind);
        }
        if let Some(time_limit) = time_limit {
            self.question.time_limit = Some(time_limit);
        }
        if let Some(points) = points {
            self.question.set_points(points);
        }

        *self.dirty = true;
        debug!(question = %self.question.id, "updated question fields");
        Ok(())
    }

    /// Appends an empty answer and returns its id
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capacity`] if the question already holds the maximum
    /// number of answers.
    pub fn add_answer(&mut self) -> Result<ItemId, Error> {
        if self.question.is_full() {
            debug!(question = %self.question.id, "question is full");
            return Err(Error::Capacity {
                question: self.question.id.clone(),
                max: constants::question::MAX_ANSWER_COUNT,
            });
        }

        let answer = Answer::blank();
        let id = answer.id.clone();
        self.question.answers.push(answer);
        *self.dirty = true;
        debug!(question = %self.question.id, answer = %id, "added answer");
        Ok(id)
    }

    /// Replaces the content of an answer
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnswerNotFound`] if the answer does not exist.
    pub fn update_answer_content(&mut self, answer: &ItemId, content: impl Into<String>) -> Result<(), Error> {
        self.question.answer_mut(answer)?.content = Some(content.into());
        *self.dirty = true;
        Ok(())
    }

    /// Flips whether an answer is correct and returns the new value
    ///
    /// Other answers are untouched, whatever the question type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnswerNotFound`] if the answer does not exist.
    pub fn toggle_answer_correct(&mut self, answer: &ItemId) -> Result<bool, Error> {
        let target = self.question.answer_mut(answer)?;
        let correct = !target.is_correct();
        target.is_correct = Some(correct);
        *self.dirty = true;
        debug!(question = %self.question.id, answer = %answer, correct, "toggled answer");
        Ok(correct)
    }

    /// Removes an answer and returns it
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnswerNotFound`] if the answer does not exist.
    pub fn delete_answer(&mut self, answer: &ItemId) -> Result<Answer, Error> {
        let index = self
            .question
            .answers
            .iter()
            .position(|a| a.id == *answer)
            .ok_or_else(|| Error::AnswerNotFound {
                question: self.question.id.clone(),
                answer: answer.clone(),
            })?;

        let removed = self.question.answers.remove(index);
        *self.dirty = true;
        debug!(question = %self.question.id, answer = %answer, "deleted answer");
        Ok(removed)
    }
}

/// Gives missing and later duplicate ids fresh ones; returns whether
/// anything changed
fn repair_ids(game: &mut Game) -> bool {
    let mut changed = false;
    let mut question_ids = HashSet::new();

    for question in &mut game.questions {
        if question.id.is_empty() || !question_ids.insert(question.id.clone()) {
            let fresh = ItemId::generate(Scope::Question);
            warn!(previous = %question.id, replacement = %fresh, "re-keyed question id");
            question.id = fresh.clone();
            question_ids.insert(fresh);
            changed = true;
        }

        let mut answer_ids = HashSet::new();
        for answer in &mut question.answers {
            if answer.id.is_empty() || !answer_ids.insert(answer.id.clone()) {
                let fresh = ItemId::generate(Scope::Answer);
                warn!(previous = %answer.id, replacement = %fresh, "re-keyed answer id");
                answer.id = fresh.clone();
                answer_ids.insert(fresh);
                changed = true;
            }
        }
    }

    changed
}
