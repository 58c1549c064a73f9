//! Editing operations as values
//!
//! Every operation of [`Document`] has an [`Edit`] variant, so an edit
//! surface can build, queue, log or send operations before applying them.
//! Applying an edit calls the matching document operation and has exactly the
//! same atomicity.

use serde::{Deserialize, Serialize};

use crate::{
    document::{self, Document, QuestionPatch},
    id::ItemId,
    media::MediaSource,
};

/// A single operation on a game document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edit {
    /// Rename the game
    RenameGame {
        /// The new name
        name: String,
    },
    /// Replace or clear the thumbnail
    SetThumbnail {
        /// The new thumbnail
        source: MediaSource,
    },
    /// Append a question built from the template
    AddQuestion,
    /// Remove a question
    DeleteQuestion {
        /// The question to remove
        question: ItemId,
    },
    /// Update some fields of a question
    UpdateQuestionFields {
        /// The question to update
        question: ItemId,
        /// The fields to overwrite
        patch: QuestionPatch,
    },
    /// Append an empty answer to a question
    AddAnswer {
        /// The question to extend
        question: ItemId,
    },
    /// Replace the content of an answer
    UpdateAnswerContent {
        /// The question holding the answer
        question: ItemId,
        /// The answer to change
        answer: ItemId,
        /// The new content
        content: String,
    },
    /// Flip whether an answer is correct
    ToggleAnswerCorrect {
        /// The question holding the answer
        question: ItemId,
        /// The answer to flip
        answer: ItemId,
    },
    /// Remove an answer
    DeleteAnswer {
        /// The question holding the answer
        question: ItemId,
        /// The answer to remove
        answer: ItemId,
    },
}

/// What applying an edit produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The edit applied and produced nothing further
    Done,
    /// The edit created a question or an answer with this id
    Created(ItemId),
    /// The answer's correctness is now this value
    Toggled(bool),
}

impl Edit {
    /// Whether the edit changes the question list itself
    ///
    /// Structural edits are the ones a store-backed editor writes through
    /// immediately when its persist policy asks for it.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::AddQuestion | Self::DeleteQuestion { .. })
    }

    /// The question this edit targets, if it targets an existing one
    pub fn question(&self) -> Option<&ItemId> {
        match self {
            Self::RenameGame { .. } | Self::SetThumbnail { .. } | Self::AddQuestion => None,
            Self::DeleteQuestion { question }
            | Self::UpdateQuestionFields { question, .. }
            | Self::AddAnswer { question }
            | Self::UpdateAnswerContent { question, .. }
            | Self::ToggleAnswerCorrect { question, .. }
            | Self::DeleteAnswer { question, .. } => Some(question),
        }
    }

    /// Applies the edit to a document
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying document operation; the document
    /// is unchanged in that case.
    pub fn apply(self, document: &mut Document) -> Result<Applied, document::Error> {
        match self {
            Self::RenameGame { name } => {
                document.rename_game(name);
                Ok(Applied::Done)
            }
            Self::SetThumbnail { source } => document.set_thumbnail(source).map(|()| Applied::Done),
            Self::AddQuestion => Ok(Applied::Created(document.add_question())),
            Self::DeleteQuestion { question } => document
                .delete_question(&question)
                .map(|_| Applied::Done),
            Self::UpdateQuestionFields { question, patch } => document
                .update_question_fields(&question, patch)
                .map(|()| Applied::Done),
            Self::AddAnswer { question } => document.add_answer(&question).map(Applied::Created),
            Self::UpdateAnswerContent {
                question,
                answer,
                content,
            } => document
                .update_answer_content(&question, &answer, content)
                .map(|()| Applied::Done),
            Self::ToggleAnswerCorrect { question, answer } => document
                .toggle_answer_correct(&question, &answer)
                .map(Applied::Toggled),
            Self::DeleteAnswer { question, answer } => document
                .delete_answer(&question, &answer)
                .map(|_| Applied::Done),
        }
    }
}
