//! Editor configuration
//!
//! Limits that never change live in [`crate::constants`]. The choices a host
//! application may make differently are collected in [`EditorOptions`], which
//! deserializes with a default for every field and is validated with `garde`
//! before use.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading editor options
#[derive(Error, Debug)]
pub enum Error {
    /// The options are not valid JSON for this structure
    #[error("malformed editor options: {0}")]
    Json(#[from] serde_json::Error),
    /// The options parsed but violate a constraint
    #[error("invalid editor options: {0}")]
    Invalid(#[from] garde::Report),
}

/// Answers a freshly added question starts with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateAnswers {
    /// No answers at all
    Empty,
    /// Two answers with empty content, neither correct
    #[default]
    TwoBlank,
}

/// When edits are pushed to the remote store without an explicit save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistPolicy {
    /// Only an explicit persist writes to the store
    Manual,
    /// Adding or deleting a question writes the whole game immediately
    #[default]
    OnStructuralChange,
}

/// The bounding box uploaded thumbnails are shrunk to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ThumbnailBounds {
    /// Maximum width in pixels
    #[garde(range(min = 1, max = crate::constants::media::MAX_THUMBNAIL_DIMENSION))]
    pub max_width: u32,
    /// Maximum height in pixels
    #[garde(range(min = 1, max = crate::constants::media::MAX_THUMBNAIL_DIMENSION))]
    pub max_height: u32,
}

impl Default for ThumbnailBounds {
    fn default() -> Self {
        Self {
            max_width: crate::constants::media::THUMBNAIL_MAX_WIDTH,
            max_height: crate::constants::media::THUMBNAIL_MAX_HEIGHT,
        }
    }
}

/// Runtime configuration of an editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EditorOptions {
    /// Image shown where a game or question has no media
    #[garde(length(min = 1))]
    pub placeholder_url: String,
    /// Bounding box for uploaded thumbnails
    #[garde(dive)]
    pub thumbnail: ThumbnailBounds,
    /// Answers a new question starts with
    #[garde(skip)]
    pub template_answers: TemplateAnswers,
    /// When edits are written without an explicit persist
    #[garde(skip)]
    pub persist_policy: PersistPolicy,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            placeholder_url: crate::constants::media::PLACEHOLDER_URL.to_owned(),
            thumbnail: ThumbnailBounds::default(),
            template_answers: TemplateAnswers::default(),
            persist_policy: PersistPolicy::default(),
        }
    }
}

impl EditorOptions {
    /// Parses and validates options from JSON
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the input does not parse and
    /// [`Error::Invalid`] if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(EditorOptions::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = EditorOptions::from_json(r#"{"persist_policy": "Manual"}"#).unwrap();
        assert_eq!(options.persist_policy, PersistPolicy::Manual);
        assert_eq!(options.template_answers, TemplateAnswers::TwoBlank);
        assert_eq!(options.thumbnail, ThumbnailBounds::default());
        assert_eq!(
            options.placeholder_url,
            crate::constants::media::PLACEHOLDER_URL
        );
    }

    #[test]
    fn test_from_json_partial_thumbnail() {
        let options = EditorOptions::from_json(r#"{"thumbnail": {"max_width": 128}}"#).unwrap();
        assert_eq!(options.thumbnail.max_width, 128);
        assert_eq!(
            options.thumbnail.max_height,
            crate::constants::media::THUMBNAIL_MAX_HEIGHT
        );
    }

    #[test]
    fn test_from_json_rejects_zero_bounds() {
        let result = EditorOptions::from_json(r#"{"thumbnail": {"max_width": 0}}"#);
        assert!(matches!(result, Err(Error::Invalid(_))));
    }

    #[test]
    fn test_from_json_rejects_empty_placeholder() {
        let result = EditorOptions::from_json(r#"{"placeholder_url": ""}"#);
        assert!(matches!(result, Err(Error::Invalid(_))));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = EditorOptions::from_json("{not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
