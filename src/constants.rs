//! Configuration constants for the quiz editor
//!
//! This module contains the limits and defaults used throughout the editing
//! model to keep documents consistent and to give every component the same
//! boundaries.

/// Game-level constants
pub mod game {
    /// Maximum length of a game name in characters
    pub const MAX_NAME_LENGTH: usize = 200;
}

/// Question constants
pub mod question {
    /// Maximum number of answers a question may hold
    pub const MAX_ANSWER_COUNT: usize = 6;
    /// Minimum number of answers expected before a question is ready to play
    pub const MIN_READY_ANSWER_COUNT: usize = 2;
    /// Maximum length of a question title in characters
    pub const MAX_TITLE_LENGTH: usize = 300;
    /// Title given to freshly added questions
    pub const DEFAULT_TITLE: &str = "New Question";
    /// Time limit in seconds given to freshly added questions
    pub const DEFAULT_TIME_LIMIT: u32 = 10;
    /// Points given to freshly added questions
    pub const DEFAULT_POINTS: u32 = 100;
}

/// Answer constants
pub mod answer {
    /// Maximum length of answer content in characters
    pub const MAX_CONTENT_LENGTH: usize = 200;
}

/// Media constants
pub mod media {
    /// Image shown wherever a question or game has no media of its own
    pub const PLACEHOLDER_URL: &str = "https://cdn.dribbble.com/userupload/4487190/file/original-d4c3ba33335a133315f0e2dca0332649.png?compress=1&resize=752x";
    /// Maximum width in pixels of an embedded game thumbnail
    pub const THUMBNAIL_MAX_WIDTH: u32 = 256;
    /// Maximum height in pixels of an embedded game thumbnail
    pub const THUMBNAIL_MAX_HEIGHT: u32 = 192;
    /// Upper bound accepted for a configured thumbnail dimension
    pub const MAX_THUMBNAIL_DIMENSION: u32 = 4096;
}

/// Identifier constants
pub mod id {
    /// Number of random characters following the scope prefix
    pub const TOKEN_LENGTH: usize = 16;
}
