//! Media references for games and questions
//!
//! A media reference is a string that a front-end can display directly: a
//! remote URL, the shared placeholder image, or an image uploaded by the
//! author and embedded as a `data:` URI. This module turns what the author
//! supplies into what gets stored, and what is stored into what gets shown.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use base64::Engine;
use image::{ImageFormat, imageops::FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::EditorOptions;

/// Errors that can occur while embedding an uploaded file
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be read
    #[error("failed to read media file: {0}")]
    Read(#[from] std::io::Error),
    /// A thumbnail upload is not an image format the editor can decode
    #[error("unsupported image format")]
    UnsupportedFormat,
    /// The image could not be decoded for resizing
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    /// The resized image could not be encoded
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// What an upload will be used for
///
/// Game thumbnails must be images and are shrunk to fit the configured
/// bounding box before they are embedded. Question media is embedded as
/// uploaded, whatever its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// The thumbnail of a game
    Thumbnail,
    /// The media attached to a question
    QuestionMedia,
}

/// New media supplied by the author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    /// Remove the media; the stored reference becomes null
    Clear,
    /// A reference that is already displayable, such as a remote URL
    Url(String),
    /// The raw bytes of an uploaded file
    Upload(Vec<u8>),
    /// A local file to read and embed
    File(PathBuf),
}

/// Resolves and normalizes media references
#[derive(Debug, Clone)]
pub struct MediaResolver {
    placeholder: String,
    thumbnail_width: u32,
    thumbnail_height: u32,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(&EditorOptions::default())
    }
}

impl MediaResolver {
    /// Creates a resolver using the placeholder and bounds of the options
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            placeholder: options.placeholder_url.clone(),
            thumbnail_width: options.thumbnail.max_width,
            thumbnail_height: options.thumbnail.max_height,
        }
    }

    /// Returns the placeholder shown for missing media
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Returns a displayable reference for a stored one
    ///
    /// Missing or empty references resolve to the placeholder; anything else
    /// is already displayable and is returned unchanged. The result is never
    /// empty, and resolving a resolved reference gives the same reference.
    pub fn resolve<'a>(&'a self, raw: Option<&'a str>) -> &'a str {
        match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => &self.placeholder,
        }
    }

    /// Turns author-supplied media into the reference to store
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if an upload cannot be read or embedded. Nothing
    /// is stored by this method, so a failure leaves existing media as it is.
    pub fn normalize(&self, source: MediaSource, purpose: Purpose) -> Result<Option<String>, Error> {
        match source {
            MediaSource::Clear => Ok(None),
            MediaSource::Url(url) if url.is_empty() => Ok(None),
            MediaSource::Url(url) => Ok(Some(url)),
            MediaSource::Upload(bytes) => self.embed(&bytes, purpose).map(Some),
            MediaSource::File(path) => self.embed_file(&path, purpose).map(Some),
        }
    }

    /// Reads a local file fully and embeds it as a data URI
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be read, or any error of
    /// [`MediaResolver::embed`].
    pub fn embed_file(&self, path: &Path, purpose: Purpose) -> Result<String, Error> {
        let bytes = std::fs::read(path)?;
        self.embed(&bytes, purpose)
    }

    /// Embeds uploaded bytes as a self-contained data URI
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if a thumbnail is not a known
    /// image format, or a decode/encode error if it cannot be resized.
    pub fn embed(&self, bytes: &[u8], purpose: Purpose) -> Result<String, Error> {
        let format = image::guess_format(bytes);

        match purpose {
            Purpose::QuestionMedia => {
                let mime = format.map_or(OPAQUE_MIME, |format| format.to_mime_type());
                Ok(data_uri(mime, bytes))
            }
            Purpose::Thumbnail => {
                let format = format.map_err(|_| Error::UnsupportedFormat)?;
                let resized = self.shrink_thumbnail(bytes, format)?;
                Ok(data_uri(ImageFormat::Png.to_mime_type(), &resized))
            }
        }
    }

    /// Shrinks an image to fit the thumbnail box and re-encodes it as PNG
    fn shrink_thumbnail(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>, Error> {
        let mut image =
            image::load_from_memory_with_format(bytes, format).map_err(Error::Decode)?;

        if image.width() > self.thumbnail_width || image.height() > self.thumbnail_height {
            image = image.resize(
                self.thumbnail_width,
                self.thumbnail_height,
                FilterType::Triangle,
            );
        }

        let mut encoded = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(Error::Encode)?;

        Ok(encoded)
    }
}

const OPAQUE_MIME: &str = "application/octet-stream";

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
