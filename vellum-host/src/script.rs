//! Documents and input scripts read by the host.
//!
//! A document is `{"items": [...]}` in paint order. A script is a JSON
//! array of `{"atMs": <u64>, "event": <InputEvent>}` entries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vellum_core::{InputEvent, Item};

/// Errors raised while loading host inputs.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid JSON for its format.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ScriptError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Items to load into the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Items in paint order.
    pub items: Vec<Item>,
}

impl Document {
    /// Load a document file.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let document: Self = read_json(path)?;
        tracing::debug!("Loaded {} items from {}", document.items.len(), path.display());
        Ok(document)
    }
}

/// One timed input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    /// Milliseconds after the start of the replay.
    pub at_ms: u64,
    /// The input.
    pub event: InputEvent,
}

/// A replayable input sequence, ordered by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    entries: Vec<ScriptEntry>,
}

impl Script {
    /// Build a script, stably sorting entries by time.
    #[must_use]
    pub fn new(mut entries: Vec<ScriptEntry>) -> Self {
        entries.sort_by_key(|entry| entry.at_ms);
        Self { entries }
    }

    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid script.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let script = Self::new(read_json(path)?);
        tracing::debug!("Loaded {} script entries from {}", script.len(), path.display());
        Ok(script)
    }

    /// Entries in time order.
    #[must_use]
    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
