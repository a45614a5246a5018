//! # Vellum Host
//!
//! Headless host for the Vellum editing core.
//!
//! Loads a document and an input script, replays the script through an
//! [`Editor`](vellum_core::Editor) and prints every emitted event as one
//! JSON line on stdout.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p vellum-host -- --document doc.json --script input.json
//! ```
//!
//! ## With real-time replay:
//!
//! ```bash
//! cargo run -p vellum-host -- --script input.json --realtime
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Input files, viewport size and clock mode
//! - `HostApp` - Owns the editor and writes the event report
//! - `Script` / `Document` - JSON inputs

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod app;
mod script;

pub use app::{HostApp, ReportLine};
pub use script::{Document, Script, ScriptEntry, ScriptError};

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use vellum_core::EditorConfig;

/// Command-line arguments for vellum-host.
#[derive(Debug, Clone, Parser)]
#[command(name = "vellum-host")]
#[command(about = "Replay scripted input through the Vellum editing core")]
#[command(version)]
pub struct CliArgs {
    /// Document to load (`{"items": [...]}`)
    #[arg(long, env = "VELLUM_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Input script (`[{"atMs": .., "event": {..}}]`)
    #[arg(long, env = "VELLUM_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Editor configuration JSON
    #[arg(long, env = "VELLUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value = "800")]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "600")]
    pub height: f64,

    /// Replay on the wall clock instead of a virtual one
    #[arg(long, env = "VELLUM_REALTIME")]
    pub realtime: bool,
}

/// Host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Document file, if any.
    pub document: Option<PathBuf>,
    /// Script file, if any.
    pub script: Option<PathBuf>,
    /// Editor configuration file, if any.
    pub config: Option<PathBuf>,
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
    /// Whether to replay in real time.
    pub realtime: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a host configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            document: None,
            script: None,
            config: None,
            width: 800.0,
            height: 600.0,
            realtime: false,
        }
    }

    /// Load the editor configuration, or defaults when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or invalid.
    pub fn editor_config(&self) -> Result<EditorConfig> {
        match &self.config {
            Some(path) => Ok(EditorConfig::from_file(path)?),
            None => Ok(EditorConfig::default()),
        }
    }

    /// Load the document, or an empty one when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed.
    pub fn document(&self) -> Result<Document> {
        match &self.document {
            Some(path) => Ok(Document::load(path)?),
            None => Ok(Document::default()),
        }
    }

    /// Load the script, or an empty one when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed.
    pub fn script(&self) -> Result<Script> {
        match &self.script {
            Some(path) => Ok(Script::load(path)?),
            None => Ok(Script::default()),
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            document: args.document,
            script: args.script,
            config: args.config,
            width: args.width,
            height: args.height,
            realtime: args.realtime,
        }
    }
}
