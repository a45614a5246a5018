//! Replays a script through an [`Editor`] and reports every emitted event.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use vellum_core::{Editor, EditorConfig, EditorEvent, InMemoryStore, Viewport};

use crate::script::{Document, Script};
use crate::HostConfig;

/// One line of host output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine<'a> {
    /// Milliseconds since the start of the replay.
    pub at_ms: u64,
    /// The event.
    pub event: &'a EditorEvent,
}

/// Headless host application.
///
/// Owns the editor and writes one JSON line per [`EditorEvent`] to `out`.
pub struct HostApp<W: Write> {
    editor: Editor,
    out: W,
    start: Instant,
    emitted: usize,
}

impl<W: Write> HostApp<W> {
    /// Create the editor over `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if `editor_config` is invalid.
    pub fn new(config: &HostConfig, editor_config: EditorConfig, document: Document, out: W) -> Result<Self> {
        let store = InMemoryStore::from_items(document.items).with_min_displayed(editor_config.min_displayed_size);
        let editor = Editor::new(store, editor_config, Viewport::new(config.width, config.height))?;
        Ok(Self {
            editor,
            out,
            start: Instant::now(),
            emitted: 0,
        })
    }

    /// The editor being driven.
    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Number of events written so far.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    /// Consume the app, returning the output sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }

    fn elapsed_ms(&self, at: Instant) -> u64 {
        u64::try_from(at.saturating_duration_since(self.start).as_millis()).unwrap_or(u64::MAX)
    }

    fn emit(&mut self, at: Instant, events: &[EditorEvent]) -> Result<()> {
        let at_ms = self.elapsed_ms(at);
        for event in events {
            serde_json::to_writer(&mut self.out, &ReportLine { at_ms, event })?;
            self.out.write_all(b"\n")?;
            self.emitted += 1;
        }
        Ok(())
    }

    fn emit_initial_tiles(&mut self) -> Result<()> {
        let tiles = EditorEvent::TilesUpdated {
            tiles: self.editor.tiles().to_vec(),
        };
        self.emit(self.start, &[tiles])
    }

    /// Replay `script` on a virtual clock: entry times are added to the
    /// start instant and debounce deadlines fire in between, without
    /// sleeping.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub fn run_virtual(&mut self, script: &Script) -> Result<()> {
        self.emit_initial_tiles()?;
        for entry in script.entries() {
            let now = self.start + Duration::from_millis(entry.at_ms);
            self.fire_deadlines(now)?;
            let events = self.editor.handle(&entry.event, now);
            self.emit(now, &events)?;
        }
        if let Some(deadline) = self.editor.next_deadline() {
            self.fire_deadlines(deadline)?;
        }
        self.out.flush()?;
        tracing::info!("Replayed {} entries, {} events", script.len(), self.emitted);
        Ok(())
    }

    fn fire_deadlines(&mut self, now: Instant) -> Result<()> {
        while let Some(deadline) = self.editor.next_deadline().filter(|d| *d <= now) {
            let events = self.editor.tick(deadline);
            self.emit(deadline, &events)?;
        }
        Ok(())
    }

    /// Replay `script` in real time, racing each scheduled entry against
    /// the editor's next debounce deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub async fn run_realtime(&mut self, script: &Script) -> Result<()> {
        use tokio::time::{sleep_until, Instant as TokioInstant};

        let start = TokioInstant::now();
        self.start = start.into_std();
        self.emit_initial_tiles()?;

        let mut entries = script.entries().iter().peekable();
        loop {
            let next_entry = entries
                .peek()
                .map(|entry| start + Duration::from_millis(entry.at_ms));
            let deadline = self.editor.next_deadline().map(TokioInstant::from_std);
            if next_entry.is_none() && deadline.is_none() {
                break;
            }
            tokio::select! {
                () = sleep_until(deadline.unwrap_or(start)), if deadline.is_some() => {
                    let now = TokioInstant::now().into_std();
                    let events = self.editor.tick(now);
                    self.emit(now, &events)?;
                }
                () = sleep_until(next_entry.unwrap_or(start)), if next_entry.is_some() => {
                    if let Some(entry) = entries.next() {
                        let now = TokioInstant::now().into_std();
                        let events = self.editor.handle(&entry.event, now);
                        self.emit(now, &events)?;
                    }
                }
            }
        }
        self.out.flush()?;
        tracing::info!("Replayed {} entries in real time, {} events", script.len(), self.emitted);
        Ok(())
    }
}
