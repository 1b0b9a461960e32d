//! The file loader

use crate::{AssetLibrary, Options};
use lantern_core::Signal;
use log::{debug, info};

/// Payload of the loader error signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub filename: String,
    pub message: String,
}

/// Progress payload: files finished (loaded or failed) out of total queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub finished: usize,
    pub total: usize,
}

struct QueueEntry {
    name: String,
    options: Options,
}

/// Queues files and loads them into an [`AssetLibrary`].
///
/// `load` drains the queue in order: resolve the protocol from the uri
/// scheme, fetch, route to the parser matching the filename suffix, and fall
/// back to a blob entry when no parser matches. Names already present in the
/// library are served from cache without a fetch. Failures are reported
/// through the `error` signal and do not stop the remaining queue.
pub struct Loader {
    queue: Vec<QueueEntry>,
    options: Options,
    progress: Signal<LoadProgress>,
    complete: Signal<()>,
    error: Signal<LoadError>,
}

impl Loader {
    pub fn new(options: Options) -> Self {
        Self {
            queue: Vec::new(),
            options,
            progress: Signal::new(),
            complete: Signal::new(),
            error: Signal::new(),
        }
    }

    /// Queue a file under the loader's own options. Re-queueing a name
    /// already in the queue is a no-op.
    pub fn queue(&mut self, name: impl Into<String>) -> &mut Self {
        let options = Options::inherit(&self.options);
        self.queue_with(name, options)
    }

    /// Queue a file with per-file options
    pub fn queue_with(&mut self, name: impl Into<String>, options: Options) -> &mut Self {
        let name = name.into();
        if !self.queue.iter().any(|entry| entry.name == name) {
            self.queue.push(QueueEntry { name, options });
        }
        self
    }

    /// Number of files waiting to load
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Signal emitted after each file finishes (either way)
    pub fn progress(&mut self) -> &mut Signal<LoadProgress> {
        &mut self.progress
    }

    /// Signal emitted once the whole queue has been processed
    pub fn complete(&mut self) -> &mut Signal<()> {
        &mut self.complete
    }

    /// Signal emitted for each file that failed to fetch or parse
    pub fn error(&mut self) -> &mut Signal<LoadError> {
        &mut self.error
    }

    /// Drain the queue into the library. Returns the number of files that
    /// failed; details went to the `error` signal.
    pub fn load(&mut self, library: &mut AssetLibrary) -> usize {
        let queue = std::mem::take(&mut self.queue);
        let total = queue.len();
        let mut failed = 0;

        for (index, entry) in queue.into_iter().enumerate() {
            if library.contains(&entry.name) {
                debug!("{}: already loaded, serving from cache", entry.name);
            } else if let Err(error) = Self::load_one(&entry, library) {
                failed += 1;
                self.error.emit(&LoadError {
                    filename: entry.name.clone(),
                    message: error.to_string(),
                });
            }

            self.progress.emit(&LoadProgress {
                finished: index + 1,
                total,
            });
        }

        info!("loaded {} of {} queued files", total - failed, total);
        self.complete.emit(&());
        failed
    }

    fn load_one(entry: &QueueEntry, library: &mut AssetLibrary) -> lantern_core::Result<()> {
        let protocol = library.protocol_for(&entry.name)?;
        let bytes = protocol.fetch(&entry.name, &entry.options)?;

        match library.parser_for(&entry.name) {
            Some(parser) => {
                debug!("{}: parsing with {}", entry.name, parser.name());
                parser.parse(&entry.name, &bytes, &entry.options, library)
            }
            None => {
                debug!("{}: no parser, storing as blob", entry.name);
                library.set_blob(entry.name.clone(), bytes);
                Ok(())
            }
        }
    }
}
