//! Hot reload for file-backed rule sets.
//!
//! `RuleCache` holds the currently loaded rule list behind an atomic
//! snapshot swap: each reload publishes a whole new immutable list, so a
//! running evaluation never observes a partially updated set and the last
//! reload wins. `RuleWatcher` turns filesystem changes on the rule file
//! into debounced events; the caller decides when to reload.

use crate::rules::model::Rule;
use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebouncedEvent, Debouncer, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Shared handle to the cached file-loaded rule set.
#[derive(Clone, Default)]
pub struct RuleCache {
    inner: Arc<RwLock<Option<Arc<Vec<Rule>>>>>,
}

impl RuleCache {
    /// Publish a new rule list. `None` clears the cache ("no rules
    /// loaded"), which makes the engine fall back to configured rules.
    pub fn swap(&self, rules: Option<Vec<Rule>>) {
        let snapshot = rules.map(Arc::new);
        // Lock poisoning cannot happen: no writer panics while holding it.
        if let Ok(mut slot) = self.inner.write() {
            *slot = snapshot;
        }
    }

    /// The current snapshot, if a file load has succeeded before.
    pub fn snapshot(&self) -> Option<Arc<Vec<Rule>>> {
        self.inner.read().ok().and_then(|slot| slot.clone())
    }
}

/// Debounced watcher on a single rule file.
pub struct RuleWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    path: PathBuf,
}

impl RuleWatcher {
    /// Watch the rule file's parent directory so the file may be replaced
    /// atomically (write-then-rename) without losing the watch.
    ///
    /// The path is absolutized up front: event paths arrive absolute, so a
    /// relatively configured rule file must be compared in absolute form
    /// too or its changes would never match.
    pub fn new(path: &Path) -> crate::Result<Self> {
        let path = std::path::absolute(path)
            .with_context(|| format!("resolve rule file path {}", path.display()))?;

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

        let watch_dir = path.parent().unwrap_or(Path::new("."));
        debouncer
            .watcher()
            .watch(watch_dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
            path,
        })
    }

    /// Block until the watched rule file changes. `None` means the watch
    /// channel closed and no more events will arrive.
    pub fn wait(&self) -> Option<()> {
        loop {
            match self.receiver.recv() {
                Ok(Ok(events)) => {
                    if events.iter().any(|e| e.path == self.path) {
                        return Some(());
                    }
                    // Unrelated files in the same directory; keep waiting.
                }
                Ok(Err(err)) => {
                    log::warn!("rule watch error: {err}");
                }
                Err(_) => return None,
            }
        }
    }
}
