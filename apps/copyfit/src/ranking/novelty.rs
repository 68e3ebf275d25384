//! Novelty store — remembers the trigram fingerprints of copy already selected for a
//! (brand, template) pair, so later selections can favor fresh phrasing.
//!
//! Backends implement `NoveltyStore`; callers hold a `&dyn NoveltyStore` and never care
//! whether fingerprints live on disk or in memory. Read → merge → write is a
//! single-writer section per key; concurrent writers for one key may lose an update,
//! which only weakens novelty for one run.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::errors::{CopyfitError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoveltyKey {
    pub brand_id: String,
    pub template_id: String,
}

impl NoveltyKey {
    pub fn new(brand_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        NoveltyKey {
            brand_id: brand_id.into(),
            template_id: template_id.into(),
        }
    }

    /// Filesystem-safe file name: `<brand>__<template>.json`.
    pub fn file_name(&self) -> String {
        format!("{}__{}.json", sanitize(&self.brand_id), sanitize(&self.template_id))
    }
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

pub trait NoveltyStore: Send + Sync {
    /// Stored trigrams for `key`; an unknown key is an empty set, not an error.
    fn load(&self, key: &NoveltyKey) -> Result<BTreeSet<String>>;

    /// Unions `trigrams` into the stored set for `key`.
    fn merge(&self, key: &NoveltyKey, trigrams: &BTreeSet<String>) -> Result<()>;
}

// ────────────────────────────────────────────────────────────────────────────
// File backend
// ────────────────────────────────────────────────────────────────────────────

/// On-disk record, one file per key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoveltyRecord {
    trigrams: BTreeSet<String>,
    updated_at: DateTime<Utc>,
}

/// One JSON file per key under `dir`, replaced atomically on every merge.
#[derive(Debug, Clone)]
pub struct FileNoveltyStore {
    dir: PathBuf,
}

impl FileNoveltyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileNoveltyStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &NoveltyKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl NoveltyStore for FileNoveltyStore {
    fn load(&self, key: &NoveltyKey) -> Result<BTreeSet<String>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };
        let record: NoveltyRecord = serde_json::from_str(&raw)?;
        Ok(record.trigrams)
    }

    fn merge(&self, key: &NoveltyKey, trigrams: &BTreeSet<String>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // A corrupt record is overwritten by this merge.
        let stored = match self.load(key) {
            Ok(stored) => stored,
            Err(CopyfitError::Json(e)) => {
                warn!(key = %key.file_name(), error = %e, "Corrupt novelty record, starting fresh");
                BTreeSet::new()
            }
            Err(e) => return Err(e),
        };
        let mut record = NoveltyRecord {
            trigrams: stored,
            updated_at: Utc::now(),
        };
        record.trigrams.extend(trigrams.iter().cloned());

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &record)?;
        tmp.flush()?;
        tmp.persist(self.path_for(key))
            .map_err(|e| CopyfitError::Novelty(format!("persist {}: {}", key.file_name(), e.error)))?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Memory backend
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store for tests and one-shot batch runs.
#[derive(Debug, Default)]
pub struct MemoryNoveltyStore {
    sets: Mutex<HashMap<NoveltyKey, BTreeSet<String>>>,
}

impl MemoryNoveltyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoveltyStore for MemoryNoveltyStore {
    fn load(&self, key: &NoveltyKey) -> Result<BTreeSet<String>> {
        let sets = self
            .sets
            .lock()
            .map_err(|_| CopyfitError::Novelty("memory store lock poisoned".to_string()))?;
        Ok(sets.get(key).cloned().unwrap_or_default())
    }

    fn merge(&self, key: &NoveltyKey, trigrams: &BTreeSet<String>) -> Result<()> {
        let mut sets = self
            .sets
            .lock()
            .map_err(|_| CopyfitError::Novelty("memory store lock poisoned".to_string()))?;
        sets.entry(key.clone())
            .or_default()
            .extend(trigrams.iter().cloned());
        Ok(())
    }
}
