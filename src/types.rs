//! Core data types for flacpress
//!
//! These types represent the domain model and flow through the pipeline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// Source metadata
// =============================================================================

/// Immutable tag snapshot read from a source file.
///
/// Tag names are compared case-insensitively: names are lower-cased on insert
/// and the first-seen casing is discarded. Entry and image order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    entries: Vec<(String, Vec<String>)>,
    images: Vec<Image>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let key = name.to_lowercase();
        if let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            values.push(value.into());
        } else {
            self.entries.push((key, vec![value.into()]));
        }
    }

    /// All values stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        let key = name.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// First value stored under `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn add_image(&mut self, image: Image) {
        self.images.push(image);
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.images.is_empty()
    }
}

/// Embedded picture carried from source to destination without re-encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Picture type code (APIC type byte, 0-20).
    pub kind: u8,
    pub mime: String,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

// =============================================================================
// Work units
// =============================================================================

/// One source-to-destination conversion unit. Immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Shared interrupt flag observed by workers and in-flight jobs.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
