//! Audio metadata sources
//!
//! The feed builder never decodes audio itself. It asks a [`MetadataSource`]
//! for the handful of fields an episode needs. [`LoftyMetadataSource`] reads
//! them from the file's tags and the filesystem; tests and embedders can plug
//! in their own source.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lofty::config::ParseOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use sha2::{Digest, Sha256};

use crate::error::{FeedError, Result};

/// Best-effort values read from one audio file.
///
/// Every field may be missing; empty strings are treated the same as `None`
/// when an episode is resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub summary: Option<String>,
    pub duration: Option<Duration>,
    pub image_url: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub file_size: Option<u64>,
    pub guid: Option<String>,
}

pub trait MetadataSource {
    /// Read the metadata of `path`. Failing here aborts feed generation.
    fn read(&self, path: &Path) -> Result<RawMetadata>;
}

/// Reads tags with lofty, size and modification time from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyMetadataSource;

impl LoftyMetadataSource {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSource for LoftyMetadataSource {
    fn read(&self, path: &Path) -> Result<RawMetadata> {
        let read_err = |reason: String| FeedError::MetadataRead {
            path: path.to_path_buf(),
            reason,
        };

        let probe = Probe::open(path).map_err(|e| read_err(e.to_string()))?;
        let tagged_file = probe
            .guess_file_type()
            .map_err(|e| read_err(e.to_string()))?
            .options(ParseOptions::new())
            .read()
            .map_err(|e| read_err(e.to_string()))?;

        let file_info = fs::metadata(path).map_err(|e| read_err(e.to_string()))?;
        let guid = content_digest(path).map_err(|e| read_err(e.to_string()))?;

        let mut metadata = RawMetadata {
            duration: Some(tagged_file.properties().duration()),
            pub_date: file_info.modified().ok().map(DateTime::<Utc>::from),
            file_size: Some(file_info.len()),
            guid: Some(guid),
            ..RawMetadata::default()
        };

        // Tags hold embedded pictures rather than links, so no image_url here.
        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            metadata.title = tag.title().map(|s| s.to_string());
            metadata.artist = tag.artist().map(|s| s.to_string());
            metadata.summary = tag.comment().map(|s| s.to_string());
        }

        Ok(metadata)
    }
}

/// Hex SHA-256 of the file, streamed rather than read into memory
fn content_digest(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
