use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use crate::error::{FeedError, Result};
use crate::metadata::MetadataSource;

/// One feed entry, built from one audio file
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub file_path: PathBuf,
    pub file_name: String,
    pub title: String,
    pub artist: Option<String>,
    pub summary: String,
    pub duration: Duration,
    pub pub_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub url: Url,
    pub file_size: u64,
    pub guid: String,
}

impl Episode {
    pub fn duration_hms(&self) -> String {
        format_duration(self.duration)
    }
}

/// `HH:MM:SS`, hours not capped at 24
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Channel values an episode falls back to or builds on
#[derive(Debug, Clone, Copy)]
pub struct EpisodeDefaults<'a> {
    pub author: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub enclosure_base: &'a str,
}

/// Build the episode for `path`.
///
/// `artist` and `image_url` come from the channel when the file has none;
/// every other field is taken from the file as-is.
pub fn resolve(
    path: &Path,
    defaults: &EpisodeDefaults<'_>,
    source: &dyn MetadataSource,
) -> Result<Episode> {
    let raw = source.read(path)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let url = enclosure_url(defaults.enclosure_base, &file_name)?;

    let artist = non_blank(raw.artist).or_else(|| defaults.author.map(str::to_string));
    let image_url = non_blank(raw.image_url).or_else(|| defaults.image_url.map(str::to_string));
    let guid = non_blank(raw.guid).unwrap_or_else(|| url.to_string());

    debug!("Resolved {} -> {}", path.display(), url);

    Ok(Episode {
        file_path: path.to_path_buf(),
        file_name,
        title: raw.title.unwrap_or_default(),
        artist,
        summary: raw.summary.unwrap_or_default(),
        duration: raw.duration.unwrap_or_default(),
        pub_date: raw.pub_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        image_url,
        url,
        file_size: raw.file_size.unwrap_or(0),
        guid,
    })
}

/// Join the enclosure base and a file name into an absolute download URL.
///
/// The base path gets exactly one trailing `/`. Parsing the base escapes unsafe
/// characters and leaves existing `%XX` sequences alone; the file name is
/// percent-encoded so it always stays a single path segment.
pub fn enclosure_url(enclosure_base: &str, file_name: &str) -> Result<Url> {
    let malformed = |reason: String| FeedError::MalformedUrl {
        base: enclosure_base.to_string(),
        file_name: file_name.to_string(),
        reason,
    };

    if file_name.is_empty() {
        return Err(malformed("empty file name".to_string()));
    }

    let mut base = Url::parse(enclosure_base.trim()).map_err(|e| malformed(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(malformed("base URL cannot take a path".to_string()));
    }
    // A file name joined after a query or fragment would not be a path segment
    if base.query().is_some() || base.fragment().is_some() {
        return Err(malformed("base URL has a query or fragment".to_string()));
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(&urlencoding::encode(file_name))
        .map_err(|e| malformed(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
