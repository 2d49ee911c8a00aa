use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FeedError, Result};

/// File extension picked up when a source is a directory
pub const AUDIO_EXTENSION: &str = "mp3";

/// Where episodes come from: one path or an ordered list of paths.
///
/// Each path is either a directory (scanned for `*.mp3`, non-recursive) or
/// a file that is taken as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl Sources {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Sources::One(path) => std::slice::from_ref(path),
            Sources::Many(paths) => paths,
        }
    }
}

impl From<PathBuf> for Sources {
    fn from(path: PathBuf) -> Self {
        Sources::One(path)
    }
}

impl From<&Path> for Sources {
    fn from(path: &Path) -> Self {
        Sources::One(path.to_path_buf())
    }
}

impl From<&str> for Sources {
    fn from(path: &str) -> Self {
        Sources::One(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for Sources {
    fn from(paths: Vec<PathBuf>) -> Self {
        Sources::Many(paths)
    }
}

impl<const N: usize> From<[&str; N]> for Sources {
    fn from(paths: [&str; N]) -> Self {
        Sources::Many(paths.into_iter().map(PathBuf::from).collect())
    }
}

/// Expand sources into the list of candidate audio files.
///
/// Directory matches are sorted by path so the result does not depend on the
/// filesystem's listing order. Sources keep the caller's order.
pub fn collect(sources: &Sources) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for source in sources.paths() {
        if source.is_dir() {
            let mut found = scan_directory(source)?;
            if found.is_empty() {
                warn!("No .{} files in {}", AUDIO_EXTENSION, source.display());
            }
            found.sort();
            files.extend(found);
        } else {
            debug!("Adding file source {}", source.display());
            files.push(source.clone());
        }
    }

    Ok(files)
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source: std::io::Error| FeedError::SourceRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();

        if is_audio_file(&path) {
            debug!("Found {}", path.display());
            found.push(path);
        }
    }

    Ok(found)
}

// Same matching as a `*.mp3` shell glob: no dot-files, exact extension.
fn is_audio_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|s| s.to_str())
        .map_or(true, |name| name.starts_with('.'));

    !hidden
        && path.is_file()
        && path.extension().and_then(|s| s.to_str()) == Some(AUDIO_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_keeps_only_mp3() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("a.mp3"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("loud.MP3"), b"").unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"").unwrap();
        fs::create_dir(dir.path().join("folder.mp3")).unwrap();

        let files = collect(&Sources::from(dir.path())).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.mp3"), dir.path().join("b.mp3")]
        );
    }

    #[test]
    fn test_file_source_is_not_filtered() {
        let sources = Sources::from(["/feed/ep1.mp3", "/feed/readme.txt"]);

        let files = collect(&sources).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("/feed/ep1.mp3"),
                PathBuf::from("/feed/readme.txt")
            ]
        );
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let files = collect(&Sources::from(dir.path())).unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_sources_keep_caller_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("z.mp3"), b"").unwrap();
        fs::write(second.path().join("a.mp3"), b"").unwrap();

        let sources = Sources::Many(vec![
            first.path().to_path_buf(),
            PathBuf::from("/elsewhere/single.mp3"),
            second.path().to_path_buf(),
        ]);

        let files = collect(&sources).unwrap();

        assert_eq!(
            files,
            vec![
                first.path().join("z.mp3"),
                PathBuf::from("/elsewhere/single.mp3"),
                second.path().join("a.mp3"),
            ]
        );
    }
}
