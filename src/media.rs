//! Media attachment sources.
//!
//! Picking an image is delegated to a collaborator outside the report flow:
//! the composer consumes a URI or a refusal, and never touches the asset
//! itself. The concrete source here is a directory on disk standing in for
//! the device gallery; camera capture is not available on this platform.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Opaque reference to a picked image.
///
/// The asset it names belongs to the media source; the flow only carries
/// the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUri(String);

impl MediaUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where an image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Camera,
    Gallery,
}

/// Why no image was produced.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media permission denied")]
    PermissionDenied,

    #[error("selection cancelled")]
    Cancelled,

    #[error("media unavailable: {0}")]
    Unavailable(String),
}

/// Produces image URIs for the composer.
pub trait MediaSource {
    /// Whether the source may be read at all.
    fn has_permission(&self) -> bool;

    /// Picks one image, or reports why none was picked.
    fn pick_image(&mut self, kind: MediaKind) -> Result<MediaUri, MediaError>;
}

/// File extensions treated as images when scanning the gallery directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// Gallery backed by a directory on disk: the newest image file wins.
pub struct DirectoryGallery {
    dir: PathBuf,
}

impl DirectoryGallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The newest image file in the directory by modification time.
    fn newest_image(&self) -> Result<PathBuf, MediaError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| MediaError::Unavailable(format!("{}: {e}", self.dir.display())))?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry
                .map_err(|e| MediaError::Unavailable(format!("{}: {e}", self.dir.display())))?;
            let path = entry.path();
            if !is_image(&path) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| {
            MediaError::Unavailable(format!("no images in {}", self.dir.display()))
        })
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

impl MediaSource for DirectoryGallery {
    fn has_permission(&self) -> bool {
        self.dir.is_dir()
    }

    fn pick_image(&mut self, kind: MediaKind) -> Result<MediaUri, MediaError> {
        match kind {
            MediaKind::Camera => Err(MediaError::Unavailable(
                "no camera on this platform".to_string(),
            )),
            MediaKind::Gallery => {
                if !self.has_permission() {
                    return Err(MediaError::PermissionDenied);
                }
                let path = self.newest_image()?;
                Ok(MediaUri::new(format!("file://{}", path.display())))
            }
        }
    }
}
