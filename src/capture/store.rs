//! On-disk layout of captured images.
//!
//! Files live at `{root}/{location}/{object}/{direction}/{seq}_{YYYYMMDD}_{HHMM}.png`.
//! The sequence number restarts per directory and is derived from the
//! number of images already present. Names are claimed with create-new
//! semantics, so two overlapping runs never write the same file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::constants::{CAPTURE_EXTENSION, SEQUENCE_WIDTH};
use crate::error::{Error, Result};
use crate::registry::{CameraDirection, CelestialObject};

/// Upper bound on name collisions tolerated while reserving a file.
const MAX_RESERVE_ATTEMPTS: u32 = 1000;

/// Image extensions picked up by [`CaptureStore::list_images`].
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Root of the capture tree.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding captures for one camera.
    pub fn directory(
        &self,
        location_id: &str,
        object: CelestialObject,
        direction: CameraDirection,
    ) -> PathBuf {
        self.root
            .join(location_id)
            .join(object.as_str())
            .join(direction.as_str())
    }

    /// File name for sequence `seq` captured at `at` (host wall clock).
    pub fn file_name(seq: u32, at: NaiveDateTime) -> String {
        format!(
            "{seq:0width$}_{}.{CAPTURE_EXTENSION}",
            at.format("%Y%m%d_%H%M"),
            width = SEQUENCE_WIDTH
        )
    }

    /// Next sequence number in `dir`: existing captures plus one.
    pub async fn next_sequence(dir: &Path) -> Result<u32> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(Error::io(format!("listing {}", dir.display()), e)),
        };

        let mut count = 0u32;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(format!("listing {}", dir.display()), e))?
        {
            if has_extension(&entry.path(), &[CAPTURE_EXTENSION]) {
                count += 1;
            }
        }
        Ok(count + 1)
    }

    /// Create the camera directory and claim the next free file name.
    ///
    /// The returned path exists (empty) when this returns; callers that fail
    /// to fill it should [`discard`](Self::discard) it.
    pub async fn reserve(
        &self,
        location_id: &str,
        object: CelestialObject,
        direction: CameraDirection,
        at: NaiveDateTime,
    ) -> Result<PathBuf> {
        let dir = self.directory(location_id, object, direction);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io(format!("creating {}", dir.display()), e))?;

        let mut seq = Self::next_sequence(&dir).await?;
        for _ in 0..MAX_RESERVE_ATTEMPTS {
            let path = dir.join(Self::file_name(seq, at));
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Capture name taken, bumping sequence");
                    seq += 1;
                },
                Err(e) => return Err(Error::io(format!("creating {}", path.display()), e)),
            }
        }

        Err(Error::io(
            format!("reserving a capture name in {}", dir.display()),
            std::io::Error::new(ErrorKind::AlreadyExists, "no free sequence number"),
        ))
    }

    /// Remove a reserved file that was never written.
    pub async fn discard(path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await
            && e.kind() != ErrorKind::NotFound
        {
            debug!(path = %path.display(), error = %e, "Failed to discard capture placeholder");
        }
    }

    /// Images in `dir`, sorted by file name (and therefore by sequence).
    pub async fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(format!("listing {}", dir.display()), e)),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io(format!("listing {}", dir.display()), e))?
        {
            let path = entry.path();
            if has_extension(&path, &IMAGE_EXTENSIONS) {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
