// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame sources. The `FrameSource` trait is the seam the platform camera
// bridges implement; `DirectorySource` replays still images from disk so the
// pipeline can be driven without a camera.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::types::{Frame, PixelFormat};

/// Pull-based producer of camera frames.
pub trait FrameSource {
    /// Block until the next frame is available. `Ok(None)` means the stream
    /// has ended; an `Err` applies to one frame only and the caller may keep
    /// pulling.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Replays the image files of a directory, sorted by file name.
///
/// Intended for demos and tests: a directory of numbered captures behaves
/// like a slow camera. Decoding problems surface as `Capture` errors and the
/// source then moves on to the next file.
pub struct DirectorySource {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl DirectorySource {
    /// Scan `dir` for supported image files (png, jpg, jpeg, bmp).
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    matches!(
                        ext.to_ascii_lowercase().as_str(),
                        "png" | "jpg" | "jpeg" | "bmp"
                    )
                });
            if supported {
                files.push(path);
            }
        }
        files.sort();
        info!(count = files.len(), "Directory source ready");
        Ok(Self { files, cursor: 0 })
    }

    /// Number of files the source will replay.
    pub fn frame_count(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.get(self.cursor) else {
            return Ok(None);
        };
        // Advance before decoding so a bad file is not retried forever.
        self.cursor += 1;
        let decoded = image::open(path).map_err(|err| {
            KantwerkError::Capture(format!("failed to decode {}: {}", path.display(), err))
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(path = %path.display(), width, height, "Frame loaded");
        let frame = Frame::new(rgba.into_raw(), width, height, PixelFormat::Rgba8)?;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        img.save(dir.join(name)).expect("write test png");
    }

    #[test]
    fn frames_come_back_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Written out of order; distinct sizes identify each file.
        write_png(dir.path(), "b.png", 4, 2);
        write_png(dir.path(), "a.png", 3, 2);
        write_png(dir.path(), "c.png", 5, 2);

        let mut source = DirectorySource::new(dir.path()).expect("source");
        assert_eq!(source.frame_count(), 3);
        let widths: Vec<u32> = std::iter::from_fn(|| {
            source.next_frame().expect("next frame").map(|f| f.width)
        })
        .collect();
        assert_eq!(widths, vec![3, 4, 5]);
        assert!(source.next_frame().expect("past the end").is_none());
    }

    #[test]
    fn unsupported_files_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "frame.png", 3, 3);
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write txt");

        let source = DirectorySource::new(dir.path()).expect("source");
        assert_eq!(source.frame_count(), 1);
    }

    #[test]
    fn decode_failure_skips_to_the_next_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "a.png", 3, 2);
        std::fs::write(dir.path().join("b.png"), "definitely not a png").expect("write junk");
        write_png(dir.path(), "c.png", 5, 2);

        let mut source = DirectorySource::new(dir.path()).expect("source");
        let first = source.next_frame().expect("first frame").expect("frame");
        assert_eq!(first.width, 3);
        assert!(matches!(
            source.next_frame(),
            Err(KantwerkError::Capture(_))
        ));
        let third = source.next_frame().expect("third frame").expect("frame");
        assert_eq!(third.width, 5);
        assert!(source.next_frame().expect("past the end").is_none());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let result = DirectorySource::new("/definitely/not/a/real/directory");
        assert!(matches!(result, Err(KantwerkError::Io(_))));
    }
}
