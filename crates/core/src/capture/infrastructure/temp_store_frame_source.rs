use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::constants::{APP_DIR_NAME, CAPTURE_FILE_NAME, IMAGE_EXTENSIONS};
use crate::shared::frame::Frame;

/// Platform-specific directory for transient capture files.
///
/// - Linux: `$XDG_CACHE_HOME/Facetrace/captures/` or `~/.cache/Facetrace/captures/`
/// - macOS: `~/Library/Caches/Facetrace/captures/`
/// - Windows: `%LOCALAPPDATA%/Facetrace/captures/`
pub fn default_capture_dir() -> Result<PathBuf, CaptureError> {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR_NAME).join("captures"))
        .ok_or_else(|| CaptureError::DeviceUnavailable("no cache directory".to_string()))
}

/// File-backed `FrameSource`: each acquisition consumes the next input
/// image, snapshots it into the capture directory under a fixed name
/// (overwriting the previous capture), and hands the bytes back as a
/// `Frame`.
///
/// The stream reports inactive once the inputs run dry, which the
/// identification loop observes as cancellation. The capture file is
/// owned by this source; `cleanup_captures` removes leftovers on
/// teardown.
pub struct TempStoreFrameSource {
    inputs: VecDeque<PathBuf>,
    capture_dir: PathBuf,
    next_index: usize,
    streaming: bool,
}

impl TempStoreFrameSource {
    pub fn new(inputs: Vec<PathBuf>) -> Result<Self, CaptureError> {
        Self::with_capture_dir(inputs, default_capture_dir()?)
    }

    pub fn with_capture_dir(
        inputs: Vec<PathBuf>,
        capture_dir: PathBuf,
    ) -> Result<Self, CaptureError> {
        fs::create_dir_all(&capture_dir).map_err(|e| CaptureError::Storage {
            path: capture_dir.clone(),
            source: e,
        })?;
        Ok(Self {
            inputs: inputs.into(),
            capture_dir,
            next_index: 0,
            streaming: true,
        })
    }

    /// Path of the fixed-name capture file backing the current frame.
    pub fn capture_path(&self) -> PathBuf {
        self.capture_dir.join(CAPTURE_FILE_NAME)
    }

    /// Deletes leftover capture images from this source's capture
    /// directory.
    pub fn cleanup_captures(&self) -> std::io::Result<()> {
        cleanup_captures(&self.capture_dir)
    }
}

/// Deletes leftover capture images from a capture directory.
///
/// Host teardown responsibility — the loop never calls this. Usable
/// after the source itself has been moved into a use case.
pub fn cleanup_captures(capture_dir: &Path) -> std::io::Result<()> {
    let entries = match fs::read_dir(capture_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let path = entry?.path();
        if is_capture_image(&path) {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn is_capture_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for TempStoreFrameSource {
    fn is_streaming(&self) -> bool {
        self.streaming && !self.inputs.is_empty()
    }

    fn acquire_frame(&mut self) -> Result<Frame, CaptureError> {
        let input = self
            .inputs
            .pop_front()
            .ok_or_else(|| CaptureError::DeviceUnavailable("input stream exhausted".to_string()))?;

        let data = fs::read(&input).map_err(|e| {
            CaptureError::DeviceUnavailable(format!("cannot read {}: {e}", input.display()))
        })?;

        // Reject frames the remote service could never decode.
        image::load_from_memory(&data)?;

        let capture_path = self.capture_path();
        fs::write(&capture_path, &data).map_err(|e| CaptureError::Storage {
            path: capture_path,
            source: e,
        })?;

        let index = self.next_index;
        self.next_index += 1;
        Ok(Frame::new(data, index))
    }

    fn close(&mut self) {
        self.streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_test_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();
        path
    }

    fn source_with_inputs(tmp: &TempDir, count: usize) -> TempStoreFrameSource {
        let inputs = (0..count)
            .map(|i| write_test_image(tmp.path(), &format!("input_{i}.png")))
            .collect();
        TempStoreFrameSource::with_capture_dir(inputs, tmp.path().join("captures")).unwrap()
    }

    #[test]
    fn test_acquire_returns_frames_in_order() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 3);

        for expected in 0..3 {
            let frame = source.acquire_frame().unwrap();
            assert_eq!(frame.index(), expected);
            assert!(!frame.is_empty());
        }
    }

    #[test]
    fn test_capture_file_overwritten_each_acquire() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 2);

        source.acquire_frame().unwrap();
        let first = fs::read(source.capture_path()).unwrap();
        source.acquire_frame().unwrap();
        let second = fs::read(source.capture_path()).unwrap();

        // Same fixed name both times, contents replaced in place.
        assert!(!first.is_empty());
        assert!(!second.is_empty());
        let captures: Vec<_> = fs::read_dir(tmp.path().join("captures"))
            .unwrap()
            .collect();
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_stream_inactive_when_inputs_exhausted() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 1);

        assert!(source.is_streaming());
        source.acquire_frame().unwrap();
        assert!(!source.is_streaming());
    }

    #[test]
    fn test_acquire_past_end_is_device_unavailable() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 0);

        let err = source.acquire_frame().unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_missing_input_is_device_unavailable() {
        let tmp = TempDir::new().unwrap();
        let mut source = TempStoreFrameSource::with_capture_dir(
            vec![tmp.path().join("does_not_exist.jpg")],
            tmp.path().join("captures"),
        )
        .unwrap();

        let err = source.acquire_frame().unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_undecodable_input_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("bogus.jpg");
        fs::write(&bogus, b"not an image at all").unwrap();
        let mut source =
            TempStoreFrameSource::with_capture_dir(vec![bogus], tmp.path().join("captures"))
                .unwrap();

        let err = source.acquire_frame().unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }

    #[test]
    fn test_close_stops_streaming() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 2);

        assert!(source.is_streaming());
        source.close();
        assert!(!source.is_streaming());
    }

    #[test]
    fn test_cleanup_removes_capture_images() {
        let tmp = TempDir::new().unwrap();
        let mut source = source_with_inputs(&tmp, 1);

        source.acquire_frame().unwrap();
        assert!(source.capture_path().exists());

        source.cleanup_captures().unwrap();
        assert!(!source.capture_path().exists());
    }

    #[test]
    fn test_cleanup_on_empty_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        let source = source_with_inputs(&tmp, 0);
        source.cleanup_captures().unwrap();
    }
}
