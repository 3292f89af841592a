use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("failed to write capture file {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("captured bytes are not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Domain interface for acquiring still frames from a live source.
///
/// Implementations may hold a device handle or file cursor, hence
/// `&mut self`. At most one frame from the same source is in use at a
/// time: the identification loop finishes with a frame before asking
/// for the next one.
pub trait FrameSource: Send {
    /// Reports whether the underlying stream is still active. The loop
    /// polls this at each iteration boundary; `false` means teardown was
    /// requested or the source ran dry, and no further captures follow.
    fn is_streaming(&self) -> bool;

    /// Captures one still frame. Any error is fatal to the caller — a
    /// source that cannot deliver a frame does not recover by itself.
    ///
    /// May overwrite a transient backing resource (e.g. a capture file);
    /// that resource belongs to the source, not to the returned `Frame`.
    fn acquire_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device or backing storage. Idempotent.
    fn close(&mut self);
}
