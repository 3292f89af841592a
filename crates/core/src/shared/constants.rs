use std::time::Duration;

/// Delay between a "no result yet" outcome and the next capture attempt.
///
/// Throttles request rate against both the remote service and the capture
/// device. A plain constant delay, not a backoff curve.
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Fixed name of the transient capture file, overwritten every iteration.
pub const CAPTURE_FILE_NAME: &str = "capture.jpg";

/// App-scoped directory name under the platform cache/config dirs.
pub const APP_DIR_NAME: &str = "Facetrace";

/// Request timeout for remote recognition calls.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
