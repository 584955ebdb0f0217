use thiserror::Error;

/// Session-level failures that surface to the user.
///
/// Per-tick decode misses and low-confidence recognition results are not
/// errors and never appear here; they are silently retried on the next tick.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The platform refused camera access. Recovering usually needs a
    /// permission prompt, so retry is left to an explicit user action.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera device, or the stream could not be started.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The text-recognition engine failed to load. Fatal to the OCR
    /// fallback; fatal to the whole session in OCR-dependent modes.
    #[error("text recognition engine failed to initialize: {0}")]
    EngineInitFailed(String),

    /// A frame could not be grabbed or decoded from the stream.
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}
