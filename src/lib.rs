pub mod consts {
    use std::time::Duration;

    /// Ideal capture resolution requested from the camera. The platform may
    /// negotiate something else; all downstream geometry follows the actual
    /// stream dimensions, read per frame.
    pub const IDEAL_FRAME_WIDTH: u32 = 1280;
    pub const IDEAL_FRAME_HEIGHT: u32 = 720;

    /// Centered scan window, as fractions of the live frame. Smaller is
    /// faster; these match the printed code strip on the frame.
    pub const ROI_WIDTH_FRACTION: f32 = 0.4;
    pub const ROI_HEIGHT_FRACTION: f32 = 0.15;

    /// Cut-off applied to the inverted luminance when conditioning the ROI
    /// for text recognition (0-255 scale).
    pub const BINARIZE_THRESHOLD: u8 = 100;

    /// Recognition results below this confidence (0-100) are discarded.
    pub const MIN_OCR_CONFIDENCE: f32 = 50.0;

    /// Minimum length of a code run extracted from recognized text. Scan
    /// codes are minted as 15 hex characters; 12 tolerates edge loss.
    pub const MIN_CODE_RUN_LEN: usize = 12;

    /// Glyphs the recognition engine is allowed to produce. '#' appears as
    /// a printed prefix on some frames.
    pub const OCR_CHAR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789#";

    /// Repeat decodes of one code inside this window are suppressed.
    pub const SCAN_COOLDOWN: Duration = Duration::from_millis(1000);

    /// Tick period for the QR-first cascade; the matrix decode is cheap
    /// enough to run this often.
    pub const HYBRID_TICK_PERIOD: Duration = Duration::from_millis(100);

    /// Tick period when only the OCR stage runs; recognition is far more
    /// expensive per frame.
    pub const OCR_ONLY_TICK_PERIOD: Duration = Duration::from_millis(800);
}

pub mod camera;
pub mod decode;
pub mod dedup;
pub mod error;
pub mod ident;
pub mod lookup;
pub mod preprocess;
pub mod sampler;
pub mod session;
