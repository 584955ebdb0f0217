use image::RgbImage;
use log::{info, warn};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera,
};

use crate::consts::{IDEAL_FRAME_HEIGHT, IDEAL_FRAME_WIDTH};
use crate::error::ScanError;

/// A live video source the scan loop pulls frames from.
///
/// One session owns its source exclusively for its whole lifetime. `close`
/// must be idempotent and must be a no-op on a source that never opened.
pub trait FrameSource: Send {
    /// Grab the current frame as RGB. Dimensions are whatever the device
    /// negotiated and may change between calls.
    fn grab(&mut self) -> Result<RgbImage, ScanError>;

    /// Stop the stream and release the device.
    fn close(&mut self);
}

/// Device camera selected by index (the rear-facing module on hardware that
/// exposes one).
pub struct NokhwaCamera {
    camera: Option<Camera>,
}

impl NokhwaCamera {
    /// Open the device, requesting 1280x720 and walking a format ladder when
    /// the platform refuses. The negotiated resolution is only logged here;
    /// nothing downstream assumes the ideal was honored.
    ///
    /// Opening the stream lights the hardware indicator. That side effect is
    /// outside program control and has no rollback.
    pub fn open(index: u32) -> Result<Self, ScanError> {
        let ideal = Resolution::new(IDEAL_FRAME_WIDTH, IDEAL_FRAME_HEIGHT);
        let ladder = [
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
                ideal,
                FrameFormat::MJPEG,
                30,
            ))),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
                ideal,
                FrameFormat::YUYV,
                30,
            ))),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
        ];

        let mut camera = None;
        let mut last_error = String::new();
        for requested in &ladder {
            match Camera::new(CameraIndex::Index(index), *requested) {
                Ok(cam) => {
                    camera = Some(cam);
                    break;
                }
                Err(e) => {
                    warn!("Camera format request rejected: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        let mut camera = camera.ok_or_else(|| classify_open_error(last_error))?;
        camera
            .open_stream()
            .map_err(|e| classify_open_error(e.to_string()))?;

        let resolution = camera.resolution();
        info!(
            "Camera {} open at {}x{}",
            index,
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera: Some(camera),
        })
    }
}

// nokhwa folds platform permission refusals into its open errors; the
// message is the only signal left to split the two user-facing cases.
fn classify_open_error(message: String) -> ScanError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        ScanError::PermissionDenied(message)
    } else {
        ScanError::DeviceUnavailable(message)
    }
}

impl FrameSource for NokhwaCamera {
    fn grab(&mut self) -> Result<RgbImage, ScanError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| ScanError::CaptureFailed("stream is closed".into()))?;

        let frame = camera
            .frame()
            .map_err(|e| ScanError::CaptureFailed(e.to_string()))?;
        frame
            .decode_image::<RgbFormat>()
            .map_err(|e| ScanError::CaptureFailed(e.to_string()))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                warn!("Failed to stop camera stream: {}", e);
            }
            info!("Camera stream released");
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}
