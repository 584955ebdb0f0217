use image::RgbImage;
use log::debug;

/// Matrix-code stage of the cascade.
pub trait QrDecoder: Send {
    /// Decode the raw (unpreprocessed) ROI. `None` is a routine miss.
    fn decode(&self, roi: &RgbImage) -> Option<String>;
}

/// rqrr-backed decoder. Cost is bounded and small on a cropped ROI, so it
/// can run on every tick.
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, roi: &RgbImage) -> Option<String> {
        if roi.width() == 0 || roi.height() == 0 {
            return None;
        }

        let gray = image::DynamicImage::ImageRgb8(roi.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(gray);

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) => return Some(content),
                Err(e) => debug!("Detected grid failed to decode: {:?}", e),
            }
        }
        None
    }
}
