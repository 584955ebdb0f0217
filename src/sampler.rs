use image::RgbImage;

/// Centered crop geometry as fractions of the source dimensions, both below
/// 1.0.
#[derive(Debug, Clone, Copy)]
pub struct RoiFractions {
    pub width: f32,
    pub height: f32,
}

/// Pixel-space crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Compute the centered ROI for the current source dimensions. Called every
/// tick so mid-session resolution or orientation changes are picked up; the
/// geometry is never derived from the requested capture format.
pub fn crop_rect(src_w: u32, src_h: u32, roi: RoiFractions) -> CropRect {
    let w = (src_w as f32 * roi.width) as u32;
    let h = (src_h as f32 * roi.height) as u32;
    CropRect {
        x: (src_w - w) / 2,
        y: (src_h - h) / 2,
        w,
        h,
    }
}

/// Copies the ROI of each frame into a reusable off-screen buffer.
///
/// The buffer is owned here and lent out by exclusive reference for one tick
/// at a time; every pixel is overwritten on the next sample, so downstream
/// mutation (the OCR preprocessing) cannot leak across ticks.
pub struct FrameSampler {
    roi: RoiFractions,
    buffer: RgbImage,
}

impl FrameSampler {
    pub fn new(roi: RoiFractions) -> Self {
        Self {
            roi,
            buffer: RgbImage::new(0, 0),
        }
    }

    /// Crop the current frame's ROI into the internal buffer. An empty
    /// result means the source was not ready; the caller treats the tick as
    /// a miss.
    pub fn sample(&mut self, frame: &RgbImage) -> &mut RgbImage {
        let rect = crop_rect(frame.width(), frame.height(), self.roi);

        if rect.w == 0 || rect.h == 0 {
            self.buffer = RgbImage::new(0, 0);
            return &mut self.buffer;
        }

        if self.buffer.dimensions() != (rect.w, rect.h) {
            self.buffer = RgbImage::new(rect.w, rect.h);
        }

        for y in 0..rect.h {
            for x in 0..rect.w {
                self.buffer
                    .put_pixel(x, y, *frame.get_pixel(rect.x + x, rect.y + y));
            }
        }

        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const ROI: RoiFractions = RoiFractions {
        width: 0.4,
        height: 0.15,
    };

    #[test]
    fn centered_rect_from_actual_dimensions() {
        let rect = crop_rect(1280, 720, ROI);
        assert_eq!(
            rect,
            CropRect {
                x: 384,
                y: 306,
                w: 512,
                h: 108
            }
        );

        // A renegotiated stream yields different geometry on the next tick.
        let rect = crop_rect(640, 480, ROI);
        assert_eq!(
            rect,
            CropRect {
                x: 192,
                y: 204,
                w: 256,
                h: 72
            }
        );
    }

    #[test]
    fn degenerate_source_yields_empty_roi() {
        let rect = crop_rect(0, 0, ROI);
        assert_eq!(rect.w, 0);
        assert_eq!(rect.h, 0);

        let mut sampler = FrameSampler::new(ROI);
        let roi = sampler.sample(&RgbImage::new(0, 0));
        assert_eq!(roi.dimensions(), (0, 0));
    }

    #[test]
    fn buffer_follows_source_dimension_changes() {
        let mut sampler = FrameSampler::new(ROI);

        let roi = sampler.sample(&RgbImage::new(1280, 720));
        assert_eq!(roi.dimensions(), (512, 108));

        let roi = sampler.sample(&RgbImage::new(640, 480));
        assert_eq!(roi.dimensions(), (256, 72));
    }

    #[test]
    fn sample_overwrites_previous_contents() {
        let mut sampler = FrameSampler::new(ROI);

        let bright = RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]));
        let roi = sampler.sample(&bright);
        // Simulate in-place preprocessing of this tick's buffer.
        for pixel in roi.pixels_mut() {
            pixel.0 = [0, 0, 0];
        }

        let roi = sampler.sample(&bright);
        assert!(roi.pixels().all(|p| p.0 == [200, 200, 200]));
    }
}
