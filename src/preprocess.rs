use image::RgbImage;

/// Condition an ROI for text recognition: per pixel, take the channel mean
/// as luminance, invert it, and binarize at `threshold`, writing pure black
/// or pure white back to all three channels.
///
/// Printed codes are light ink on dark stock while recognition engines
/// expect dark text on a light background; inversion plus a hard threshold
/// restores that orientation and flattens print texture.
///
/// Runs only ahead of the OCR stage. The QR decoder always sees raw
/// luminance.
pub fn binarize_inverted(buffer: &mut RgbImage, threshold: u8) {
    // Source not ready yet; nothing to condition.
    if buffer.width() == 0 || buffer.height() == 0 {
        return;
    }

    for pixel in buffer.pixels_mut() {
        let [r, g, b] = pixel.0;
        let luminance = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        let inverted = 255 - luminance;
        let value = if inverted < threshold { 0 } else { 255 };
        pixel.0 = [value, value, value];
    }
}
