use image::RgbImage;
use tesseract::Tesseract;

use crate::consts::OCR_CHAR_WHITELIST;
use crate::decode::{OcrEngine, OcrReading};
use crate::error::ScanError;

/// Tesseract-backed recognition constrained to the scan-code glyph set.
///
/// Loading the language model is the expensive part and happens once per
/// session; per-frame recognition reuses the instance. The engine lives no
/// longer than the session that created it.
pub struct TesseractOcrEngine {
    engine: Option<Tesseract>,
}

impl TesseractOcrEngine {
    pub fn new() -> Result<Self, ScanError> {
        let engine = Tesseract::new(None, Some("eng"))
            .map_err(|e| ScanError::EngineInitFailed(e.to_string()))?
            .set_variable("tessedit_char_whitelist", OCR_CHAR_WHITELIST)
            .map_err(|e| ScanError::EngineInitFailed(e.to_string()))?;

        Ok(Self {
            engine: Some(engine),
        })
    }
}

impl OcrEngine for TesseractOcrEngine {
    fn recognize(&mut self, roi: &RgbImage) -> anyhow::Result<OcrReading> {
        // The tesseract API threads ownership through every call; take the
        // instance out and put it back once recognition settles.
        let engine = self
            .engine
            .take()
            .ok_or_else(|| anyhow::anyhow!("recognition engine already terminated"))?;

        let width = roi.width() as i32;
        let height = roi.height() as i32;
        let mut engine = engine
            .set_frame(roi.as_raw(), width, height, 3, width * 3)?
            .set_source_resolution(96)
            .recognize()?;

        let text = engine.get_text()?;
        let confidence = engine.mean_text_conf();
        self.engine = Some(engine);

        Ok(OcrReading {
            text,
            confidence: Some(confidence as f32),
        })
    }

    fn shutdown(&mut self) {
        self.engine = None;
    }
}
