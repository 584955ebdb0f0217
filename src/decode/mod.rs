// Decode cascade: matrix code first, text recognition as fallback.

use image::RgbImage;
use log::debug;
use regex::Regex;

use crate::consts::{BINARIZE_THRESHOLD, MIN_CODE_RUN_LEN, MIN_OCR_CONFIDENCE};
use crate::preprocess;

pub mod qr;
pub mod tesseract_ocr;

use qr::QrDecoder;

/// Which cascade stage produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSource {
    Qr,
    Ocr,
}

/// One successful decode, not yet normalized or deduplicated. Consumed
/// immediately by normalization; never stored.
#[derive(Debug, Clone)]
pub struct DecodeCandidate {
    pub raw_text: String,
    pub confidence: Option<f32>,
    pub source: DecodeSource,
}

/// Outcome of one tick of the cascade.
#[derive(Debug, Clone)]
pub enum DecodeAttempt {
    Qr(DecodeCandidate),
    Ocr(DecodeCandidate),
    Miss,
}

impl DecodeAttempt {
    pub fn candidate(self) -> Option<DecodeCandidate> {
        match self {
            DecodeAttempt::Qr(c) | DecodeAttempt::Ocr(c) => Some(c),
            DecodeAttempt::Miss => None,
        }
    }
}

/// Raw text from a recognition engine plus its confidence signal (0-100)
/// where the engine provides one.
#[derive(Debug, Clone)]
pub struct OcrReading {
    pub text: String,
    pub confidence: Option<f32>,
}

/// Text-recognition stage of the cascade. Engines are substitutable; a
/// session initializes exactly one instance up front and terminates it on
/// close. Initialization failure is the only reportable OCR error; a frame
/// that fails to recognize is a routine miss.
pub trait OcrEngine: Send {
    fn recognize(&mut self, roi: &RgbImage) -> anyhow::Result<OcrReading>;

    /// Release engine resources. Called once during session teardown.
    fn shutdown(&mut self) {}
}

/// Per-tick decode pipeline over one sampled ROI.
///
/// The matrix stage sees the raw buffer; only the OCR fallback sees the
/// inverted/binarized version. Either stage may be absent, which degrades
/// the cascade to QR-only or OCR-only. A tick that produces nothing is a
/// silent miss, retried next tick.
pub struct DecodeCascade {
    qr: Option<Box<dyn QrDecoder>>,
    ocr: Option<Box<dyn OcrEngine>>,
    extractor: CodeExtractor,
}

impl DecodeCascade {
    pub fn new(qr: Option<Box<dyn QrDecoder>>, ocr: Option<Box<dyn OcrEngine>>) -> Self {
        Self {
            qr,
            ocr,
            extractor: CodeExtractor::new(MIN_CODE_RUN_LEN),
        }
    }

    /// Run one tick against the sampler's buffer. The OCR branch
    /// preprocesses the buffer in place; the sampler overwrites it on the
    /// next tick.
    pub fn attempt(&mut self, roi: &mut RgbImage) -> DecodeAttempt {
        if roi.width() == 0 || roi.height() == 0 {
            return DecodeAttempt::Miss;
        }

        if let Some(qr) = &self.qr {
            if let Some(payload) = qr.decode(roi) {
                let trimmed = payload.trim();
                if !trimmed.is_empty() {
                    debug!("Matrix decode hit: {}", trimmed);
                    return DecodeAttempt::Qr(DecodeCandidate {
                        raw_text: trimmed.to_string(),
                        confidence: None,
                        source: DecodeSource::Qr,
                    });
                }
            }
        }

        let Some(ocr) = self.ocr.as_mut() else {
            return DecodeAttempt::Miss;
        };

        preprocess::binarize_inverted(roi, BINARIZE_THRESHOLD);

        let reading = match ocr.recognize(roi) {
            Ok(reading) => reading,
            Err(e) => {
                // Transient per-frame failure; never surfaced.
                debug!("Recognition attempt failed: {}", e);
                return DecodeAttempt::Miss;
            }
        };

        if let Some(confidence) = reading.confidence {
            if confidence < MIN_OCR_CONFIDENCE {
                debug!(
                    "Recognition below confidence gate ({:.0}): {:?}",
                    confidence,
                    reading.text.trim()
                );
                return DecodeAttempt::Miss;
            }
        }

        match self.extractor.extract(&reading.text) {
            Some(code) => {
                debug!("Code extracted from recognized text: {}", code);
                DecodeAttempt::Ocr(DecodeCandidate {
                    raw_text: code,
                    confidence: reading.confidence,
                    source: DecodeSource::Ocr,
                })
            }
            None => DecodeAttempt::Miss,
        }
    }

    /// Terminate the recognition engine. Part of ordered session teardown;
    /// safe to call when no engine was configured.
    pub fn shutdown(&mut self) {
        if let Some(ocr) = self.ocr.as_mut() {
            ocr.shutdown();
        }
        self.ocr = None;
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }
}

/// Pulls a scan code out of noisy recognized text.
///
/// Recognition fragments and merges glyphs, so the candidate is the longest
/// contiguous run of scan-code characters after everything outside the
/// recognition whitelist is stripped. Ties go to the first occurrence.
pub struct CodeExtractor {
    run: Regex,
}

impl CodeExtractor {
    /// `min_len` is the shortest run accepted as a code. Codes are minted
    /// over the uppercase-hex alphabet.
    pub fn new(min_len: usize) -> Self {
        let run = Regex::new(&format!("[0-9A-F]{{{min_len},}}")).expect("static run pattern");
        Self { run }
    }

    pub fn extract(&self, recognized: &str) -> Option<String> {
        let cleaned: String = recognized
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| c.is_ascii_alphanumeric() || *c == '#')
            .collect();

        let mut best: Option<&str> = None;
        for candidate in self.run.find_iter(&cleaned) {
            if best.map_or(true, |b| candidate.as_str().len() > b.len()) {
                best = Some(candidate.as_str());
            }
        }
        best.map(str::to_string)
    }
}
