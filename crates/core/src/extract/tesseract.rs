//! Tesseract-based OCR extraction.
//!
//! Runs `tesseract <image> stdout tsv` on the captured image and parses the
//! TSV word table into text spans. Spans below the configured confidence
//! threshold are excluded here, before the scene is returned.

use crate::capture::CapturedImage;
use crate::extract::heuristics::build_scene;
use crate::extract::{ExtractionAdapter, ExtractionError};
use async_trait::async_trait;
use dp_protocol::{BoundingBox, SceneDescription, TextSpan};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// OCR extraction backed by the `tesseract` binary.
pub struct TesseractExtractor {
    binary: PathBuf,
    lang: String,
    confidence_threshold: f32,
}

impl TesseractExtractor {
    /// Locate tesseract on PATH.
    ///
    /// # Arguments
    ///
    /// * `lang` - Tesseract language code (e.g. "eng")
    /// * `confidence_threshold` - spans at or below this confidence are
    ///   dropped (0-100)
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::NoBackend` if the binary is missing.
    pub fn discover(lang: &str, confidence_threshold: f32) -> Result<Self, ExtractionError> {
        let binary = which::which("tesseract")
            .map_err(|e| ExtractionError::NoBackend(format!("tesseract: {e}")))?;
        info!(binary = %binary.display(), "OCR backend selected");
        Ok(Self {
            binary,
            lang: lang.to_string(),
            confidence_threshold,
        })
    }

    /// Parse tesseract's TSV word table.
    ///
    /// Columns: level page block par line word left top width height conf
    /// text. Rows with conf < 0 are layout rows, not words.
    fn parse_tsv(&self, tsv: &str) -> Vec<TextSpan> {
        let mut spans = Vec::new();

        for line in tsv.lines().skip(1) {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 12 {
                continue;
            }

            let confidence: f32 = match cols[10].parse() {
                Ok(c) => c,
                Err(_) => continue,
            };
            if confidence < 0.0 || confidence <= self.confidence_threshold {
                continue;
            }

            let text = cols[11].trim();
            if text.is_empty() {
                continue;
            }

            let parse_u32 = |s: &str| s.parse::<u32>().ok();
            let (Some(x), Some(y), Some(width), Some(height)) = (
                parse_u32(cols[6]),
                parse_u32(cols[7]),
                parse_u32(cols[8]),
                parse_u32(cols[9]),
            ) else {
                continue;
            };

            spans.push(TextSpan {
                text: text.to_string(),
                confidence,
                bounds: BoundingBox {
                    x,
                    y,
                    width,
                    height,
                },
            });
        }

        spans
    }
}

#[async_trait]
impl ExtractionAdapter for TesseractExtractor {
    async fn extract(&self, image: &CapturedImage) -> Result<SceneDescription, ExtractionError> {
        let (width, height) = image_dimensions(&image.bytes)?;

        let tmp = tempfile::Builder::new()
            .prefix("deskpilot-ocr-")
            .suffix(".png")
            .tempfile()?;
        tokio::fs::write(tmp.path(), &image.bytes).await?;

        debug!(lang = %self.lang, "running OCR");

        let output = Command::new(&self.binary)
            .arg(tmp.path())
            .arg("stdout")
            .args(["-l", &self.lang])
            .arg("tsv")
            .output()
            .await
            .map_err(|e| ExtractionError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractionError::CommandFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let tsv = String::from_utf8(output.stdout)
            .map_err(|e| ExtractionError::OutputParse(e.to_string()))?;

        let spans = self.parse_tsv(&tsv);
        debug!(spans = spans.len(), "OCR complete");

        Ok(build_scene(width, height, spans))
    }
}

/// Decode the image header to get pixel dimensions.
fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), ExtractionError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ExtractionError::ImageDecode(e.to_string()))?;
    reader
        .into_dimensions()
        .map_err(|e| ExtractionError::ImageDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::mock::TINY_PNG;

    fn extractor(threshold: f32) -> TesseractExtractor {
        TesseractExtractor {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            confidence_threshold: threshold,
        }
    }

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t1920\t1080\t-1\t\n\
5\t1\t1\t1\t1\t1\t100\t200\t64\t20\t93\tSubmit\n\
5\t1\t1\t1\t1\t2\t180\t200\t70\t20\t21\tnoise\n\
5\t1\t1\t1\t2\t1\t100\t240\t120\t20\t88\tCancel\n";

    #[test]
    fn test_parse_tsv_filters_low_confidence() {
        let spans = extractor(30.0).parse_tsv(SAMPLE_TSV);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Submit");
        assert_eq!(spans[1].text, "Cancel");
        assert_eq!(spans[0].bounds.x, 100);
        assert_eq!(spans[0].bounds.width, 64);
    }

    #[test]
    fn test_parse_tsv_skips_layout_rows() {
        // Layout rows carry conf -1 and empty text
        let spans = extractor(0.0).parse_tsv(SAMPLE_TSV);
        assert!(spans.iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn test_parse_tsv_threshold_is_exclusive() {
        let spans = extractor(93.0).parse_tsv(SAMPLE_TSV);
        // "Submit" at exactly 93 is dropped; nothing else survives
        assert!(spans.is_empty());
    }

    #[test]
    fn test_image_dimensions_from_png() {
        let (width, height) = image_dimensions(TINY_PNG).expect("decode dimensions");
        assert_eq!((width, height), (1, 1));
    }

    #[test]
    fn test_image_dimensions_rejects_garbage() {
        let result = image_dimensions(b"not an image");
        assert!(matches!(result, Err(ExtractionError::ImageDecode(_))));
    }
}
