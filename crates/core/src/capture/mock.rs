//! Mock capture adapter for testing.

use crate::capture::{CaptureAdapter, CaptureError, CapturedImage};
use async_trait::async_trait;

/// Canned capture adapter: returns fixed bytes or a fixed failure.
#[derive(Clone)]
pub struct MockCapture {
    result: Result<Vec<u8>, String>,
}

impl MockCapture {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self { result: Ok(bytes) }
    }

    /// A 1x1 PNG, enough for adapters that only decode the header.
    pub fn tiny_png() -> Self {
        Self::with_bytes(TINY_PNG.to_vec())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

/// Smallest valid PNG: 1x1 transparent pixel.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
    0x00, 0x02, 0x00, 0x00, 0x05, 0x00, 0x01, 0x7A, 0x5E, 0xAB, 0x3F, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[async_trait]
impl CaptureAdapter for MockCapture {
    async fn capture(&self) -> Result<CapturedImage, CaptureError> {
        match &self.result {
            Ok(bytes) => Ok(CapturedImage {
                bytes: bytes.clone(),
            }),
            Err(message) => Err(CaptureError::CommandFailed(message.clone())),
        }
    }
}
