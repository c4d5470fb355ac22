use anyhow::Result;
use async_trait::async_trait;

use crate::types::ImageInput;

/// An external object detector (YOLO service, vision LLM, ...).
///
/// Returned labels may repeat; callers collapse them into a `LabelSet`.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Detector name used in logs (e.g., "http", "openai-vision").
    fn name(&self) -> &str;

    /// Detect objects in the image and return their class names.
    async fn detect(&self, image: &ImageInput) -> Result<Vec<String>>;
}

/// An external OCR engine.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Engine name used in logs (e.g., "tesseract").
    fn name(&self) -> &str;

    /// Read all text in the image as one block with embedded line breaks.
    async fn recognize(&self, image: &ImageInput) -> Result<String>;
}
