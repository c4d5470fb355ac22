//! Object detection via an external detection service.
//!
//! The service receives `{"image_base64": ...}` and answers with
//! `{"detections": [{"label": "...", "confidence": 0.93}, ...]}`, e.g. a
//! small HTTP wrapper around a YOLO model.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use tracing::{debug, info};

use freshscan_core::{ImageInput, ObjectDetector};

/// Detections below this confidence are dropped.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub endpoint: String,
    pub min_confidence: f32,
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/detect".to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
struct DetectionReply {
    #[serde(default)]
    detections: Vec<Detection>,
}

pub struct HttpDetector {
    config: DetectorConfig,
    client: reqwest::Client,
}

impl HttpDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            bail!("detector endpoint must be an http(s) URL, got {:?}", config.endpoint);
        }
        if !(0.0..=1.0).contains(&config.min_confidence) {
            bail!("min confidence must be within 0..=1, got {}", config.min_confidence);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ObjectDetector for HttpDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn detect(&self, image: &ImageInput) -> Result<Vec<String>> {
        info!(endpoint = %self.config.endpoint, "[Detect] Requesting detections");
        let body = serde_json::json!({ "image_base64": STANDARD.encode(&image.png) });
        let resp = self.client.post(&self.config.endpoint).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            bail!("detector error {}: {}", status, resp.text().await.unwrap_or_default());
        }
        let reply: DetectionReply = resp.json().await.context("malformed detector reply")?;
        let labels = confident_labels(&reply.detections, self.config.min_confidence);
        debug!(total = reply.detections.len(), kept = labels.len(), "[Detect] Filtered detections");
        Ok(labels)
    }
}

/// Labels of detections at or above `min_confidence`, in reply order.
pub fn confident_labels(detections: &[Detection], min_confidence: f32) -> Vec<String> {
    detections
        .iter()
        .filter(|d| d.confidence >= min_confidence)
        .map(|d| d.label.clone())
        .collect()
}

/// Detector that never finds anything; OCR-only deployments.
pub struct NoopDetector;

#[async_trait]
impl ObjectDetector for NoopDetector {
    fn name(&self) -> &str {
        "none"
    }

    async fn detect(&self, _image: &ImageInput) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
