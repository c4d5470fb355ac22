//! Scan pipeline: image payload in, dated item records out.
//!
//! Decoding failures are fatal to the request. Detector and OCR failures are
//! logged and degraded to "no labels" / "no text" so the date engine still
//! runs on whatever is left.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

use freshscan_core::{
    ImageInput, LabelSet, ObjectDetector, ScanError, ScanRequest, ScanResponse, TextRecognizer,
};
use freshscan_logging::{EventLogger, ScanEvent};
use freshscan_understanding::{ExpiryResolver, assign_dates};

pub mod payload;

pub use payload::{decode_base64_image, decode_image_bytes};

pub struct ScanPipeline {
    detector: Arc<dyn ObjectDetector>,
    recognizer: Arc<dyn TextRecognizer>,
    resolver: ExpiryResolver,
}

impl ScanPipeline {
    pub fn new(detector: Arc<dyn ObjectDetector>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            detector,
            recognizer,
            resolver: ExpiryResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: ExpiryResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Handle a raw JSON request body (`{"image_base64": ...}`).
    pub async fn scan_request(&self, raw: &str) -> Result<ScanResponse, ScanError> {
        let request = ScanRequest::from_json(raw)?;
        self.scan_base64(&request.image_base64).await
    }

    pub async fn scan_base64(&self, payload: &str) -> Result<ScanResponse, ScanError> {
        let image = decode_base64_image(payload)?;
        Ok(self.scan_image(&image).await)
    }

    pub async fn scan_image(&self, image: &ImageInput) -> ScanResponse {
        self.scan_image_on(image, Local::now().date_naive()).await
    }

    /// Scan with an explicit "today" for the future-date filter.
    pub async fn scan_image_on(&self, image: &ImageInput, today: NaiveDate) -> ScanResponse {
        let scan_id = Uuid::new_v4().to_string();
        info!(scan_id = %scan_id, mime = image.source_mime, width = image.width, height = image.height, "Scanning image");

        let (labels, text) = tokio::join!(
            self.detect_labels(&scan_id, image),
            self.read_text(&scan_id, image)
        );

        let resolved = self.resolver.resolve_detailed(&text, today);
        let event = match &resolved {
            Some(found) => ScanEvent::DateResolved {
                date: found.date.to_string(),
                phase: found.phase.as_str().to_string(),
                grammar: found.grammar.to_string(),
            },
            None => ScanEvent::NoDateFound { text_chars: text.chars().count() },
        };
        EventLogger::log_event(&scan_id, event);

        let detected_items = assign_dates(&labels, resolved.map(|found| found.date));
        EventLogger::log_event(
            &scan_id,
            ScanEvent::ItemsAssigned { labels: labels.len(), items: detected_items.len() },
        );

        ScanResponse { detected_items }
    }

    async fn detect_labels(&self, scan_id: &str, image: &ImageInput) -> LabelSet {
        match self.detector.detect(image).await {
            Ok(labels) => labels.into_iter().collect(),
            Err(e) => {
                self.report_failure(scan_id, self.detector.name(), "detection", &e);
                LabelSet::new()
            }
        }
    }

    async fn read_text(&self, scan_id: &str, image: &ImageInput) -> String {
        match self.recognizer.recognize(image).await {
            Ok(text) => text,
            Err(e) => {
                self.report_failure(scan_id, self.recognizer.name(), "ocr", &e);
                String::new()
            }
        }
    }

    fn report_failure(&self, scan_id: &str, collaborator: &str, stage: &str, err: &anyhow::Error) {
        EventLogger::log_event(
            scan_id,
            ScanEvent::CollaboratorFailed {
                collaborator: collaborator.to_string(),
                stage: stage.to_string(),
                error_msg: format!("{err:#}"),
            },
        );
    }
}
