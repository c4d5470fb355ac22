//! Builds the detector and OCR collaborators selected by the configuration.

use std::sync::Arc;

use tracing::info;

use freshscan_core::{ObjectDetector, ScanError, TextRecognizer};
use freshscan_media::ScanPipeline;
use freshscan_understanding::{
    DetectorConfig, ExpiryResolver, HttpDetector, NoopDetector, TesseractConfig,
    TesseractRecognizer, VisionLabeler, VisionProvider,
};

use crate::config::{Config, DetectorKind};

pub fn build_pipeline(config: &Config) -> Result<ScanPipeline, ScanError> {
    let detector = build_detector(config)?;
    let recognizer = build_recognizer(config);
    let resolver = ExpiryResolver::new().with_keyword_scope(config.keyword_scope);

    info!(
        detector = detector.name(),
        ocr = recognizer.name(),
        keyword_scope = ?resolver.keyword_scope(),
        "Scan pipeline ready"
    );
    Ok(ScanPipeline::new(detector, recognizer).with_resolver(resolver))
}

pub fn build_detector(config: &Config) -> Result<Arc<dyn ObjectDetector>, ScanError> {
    let unavailable = |message: String| ScanError::CollaboratorUnavailable {
        collaborator: "object detector".to_string(),
        message,
    };

    match config.detector {
        DetectorKind::Http => {
            let detector = HttpDetector::new(DetectorConfig {
                endpoint: config.detector_url.clone(),
                min_confidence: config.min_confidence,
                timeout: config.collaborator_timeout(),
            })
            .map_err(|e| unavailable(format!("{e:#}")))?;
            Ok(Arc::new(detector))
        }
        DetectorKind::Vision => {
            let provider = match (&config.openai_api_key, &config.gemini_api_key) {
                (Some(key), _) => VisionProvider::openai(key, &config.vision_model),
                (None, Some(key)) => VisionProvider::gemini(key),
                (None, None) => {
                    return Err(unavailable(
                        "vision detector needs OPENAI_API_KEY or GEMINI_API_KEY".to_string(),
                    ))
                }
            };
            let labeler = VisionLabeler::new(provider, config.collaborator_timeout())
                .map_err(|e| unavailable(format!("{e:#}")))?;
            Ok(Arc::new(labeler))
        }
        DetectorKind::None => Ok(Arc::new(NoopDetector)),
    }
}

pub fn build_recognizer(config: &Config) -> Arc<dyn TextRecognizer> {
    Arc::new(TesseractRecognizer::new(tesseract_config(config)))
}

pub fn tesseract_config(config: &Config) -> TesseractConfig {
    TesseractConfig {
        binary: config.tesseract_binary.clone(),
        lang: config.ocr_lang.clone(),
        quiet: config.quiet_collaborators,
        timeout: config.collaborator_timeout(),
    }
}
