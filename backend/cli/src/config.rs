use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use freshscan_understanding::KeywordScope;
use serde::Deserialize;

/// Which object detector backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// External detection service (`FRESHSCAN_DETECTOR_URL`).
    Http,
    /// Vision LLM (`OPENAI_API_KEY` or `GEMINI_API_KEY`).
    Vision,
    /// No detector; dates land on `unknown_item`.
    None,
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "yolo" => Ok(Self::Http),
            "vision" => Ok(Self::Vision),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown detector {other:?}")),
        }
    }
}

/// freshscan runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Largest accepted HTTP request body
    pub max_body_bytes: usize,
    /// Log level
    pub log_level: String,
    /// Directory for rolling NDJSON log files
    pub log_dir: Option<PathBuf>,
    /// Emit console logs as JSON
    pub log_json: bool,

    // Detector
    pub detector: DetectorKind,
    pub detector_url: String,
    pub min_confidence: f32,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub vision_model: String,

    // OCR
    pub tesseract_binary: String,
    pub ocr_lang: String,

    /// Timeout for each collaborator call
    pub collaborator_timeout_secs: u64,
    /// Keep detector/OCR chatter out of the logs
    pub quiet_collaborators: bool,
    /// Which keyword lines the date resolver reads
    pub keyword_scope: KeywordScope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 20 * 1024 * 1024,
            log_level: "info".to_string(),
            log_dir: None,
            log_json: false,
            detector: DetectorKind::Http,
            detector_url: "http://localhost:8000/detect".to_string(),
            min_confidence: 0.5,
            openai_api_key: None,
            gemini_api_key: None,
            vision_model: "gpt-4o-mini".to_string(),
            tesseract_binary: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
            collaborator_timeout_secs: 30,
            quiet_collaborators: true,
            keyword_scope: KeywordScope::FirstLine,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (useful for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_address: non_empty("FRESHSCAN_BIND").unwrap_or(defaults.bind_address),
            port: parsed(&lookup, "FRESHSCAN_PORT").unwrap_or(defaults.port),
            max_body_bytes: parsed(&lookup, "FRESHSCAN_MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: non_empty("FRESHSCAN_LOG_DIR").map(PathBuf::from),
            log_json: lookup("FRESHSCAN_LOG_JSON").map(|v| is_truthy(&v)).unwrap_or(defaults.log_json),
            detector: parsed(&lookup, "FRESHSCAN_DETECTOR").unwrap_or(defaults.detector),
            detector_url: non_empty("FRESHSCAN_DETECTOR_URL").unwrap_or(defaults.detector_url),
            min_confidence: parsed(&lookup, "FRESHSCAN_MIN_CONFIDENCE").unwrap_or(defaults.min_confidence),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            vision_model: non_empty("FRESHSCAN_VISION_MODEL").unwrap_or(defaults.vision_model),
            tesseract_binary: non_empty("FRESHSCAN_TESSERACT").unwrap_or(defaults.tesseract_binary),
            ocr_lang: non_empty("FRESHSCAN_OCR_LANG").unwrap_or(defaults.ocr_lang),
            collaborator_timeout_secs: parsed(&lookup, "FRESHSCAN_COLLABORATOR_TIMEOUT_SECS")
                .unwrap_or(defaults.collaborator_timeout_secs),
            quiet_collaborators: lookup("FRESHSCAN_QUIET_COLLABORATORS")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.quiet_collaborators),
            keyword_scope: parsed(&lookup, "FRESHSCAN_KEYWORD_SCOPE").unwrap_or(defaults.keyword_scope),
        }
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs.max(1))
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = config(&[]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.detector, DetectorKind::Http);
        assert_eq!(cfg.min_confidence, 0.5);
        assert!(cfg.quiet_collaborators);
        assert_eq!(cfg.keyword_scope, KeywordScope::FirstLine);
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("FRESHSCAN_PORT", "9090"),
            ("FRESHSCAN_DETECTOR", "vision"),
            ("FRESHSCAN_QUIET_COLLABORATORS", "false"),
            ("FRESHSCAN_KEYWORD_SCOPE", "all"),
            ("FRESHSCAN_LOG_DIR", "/var/log/freshscan"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.detector, DetectorKind::Vision);
        assert!(!cfg.quiet_collaborators);
        assert_eq!(cfg.keyword_scope, KeywordScope::AllLines);
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/var/log/freshscan")));
        assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let cfg = config(&[
            ("FRESHSCAN_PORT", "eighty"),
            ("FRESHSCAN_DETECTOR", "sonar"),
            ("OPENAI_API_KEY", "  "),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.detector, DetectorKind::Http);
        assert!(cfg.openai_api_key.is_none());
    }
}
