//! CLI Doctor Command
//!
//! Checks that the configured collaborators can actually be used.

use anyhow::Result;

use freshscan_understanding::TesseractRecognizer;

use crate::collaborators::{build_detector, tesseract_config};
use crate::config::{Config, DetectorKind};

/// Executes the full doctor diagnosis.
pub async fn run(config: &Config) -> Result<()> {
    println!("\nRunning freshscan doctor...\n");

    let ocr_ok = check_tesseract(config).await;
    let detector_ok = check_detector(config);

    println!();
    if ocr_ok && detector_ok {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Scans will still run, with degraded results.");
    }

    Ok(())
}

async fn check_tesseract(config: &Config) -> bool {
    println!("Checking OCR engine:");
    let recognizer = TesseractRecognizer::new(tesseract_config(config));
    match recognizer.probe().await {
        Ok(version) => {
            println!("  [ok]   {} ({})", config.tesseract_binary, version);
            true
        }
        Err(e) => {
            println!("  [fail] {}: {:#}", config.tesseract_binary, e);
            false
        }
    }
}

fn check_detector(config: &Config) -> bool {
    println!("Checking object detector:");
    match build_detector(config) {
        Ok(detector) => {
            match config.detector {
                DetectorKind::Http => println!(
                    "  [ok]   {} -> {} (min confidence {})",
                    detector.name(),
                    config.detector_url,
                    config.min_confidence
                ),
                DetectorKind::Vision => println!("  [ok]   {}", detector.name()),
                DetectorKind::None => println!("  [warn] detection disabled, dates go to unknown_item"),
            }
            true
        }
        Err(e) => {
            println!("  [fail] {}", e);
            false
        }
    }
}
