//! CLI Scan Command
//!
//! Reads one `{"image_base64": ...}` request and prints the
//! `{"detected_items": [...]}` response on stdout.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::collaborators::build_pipeline;
use crate::config::Config;

pub async fn run(config: &Config, input: Option<&Path>) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let raw = read_input(input).await?;
    let response = pipeline.scan_request(&raw).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

/// Read the whole input from a file, or from stdin when no file is given.
///
/// Invalid UTF-8 is replaced rather than rejected; OCR output and pasted
/// payloads carry no encoding guarantee.
pub async fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            let raw = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(String::from_utf8_lossy(&raw).into_owned())
        }
        None => read_lossy(tokio::io::stdin())
            .await
            .context("failed to read stdin"),
    }
}

async fn read_lossy(mut reader: impl AsyncRead + Unpin) -> std::io::Result<String> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw).await?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
