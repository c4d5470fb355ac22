//! Optical Character Recognition (OCR)
//!
//! Runs the local Tesseract CLI over a decoded image and returns the raw text
//! block, line breaks included.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use freshscan_core::{ImageInput, TextRecognizer};

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Executable name or path.
    pub binary: String,
    /// Tesseract language pack (`-l`).
    pub lang: String,
    /// Discard the engine's own stderr output instead of logging it.
    pub quiet: bool,
    pub timeout: Duration,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            lang: "eng".to_string(),
            quiet: true,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct TesseractRecognizer {
    config: TesseractConfig,
}

impl TesseractRecognizer {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Check that the binary can be started. Returns its version line.
    pub async fn probe(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to start {}", self.config.binary))?;
        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() { &output.stderr } else { &output.stdout };
        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(["stdin", "stdout", "-l", self.config.lang.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.config.quiet { Stdio::null() } else { Stdio::piped() })
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &ImageInput) -> Result<String> {
        info!(
            width = image.width,
            height = image.height,
            lang = %self.config.lang,
            "[OCR] Running tesseract"
        );
        let child = self
            .command()
            .spawn()
            .with_context(|| format!("failed to start {}", self.config.binary))?;

        let output = tokio::time::timeout(self.config.timeout, feed_and_wait(child, &image.png))
            .await
            .with_context(|| format!("tesseract timed out after {:?}", self.config.timeout))?
            .context("tesseract I/O failed")?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            bail!("tesseract exited with {}: {}", output.status, stderr.trim());
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "[OCR] tesseract diagnostics");
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "[OCR] Text recognized");
        Ok(text)
    }
}

async fn feed_and_wait(mut child: Child, input: &[u8]) -> std::io::Result<Output> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input).await?;
    }
    child.wait_with_output().await
}
