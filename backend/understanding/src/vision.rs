/// Vision labeling: ask a vision LLM which objects are in a photo.
///
/// Used as an object detector when no dedicated detection service is
/// deployed. The model is asked for a JSON array of short object names.
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::info;

use freshscan_core::{ImageInput, ObjectDetector};

const LABEL_PROMPT: &str = "List the distinct physical objects visible in this photo \
using short lowercase common names such as \"milk\", \"bread\" or \"apple\". \
Respond with only a JSON array of strings.";

/// Supported vision providers.
pub enum VisionProvider {
    OpenAI { api_key: String, model: String },
    Gemini { api_key: String, model: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::OpenAI { api_key: api_key.into(), model: model.into() }
    }
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini { api_key: api_key.into(), model: "gemini-2.0-flash".to_string() }
    }
}

pub struct VisionLabeler {
    provider: VisionProvider,
    client: reqwest::Client,
}

impl VisionLabeler {
    pub fn new(provider: VisionProvider, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { provider, client })
    }
}

#[async_trait]
impl ObjectDetector for VisionLabeler {
    fn name(&self) -> &str {
        match self.provider {
            VisionProvider::OpenAI { .. } => "openai-vision",
            VisionProvider::Gemini { .. } => "gemini-vision",
        }
    }

    async fn detect(&self, image: &ImageInput) -> Result<Vec<String>> {
        let b64 = STANDARD.encode(&image.png);
        let reply = match &self.provider {
            VisionProvider::OpenAI { api_key, model } => {
                ask_openai(&self.client, api_key, model, &b64).await?
            }
            VisionProvider::Gemini { api_key, model } => {
                ask_gemini(&self.client, api_key, model, &b64).await?
            }
        };
        parse_label_list(&reply)
    }
}

async fn ask_openai(client: &reqwest::Client, api_key: &str, model: &str, b64: &str) -> Result<String> {
    info!("[Vision] Labeling image via OpenAI {}", model);
    let body = serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": LABEL_PROMPT },
                { "type": "image_url",
                  "image_url": { "url": format!("data:image/png;base64,{}", b64) } }
            ]
        }],
        "max_tokens": 256
    });
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;
    if !resp.status().is_success() {
        bail!("OpenAI vision error: {}", resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await?;
    Ok(json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string())
}

async fn ask_gemini(client: &reqwest::Client, api_key: &str, model: &str, b64: &str) -> Result<String> {
    info!("[Vision] Labeling image via Gemini {}", model);
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    );
    let body = serde_json::json!({
        "contents": [{ "parts": [
            { "text": LABEL_PROMPT },
            { "inlineData": { "mimeType": "image/png", "data": b64 } }
        ]}]
    });
    let resp = client.post(&url).json(&body).send().await?;
    if !resp.status().is_success() {
        bail!("Gemini vision error: {}", resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await?;
    Ok(json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or("")
        .to_string())
}

/// Pull the JSON array of labels out of a model reply.
///
/// Models like to wrap the array in prose or a fenced block; everything
/// outside the outermost brackets is ignored.
pub fn parse_label_list(reply: &str) -> Result<Vec<String>> {
    let start = reply.find('[').context("vision reply contains no JSON array")?;
    let end = reply.rfind(']').context("vision reply contains no JSON array")?;
    if end < start {
        bail!("vision reply contains no JSON array");
    }
    let labels: Vec<String> = serde_json::from_str(&reply[start..=end])
        .context("vision reply is not a JSON array of strings")?;
    Ok(labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        assert_eq!(parse_label_list(r#"["milk", "bread"]"#).unwrap(), vec!["milk", "bread"]);
    }

    #[test]
    fn parses_fenced_array_and_drops_blanks() {
        let reply = "Sure!\n```json\n[\"milk \", \"\", \"egg carton\"]\n```";
        assert_eq!(parse_label_list(reply).unwrap(), vec!["milk", "egg carton"]);
    }

    #[test]
    fn rejects_prose_only_reply() {
        assert!(parse_label_list("I see a carton of milk.").is_err());
        assert!(parse_label_list("] nothing [").is_err());
        assert!(parse_label_list("[1, 2]").is_err());
    }

    #[test]
    fn provider_names() {
        let openai = VisionLabeler::new(VisionProvider::openai("k", "gpt-4o-mini"), Duration::from_secs(5)).unwrap();
        let gemini = VisionLabeler::new(VisionProvider::gemini("k"), Duration::from_secs(5)).unwrap();
        assert_eq!(openai.name(), "openai-vision");
        assert_eq!(gemini.name(), "gemini-vision");
    }
}
